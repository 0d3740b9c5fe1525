//! Reseller ledger and sale log.
//!
//! Resellers accumulate `total_sales` as sales are credited to them; what
//! they owe is derived from that total and their commission rate, minus
//! what they have already paid in (`balance`).

use crate::error::{RaffleError, Result};
use crate::types::{
    Money, NewReseller, Reseller, ResellerId, ResellerPatch, ResellerStatement, Sale, SaleId,
};
use std::collections::{BTreeMap, HashMap};

/// Resellers, sales, and the idempotency keys seen on sales
#[derive(Clone, Debug, Default)]
pub struct ResellerLedger {
    resellers: BTreeMap<ResellerId, Reseller>,
    sales: Vec<Sale>,
    sale_keys: HashMap<String, SaleId>,
}

impl ResellerLedger {
    /// Rebuild from persisted rows
    #[must_use]
    pub fn from_rows(resellers: Vec<Reseller>, sales: Vec<Sale>) -> Self {
        let sale_keys = sales
            .iter()
            .filter_map(|sale| {
                sale.idempotency_key
                    .as_ref()
                    .map(|key| (key.clone(), sale.id.clone()))
            })
            .collect();
        Self {
            resellers: resellers.into_iter().map(|r| (r.id.clone(), r)).collect(),
            sales,
            sale_keys,
        }
    }

    // ========================================================================
    // Resellers
    // ========================================================================

    /// Register a reseller under `id`
    ///
    /// # Errors
    ///
    /// - [`RaffleError::DuplicateReseller`] when `id` is already taken
    /// - [`RaffleError::InvalidTitle`] for a blank name
    pub fn add(&mut self, id: ResellerId, new: NewReseller) -> Result<&Reseller> {
        if self.resellers.contains_key(&id) {
            return Err(RaffleError::DuplicateReseller(id));
        }
        let name = validate_name(&new.name)?;
        let reseller = Reseller {
            id: id.clone(),
            name,
            phone: new.phone.trim().to_string(),
            pix_key: new.pix_key,
            commission_rate: new.commission_rate,
            total_sales: Money::ZERO,
            balance: Money::ZERO,
        };
        Ok(self.resellers.entry(id).or_insert(reseller))
    }

    /// Whether `id` names a registered reseller
    #[must_use]
    pub fn contains(&self, id: &ResellerId) -> bool {
        self.resellers.contains_key(id)
    }

    /// Whether a sale with `id` has been recorded
    #[must_use]
    pub fn has_sale(&self, id: &SaleId) -> bool {
        self.sales.iter().any(|sale| &sale.id == id)
    }

    /// Apply a partial update
    ///
    /// # Errors
    ///
    /// - [`RaffleError::ResellerNotFound`] for an unknown id
    /// - [`RaffleError::InvalidTitle`] for a blank name
    pub fn update(&mut self, id: &ResellerId, patch: ResellerPatch) -> Result<&Reseller> {
        let name = patch.name.as_deref().map(validate_name).transpose()?;
        let reseller = self
            .resellers
            .get_mut(id)
            .ok_or_else(|| RaffleError::ResellerNotFound(id.clone()))?;

        if let Some(name) = name {
            reseller.name = name;
        }
        if let Some(phone) = patch.phone {
            reseller.phone = phone.trim().to_string();
        }
        if let Some(pix_key) = patch.pix_key {
            reseller.pix_key = Some(pix_key).filter(|k| !k.trim().is_empty());
        }
        if let Some(rate) = patch.commission_rate {
            reseller.commission_rate = rate;
        }
        Ok(reseller)
    }

    /// Remove a reseller record
    ///
    /// Tickets are not touched here; see the allocation cascade.
    pub fn remove(&mut self, id: &ResellerId) -> Option<Reseller> {
        self.resellers.remove(id)
    }

    /// One reseller
    #[must_use]
    pub fn get(&self, id: &ResellerId) -> Option<&Reseller> {
        self.resellers.get(id)
    }

    /// All resellers ordered by id
    pub fn iter(&self) -> impl Iterator<Item = &Reseller> {
        self.resellers.values()
    }

    /// Add a sale total to the reseller's cumulative sales
    ///
    /// Returns `false` when the reseller no longer exists.
    pub fn credit(&mut self, id: &ResellerId, amount: Money) -> bool {
        match self.resellers.get_mut(id) {
            Some(reseller) => {
                reseller.total_sales = reseller.total_sales.saturating_add(amount);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Sales
    // ========================================================================

    /// Append a sale, remembering its idempotency key
    pub fn record_sale(&mut self, sale: Sale) {
        if let Some(key) = &sale.idempotency_key {
            self.sale_keys.insert(key.clone(), sale.id.clone());
        }
        self.sales.push(sale);
    }

    /// Sale previously recorded under `key`
    #[must_use]
    pub fn sale_for_key(&self, key: &str) -> Option<&SaleId> {
        self.sale_keys.get(key)
    }

    /// All sales in recording order
    #[must_use]
    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    // ========================================================================
    // Debts
    // ========================================================================

    /// What the reseller owes at the current commission rate
    #[must_use]
    pub fn statement(&self, id: &ResellerId) -> Option<ResellerStatement> {
        self.resellers.get(id).map(statement_of)
    }

    /// Statements of every reseller
    #[must_use]
    pub fn statements(&self) -> Vec<ResellerStatement> {
        self.resellers.values().map(statement_of).collect()
    }

    /// Record a payment from the reseller, returning what is still owed
    ///
    /// # Errors
    ///
    /// - [`RaffleError::ResellerNotFound`] for an unknown id
    /// - [`RaffleError::InvalidSettlement`] for a zero amount
    /// - [`RaffleError::SettlementExceedsDebt`] when paying more than owed
    pub fn settle(&mut self, id: &ResellerId, amount: Money) -> Result<Money> {
        if amount.is_zero() {
            return Err(RaffleError::InvalidSettlement);
        }
        let reseller = self
            .resellers
            .get_mut(id)
            .ok_or_else(|| RaffleError::ResellerNotFound(id.clone()))?;

        let outstanding = statement_of(reseller).outstanding;
        if amount > outstanding {
            return Err(RaffleError::SettlementExceedsDebt {
                requested: amount,
                outstanding,
            });
        }

        reseller.balance = reseller.balance.saturating_add(amount);
        Ok(outstanding.saturating_sub(amount))
    }
}

fn statement_of(reseller: &Reseller) -> ResellerStatement {
    let commission = reseller.commission_rate.commission_on(reseller.total_sales);
    let net_payable = reseller.total_sales.saturating_sub(commission);
    ResellerStatement {
        reseller_id: reseller.id.clone(),
        name: reseller.name.clone(),
        total_sales: reseller.total_sales,
        commission,
        net_payable,
        settled: reseller.balance,
        outstanding: net_payable.saturating_sub(reseller.balance),
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RaffleError::InvalidTitle("Reseller name"));
    }
    Ok(trimmed.to_string())
}
