//! Request-response facade over the raffle store.
//!
//! Each command is sent to the store and its [`Outcome`] read back under the
//! same write lock, so callers get a typed result for exactly their command.
//! Queries take the read lock and return owned copies.

use crate::aggregate::{RaffleAction, RaffleReducer};
use crate::config::Config;
use crate::environment::RaffleEnvironment;
use crate::error::{RaffleError, Result};
use crate::financial;
use crate::snapshot::JsonSnapshotStore;
use crate::state::{Outcome, RaffleState};
use crate::types::{
    AllocationReport, DeletionReport, FinancialStats, GenerationReport, Money, NewRaffle,
    NewReseller, PatchReport, Raffle, RaffleId, RafflePatch, Reseller, ResellerAllocation,
    ResellerId, ResellerPatch, ResellerStatement, Sale, SaleDetails, Ticket, TicketStatus,
    TransitionReport,
};
use raffle_core::action::Action;
use raffle_core::persistence::Persistence;
use raffle_runtime::{Store, StoreConfig};
use std::sync::Arc;

/// Store specialised to the raffle aggregate
pub type RaffleStore = Store<RaffleState, RaffleAction, RaffleEnvironment, RaffleReducer>;

/// Raffle engine
///
/// Safe to share across threads behind an [`Arc`]; all mutations are
/// serialised by the store.
pub struct RaffleEngine {
    store: RaffleStore,
}

impl RaffleEngine {
    /// Empty engine with no persistence
    #[must_use]
    pub fn new(environment: RaffleEnvironment) -> Self {
        Self::with_state(RaffleState::default(), environment)
    }

    /// Engine starting from a loaded state
    #[must_use]
    pub fn with_state(state: RaffleState, environment: RaffleEnvironment) -> Self {
        Self {
            store: Store::new(state, RaffleReducer::new(), environment),
        }
    }

    /// Write a snapshot through `persistence` after every change
    #[must_use]
    pub fn with_persistence(self, persistence: Arc<dyn Persistence<RaffleState>>) -> Self {
        Self {
            store: self.store.with_persistence(persistence),
        }
    }

    /// Replace the store configuration
    #[must_use]
    pub fn with_store_config(self, config: StoreConfig) -> Self {
        Self {
            store: self.store.with_config(config),
        }
    }

    /// Engine described by `config`: snapshot loaded, autosave attached
    ///
    /// # Errors
    ///
    /// Returns [`RaffleError::Persistence`] if an existing snapshot cannot
    /// be read or decoded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let snapshots = JsonSnapshotStore::new(&config.snapshot_path);
        let state = snapshots.load()?;
        let store_config = StoreConfig::default().with_max_dispatch_depth(config.max_dispatch_depth);

        let engine = Self::with_state(state, RaffleEnvironment::production(config.shuffle_seed))
            .with_store_config(store_config);

        if config.autosave {
            tracing::info!(path = %snapshots.path().display(), "Autosave enabled");
            Ok(engine.with_persistence(Arc::new(snapshots)))
        } else {
            Ok(engine)
        }
    }

    /// Write the current state now
    ///
    /// # Errors
    ///
    /// Returns [`RaffleError::Store`] if the lock is poisoned or the
    /// backend rejects the write.
    pub fn flush(&self) -> Result<()> {
        Ok(self.store.flush()?)
    }

    /// Send a command and pull its outcome back out
    fn execute<T>(&self, action: RaffleAction, extract: impl FnOnce(Outcome) -> Option<T>) -> Result<T> {
        let name = action.name();
        let outcome = self
            .store
            .send_and_inspect(action, |state| state.last_outcome.clone())?;

        match outcome {
            Some(Outcome::Rejected(error)) => Err(error),
            Some(outcome) => extract(outcome).ok_or(RaffleError::NoOutcome(name)),
            None => Err(RaffleError::NoOutcome(name)),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&RaffleState) -> T) -> Result<T> {
        Ok(self.store.state(f)?)
    }

    // ========================================================================
    // Raffles
    // ========================================================================

    /// Create a raffle and generate its tickets
    ///
    /// Creating an id that already exists changes nothing and returns it.
    ///
    /// # Errors
    ///
    /// [`RaffleError::InvalidTitle`] or [`RaffleError::InvalidPrice`].
    pub fn create_raffle(&self, raffle: NewRaffle) -> Result<RaffleId> {
        self.execute(RaffleAction::CreateRaffle { raffle }, |outcome| match outcome {
            Outcome::RaffleCreated { raffle_id, .. } => Some(raffle_id),
            _ => None,
        })
    }

    /// Generate tickets for a raffle that has none
    ///
    /// An unknown raffle generates nothing.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub fn generate_tickets(&self, raffle_id: &RaffleId) -> Result<GenerationReport> {
        let action = RaffleAction::GenerateTickets {
            raffle_id: raffle_id.clone(),
        };
        self.execute(action, |outcome| match outcome {
            Outcome::Generated(report) => Some(report),
            _ => None,
        })
    }

    /// Reshuffle a raffle's tickets; `false` if any is reserved or sold
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub fn regenerate_tickets(&self, raffle_id: &RaffleId) -> Result<bool> {
        let action = RaffleAction::RegenerateTickets {
            raffle_id: raffle_id.clone(),
        };
        self.execute(action, |outcome| match outcome {
            Outcome::Regenerated(done) => Some(done),
            _ => None,
        })
    }

    /// Remove a raffle's tickets; `false` if any is sold
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub fn clear_tickets(&self, raffle_id: &RaffleId) -> Result<bool> {
        let action = RaffleAction::ClearTickets {
            raffle_id: raffle_id.clone(),
        };
        self.execute(action, |outcome| match outcome {
            Outcome::Cleared(done) => Some(done),
            _ => None,
        })
    }

    /// Edit raffle metadata
    ///
    /// Price and modality changes are dropped (and reported) once any
    /// ticket is reserved or sold.
    ///
    /// # Errors
    ///
    /// [`RaffleError::RaffleNotFound`], [`RaffleError::InvalidTitle`] or
    /// [`RaffleError::InvalidPrice`].
    pub fn update_raffle(&self, raffle_id: &RaffleId, patch: RafflePatch) -> Result<PatchReport> {
        let action = RaffleAction::UpdateRaffle {
            raffle_id: raffle_id.clone(),
            patch,
        };
        self.execute(action, |outcome| match outcome {
            Outcome::Patched(report) => Some(report),
            _ => None,
        })
    }

    // ========================================================================
    // Tickets
    // ========================================================================

    /// Overwrite ticket statuses regardless of their current status
    ///
    /// Setting [`TicketStatus::Sold`] records a counter sale.
    ///
    /// # Errors
    ///
    /// Only store failures; unknown numbers land in `skipped`.
    pub fn set_ticket_status<I>(
        &self,
        raffle_id: &RaffleId,
        numbers: I,
        status: TicketStatus,
        reseller_id: Option<&ResellerId>,
    ) -> Result<TransitionReport>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let action = RaffleAction::SetTicketStatus {
            raffle_id: raffle_id.clone(),
            numbers: owned(numbers),
            status,
            reseller_id: reseller_id.cloned(),
        };
        self.execute(action, transitioned)
    }

    /// Sell tickets and record one sale for those that changed
    ///
    /// A repeated idempotency key returns the original sale with
    /// `replayed` set and changes nothing.
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub fn sell_tickets<I>(&self, raffle_id: &RaffleId, numbers: I, sale: SaleDetails) -> Result<TransitionReport>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let action = RaffleAction::SellTickets {
            raffle_id: raffle_id.clone(),
            numbers: owned(numbers),
            sale,
        };
        self.execute(action, transitioned)
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    /// Reserve available tickets for a reseller
    ///
    /// # Errors
    ///
    /// Only store failures; tickets already taken land in `skipped`.
    pub fn assign_to_reseller<I>(
        &self,
        raffle_id: &RaffleId,
        reseller_id: &ResellerId,
        numbers: I,
    ) -> Result<AllocationReport>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let action = RaffleAction::AssignToReseller {
            raffle_id: raffle_id.clone(),
            reseller_id: reseller_id.clone(),
            numbers: owned(numbers),
        };
        self.execute(action, allocated)
    }

    /// Reserve tickets given as text such as `"1-10, 15"`
    ///
    /// # Errors
    ///
    /// [`RaffleError::EmptyNumberSelection`] when the text names nothing.
    pub fn reserve_from_text(
        &self,
        raffle_id: &RaffleId,
        reseller_id: &ResellerId,
        text: &str,
    ) -> Result<AllocationReport> {
        let action = RaffleAction::ReserveFromText {
            raffle_id: raffle_id.clone(),
            reseller_id: reseller_id.clone(),
            text: text.to_string(),
        };
        self.execute(action, allocated)
    }

    /// Return a reseller's own reservations to available
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub fn revoke_from_reseller<I>(
        &self,
        raffle_id: &RaffleId,
        reseller_id: &ResellerId,
        numbers: I,
    ) -> Result<AllocationReport>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let action = RaffleAction::RevokeFromReseller {
            raffle_id: raffle_id.clone(),
            reseller_id: reseller_id.clone(),
            numbers: owned(numbers),
        };
        self.execute(action, allocated)
    }

    /// Copy reservations onto the same numbers of another raffle
    ///
    /// # Errors
    ///
    /// Only store failures.
    pub fn clone_allocations(
        &self,
        source: &RaffleId,
        target: &RaffleId,
        reseller_id: Option<&ResellerId>,
    ) -> Result<AllocationReport> {
        let action = RaffleAction::CloneAllocations {
            source: source.clone(),
            target: target.clone(),
            reseller_id: reseller_id.cloned(),
        };
        self.execute(action, allocated)
    }

    // ========================================================================
    // Resellers
    // ========================================================================

    /// Register a reseller
    ///
    /// # Errors
    ///
    /// [`RaffleError::InvalidTitle`] for a blank name.
    pub fn add_reseller(&self, reseller: NewReseller) -> Result<ResellerId> {
        self.execute(RaffleAction::AddReseller { reseller }, |outcome| match outcome {
            Outcome::ResellerAdded(id) => Some(id),
            _ => None,
        })
    }

    /// Edit a reseller
    ///
    /// # Errors
    ///
    /// [`RaffleError::ResellerNotFound`] or [`RaffleError::InvalidTitle`].
    pub fn update_reseller(&self, reseller_id: &ResellerId, patch: ResellerPatch) -> Result<()> {
        let action = RaffleAction::UpdateReseller {
            reseller_id: reseller_id.clone(),
            patch,
        };
        self.execute(action, |outcome| match outcome {
            Outcome::ResellerUpdated(_) => Some(()),
            _ => None,
        })
    }

    /// Delete a reseller, releasing its reservations and flagging its sold
    /// tickets
    ///
    /// # Errors
    ///
    /// [`RaffleError::ResellerNotFound`].
    pub fn delete_reseller(&self, reseller_id: &ResellerId) -> Result<DeletionReport> {
        let action = RaffleAction::DeleteReseller {
            reseller_id: reseller_id.clone(),
        };
        self.execute(action, |outcome| match outcome {
            Outcome::ResellerDeleted(report) => Some(report),
            _ => None,
        })
    }

    /// Alias of [`RaffleEngine::delete_reseller`]; deletion is always safe
    ///
    /// # Errors
    ///
    /// [`RaffleError::ResellerNotFound`].
    pub fn safe_delete_reseller(&self, reseller_id: &ResellerId) -> Result<DeletionReport> {
        self.delete_reseller(reseller_id)
    }

    /// Record a payment from a reseller; returns what is still owed
    ///
    /// # Errors
    ///
    /// [`RaffleError::ResellerNotFound`], [`RaffleError::InvalidSettlement`]
    /// or [`RaffleError::SettlementExceedsDebt`].
    pub fn settle_reseller_debt(&self, reseller_id: &ResellerId, amount: Money) -> Result<Money> {
        let action = RaffleAction::SettleResellerDebt {
            reseller_id: reseller_id.clone(),
            amount,
        };
        self.execute(action, |outcome| match outcome {
            Outcome::DebtSettled(outstanding) => Some(outstanding),
            _ => None,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Financial summary of a raffle; zeros for an unknown raffle
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn financial_stats(&self, raffle_id: &RaffleId) -> Result<FinancialStats> {
        self.read(|state| financial::compute_stats(state, raffle_id))
    }

    /// One raffle
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn raffle(&self, raffle_id: &RaffleId) -> Result<Option<Raffle>> {
        self.read(|state| state.raffle(raffle_id).cloned())
    }

    /// Every raffle, ordered by id
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn raffles(&self) -> Result<Vec<Raffle>> {
        self.read(|state| state.raffles.values().cloned().collect())
    }

    /// Every ticket of a raffle in generation order
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn tickets(&self, raffle_id: &RaffleId) -> Result<Vec<Ticket>> {
        self.read(|state| state.tickets.for_raffle(raffle_id).to_vec())
    }

    /// Tickets of a raffle in one status
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn tickets_with_status(&self, raffle_id: &RaffleId, status: TicketStatus) -> Result<Vec<Ticket>> {
        self.read(|state| state.tickets.with_status(raffle_id, status).cloned().collect())
    }

    /// Tickets of a raffle held by a reseller
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn tickets_for_reseller(&self, raffle_id: &RaffleId, reseller_id: &ResellerId) -> Result<Vec<Ticket>> {
        self.read(|state| {
            state
                .tickets
                .for_reseller(raffle_id, reseller_id)
                .cloned()
                .collect()
        })
    }

    /// One ticket; the number may be unpadded (`"7"` finds `"07"`)
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn ticket(&self, raffle_id: &RaffleId, number: &str) -> Result<Option<Ticket>> {
        self.read(|state| {
            let raffle = state.raffle(raffle_id)?;
            let number = raffle.modality.normalize_number(number)?;
            state.tickets.get(raffle_id, &number).cloned()
        })
    }

    /// Sheet letters in use by a raffle
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn sheet_letters(&self, raffle_id: &RaffleId) -> Result<Vec<char>> {
        self.read(|state| state.tickets.sheet_letters(raffle_id))
    }

    /// Sheet blocks under one letter
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn sheet_blocks(&self, raffle_id: &RaffleId, letter: char) -> Result<Vec<u8>> {
        self.read(|state| state.tickets.sheet_blocks(raffle_id, letter))
    }

    /// The ten tickets of one sheet block, by index
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn sheet_page(&self, raffle_id: &RaffleId, letter: char, block: u8) -> Result<Vec<Ticket>> {
        self.read(|state| {
            state
                .tickets
                .sheet_page(raffle_id, letter, block)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// One reseller
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn reseller(&self, reseller_id: &ResellerId) -> Result<Option<Reseller>> {
        self.read(|state| state.ledger.get(reseller_id).cloned())
    }

    /// Every reseller, ordered by id
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn resellers(&self) -> Result<Vec<Reseller>> {
        self.read(|state| state.ledger.iter().cloned().collect())
    }

    /// Sales of a raffle in recording order
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn sales(&self, raffle_id: &RaffleId) -> Result<Vec<Sale>> {
        self.read(|state| {
            state
                .ledger
                .sales()
                .iter()
                .filter(|sale| &sale.raffle_id == raffle_id)
                .cloned()
                .collect()
        })
    }

    /// What a reseller sold, earned, and still owes
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn reseller_statement(&self, reseller_id: &ResellerId) -> Result<Option<ResellerStatement>> {
        self.read(|state| state.ledger.statement(reseller_id))
    }

    /// Statements of every reseller
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn reseller_statements(&self) -> Result<Vec<ResellerStatement>> {
        self.read(|state| state.ledger.statements())
    }

    /// Per-raffle ticket counts held by a reseller
    ///
    /// # Errors
    ///
    /// [`RaffleError::Store`] if the lock is poisoned.
    pub fn reseller_allocations(&self, reseller_id: &ResellerId) -> Result<Vec<ResellerAllocation>> {
        self.read(|state| financial::reseller_allocations(state, reseller_id))
    }
}

impl std::fmt::Debug for RaffleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaffleEngine").finish_non_exhaustive()
    }
}

fn owned<I>(numbers: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    numbers.into_iter().map(Into::into).collect()
}

fn transitioned(outcome: Outcome) -> Option<TransitionReport> {
    match outcome {
        Outcome::Transitioned(report) => Some(report),
        _ => None,
    }
}

fn allocated(outcome: Outcome) -> Option<AllocationReport> {
    match outcome {
        Outcome::Allocated(report) => Some(report),
        _ => None,
    }
}
