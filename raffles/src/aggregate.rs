//! Raffle aggregate: commands, follow-up actions and the reducer.
//!
//! Every mutation of raffles, tickets, resellers and sales is a
//! [`RaffleAction`] reduced here. The reducer records the command's
//! [`Outcome`] on the state and returns effects: `Persist` after any change,
//! and a `SaleRecorded` feedback action that credits the reseller ledger in
//! the same critical section as the sale itself.

use crate::allocation;
use crate::environment::RaffleEnvironment;
use crate::error::RaffleError;
use crate::lifecycle;
use crate::metrics;
use crate::ranges;
use crate::state::{Outcome, RaffleState};
use crate::tickets::Overwrite;
use crate::types::{
    AllocationReport, Modality, Money, NewRaffle, NewReseller, RaffleId, RafflePatch, ResellerId,
    ResellerPatch, Sale, SaleDetails, SaleId, TicketStatus, TransitionReport,
};
use raffle_core::action::Action;
use raffle_core::effect::Effect;
use raffle_core::reducer::Reducer;
use smallvec::{SmallVec, smallvec};

type Effects = SmallVec<[Effect<RaffleAction>; 4]>;

// ============================================================================
// Actions
// ============================================================================

/// Actions for the raffle aggregate
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RaffleAction {
    // Commands: raffles
    /// Create a raffle and generate its tickets
    CreateRaffle {
        /// Raffle to create
        raffle: NewRaffle,
    },

    /// Generate tickets for a raffle that has none
    GenerateTickets {
        /// Raffle
        raffle_id: RaffleId,
    },

    /// Reshuffle a raffle with no reserved or sold tickets
    RegenerateTickets {
        /// Raffle
        raffle_id: RaffleId,
    },

    /// Remove every ticket of a raffle with no sales
    ClearTickets {
        /// Raffle
        raffle_id: RaffleId,
    },

    /// Edit raffle metadata
    UpdateRaffle {
        /// Raffle
        raffle_id: RaffleId,
        /// Fields to change
        patch: RafflePatch,
    },

    // Commands: tickets
    /// Administrative status overwrite, regardless of current status
    SetTicketStatus {
        /// Raffle
        raffle_id: RaffleId,
        /// Ticket numbers
        numbers: Vec<String>,
        /// Target status
        status: TicketStatus,
        /// Reseller for reserved/sold tickets
        reseller_id: Option<ResellerId>,
    },

    /// Sell tickets, recording one sale
    SellTickets {
        /// Raffle
        raffle_id: RaffleId,
        /// Ticket numbers
        numbers: Vec<String>,
        /// Buyer, reseller, payment status and idempotency key
        sale: SaleDetails,
    },

    // Commands: allocation
    /// Reserve available tickets for a reseller
    AssignToReseller {
        /// Raffle
        raffle_id: RaffleId,
        /// Reseller
        reseller_id: ResellerId,
        /// Ticket numbers
        numbers: Vec<String>,
    },

    /// Reserve tickets given as range text such as `"1-10,15"`
    ReserveFromText {
        /// Raffle
        raffle_id: RaffleId,
        /// Reseller
        reseller_id: ResellerId,
        /// Comma-separated numbers and ranges
        text: String,
    },

    /// Return a reseller's reservations to available
    RevokeFromReseller {
        /// Raffle
        raffle_id: RaffleId,
        /// Reseller
        reseller_id: ResellerId,
        /// Ticket numbers
        numbers: Vec<String>,
    },

    /// Copy reservations onto the same numbers of another raffle
    CloneAllocations {
        /// Raffle to copy from
        source: RaffleId,
        /// Raffle to copy into
        target: RaffleId,
        /// Only this reseller's reservations
        reseller_id: Option<ResellerId>,
    },

    // Commands: resellers
    /// Register a reseller
    AddReseller {
        /// Reseller details
        reseller: NewReseller,
    },

    /// Edit a reseller
    UpdateReseller {
        /// Reseller
        reseller_id: ResellerId,
        /// Fields to change
        patch: ResellerPatch,
    },

    /// Delete a reseller, releasing reservations and flagging sold tickets
    DeleteReseller {
        /// Reseller
        reseller_id: ResellerId,
    },

    /// Record a payment from a reseller
    SettleResellerDebt {
        /// Reseller
        reseller_id: ResellerId,
        /// Amount paid in
        amount: Money,
    },

    // Follow-ups
    /// A sale was recorded; credit the reseller
    SaleRecorded {
        /// Sale
        sale_id: SaleId,
        /// Reseller to credit
        reseller_id: Option<ResellerId>,
        /// Sale total
        amount: Money,
        /// Tickets sold
        tickets: usize,
    },
}

impl Action for RaffleAction {
    fn name(&self) -> &'static str {
        match self {
            Self::CreateRaffle { .. } => "create_raffle",
            Self::GenerateTickets { .. } => "generate_tickets",
            Self::RegenerateTickets { .. } => "regenerate_tickets",
            Self::ClearTickets { .. } => "clear_tickets",
            Self::UpdateRaffle { .. } => "update_raffle",
            Self::SetTicketStatus { .. } => "set_ticket_status",
            Self::SellTickets { .. } => "sell_tickets",
            Self::AssignToReseller { .. } => "assign_to_reseller",
            Self::ReserveFromText { .. } => "reserve_from_text",
            Self::RevokeFromReseller { .. } => "revoke_from_reseller",
            Self::CloneAllocations { .. } => "clone_allocations",
            Self::AddReseller { .. } => "add_reseller",
            Self::UpdateReseller { .. } => "update_reseller",
            Self::DeleteReseller { .. } => "delete_reseller",
            Self::SettleResellerDebt { .. } => "settle_reseller_debt",
            Self::SaleRecorded { .. } => "sale_recorded",
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the raffle aggregate
///
/// Ticket claims are decided against the state the reducer is handed, and
/// the store holds its write lock across the whole reduce, so two bulk
/// commands can never both see a ticket as available.
#[derive(Debug, Clone, Copy, Default)]
pub struct RaffleReducer;

impl RaffleReducer {
    /// Creates a new `RaffleReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn sell(
        state: &mut RaffleState,
        env: &RaffleEnvironment,
        raffle_id: &RaffleId,
        numbers: Vec<String>,
        sale: SaleDetails,
    ) -> Effects {
        if let Some(existing) = sale
            .idempotency_key
            .as_deref()
            .and_then(|key| state.ledger.sale_for_key(key))
        {
            tracing::info!(raffle_id = %raffle_id, sale_id = %existing, "Duplicate sale request ignored");
            let report = TransitionReport {
                skipped: numbers,
                sale_id: Some(existing.clone()),
                replayed: true,
                ..TransitionReport::default()
            };
            return record(state, Outcome::Transitioned(report), false);
        }

        let Some(modality) = target_modality(state, raffle_id, sale.reseller_id.as_ref()) else {
            let report = TransitionReport {
                skipped: numbers,
                ..TransitionReport::default()
            };
            return record(state, Outcome::Transitioned(report), false);
        };
        let price = state.raffles.get(raffle_id).map_or(Money::ZERO, |r| r.price);

        let buyer_name = match sale.buyer_name.trim() {
            "" => SaleDetails::COUNTER_BUYER.to_string(),
            name => name.to_string(),
        };
        let buyer_phone = sale.buyer_phone.trim().to_string();

        let (valid, mut skipped) = canonical_numbers(modality, numbers);
        let now = env.clock.now();
        let (applied, missing) = state.tickets.overwrite(
            raffle_id,
            &valid,
            Overwrite {
                status: TicketStatus::Sold,
                reseller_id: sale.reseller_id.as_ref(),
                buyer: Some((buyer_name.as_str(), buyer_phone.as_str())),
                now,
            },
        );
        skipped.extend(missing);

        if applied.is_empty() {
            tracing::debug!(raffle_id = %raffle_id, "Sale matched no tickets, nothing recorded");
            let report = TransitionReport {
                skipped,
                ..TransitionReport::default()
            };
            return record(state, Outcome::Transitioned(report), false);
        }

        let count = applied.len();
        let total = price.times(count as u64);
        let sale_id = fresh_id(|| env.ids.sale_id(), |id| state.ledger.has_sale(id));
        state.ledger.record_sale(Sale {
            id: sale_id.clone(),
            raffle_id: raffle_id.clone(),
            ticket_numbers: applied.clone(),
            total_amount: total,
            buyer_name,
            buyer_phone,
            reseller_id: sale.reseller_id.clone(),
            created_at: now,
            payment_status: sale.payment_status,
            idempotency_key: sale.idempotency_key,
        });
        tracing::info!(raffle_id = %raffle_id, sale_id = %sale_id, tickets = count, total = %total, "Sale recorded");

        let report = TransitionReport {
            applied,
            skipped,
            sale_id: Some(sale_id.clone()),
            replayed: false,
        };
        state.last_outcome = Some(Outcome::Transitioned(report));

        smallvec![
            Effect::dispatch(RaffleAction::SaleRecorded {
                sale_id,
                reseller_id: sale.reseller_id,
                amount: total,
                tickets: count,
            }),
            Effect::Persist
        ]
    }

    fn overwrite(
        state: &mut RaffleState,
        env: &RaffleEnvironment,
        raffle_id: &RaffleId,
        numbers: Vec<String>,
        status: TicketStatus,
        reseller_id: Option<&ResellerId>,
    ) -> Effects {
        let reseller_id = reseller_id.filter(|_| status.holds_reseller());
        let Some(modality) = target_modality(state, raffle_id, reseller_id) else {
            let report = TransitionReport {
                skipped: numbers,
                ..TransitionReport::default()
            };
            return record(state, Outcome::Transitioned(report), false);
        };

        let (valid, mut skipped) = canonical_numbers(modality, numbers);
        let (applied, missing) = state.tickets.overwrite(
            raffle_id,
            &valid,
            Overwrite {
                status,
                reseller_id,
                buyer: None,
                now: env.clock.now(),
            },
        );
        skipped.extend(missing);

        metrics::record_tickets("overwritten", applied.len());
        tracing::info!(raffle_id = %raffle_id, %status, applied = applied.len(), "Ticket status overwritten");

        let changed = !applied.is_empty();
        let report = TransitionReport {
            applied,
            skipped,
            ..TransitionReport::default()
        };
        record(state, Outcome::Transitioned(report), changed)
    }

    fn assign(
        state: &mut RaffleState,
        env: &RaffleEnvironment,
        raffle_id: &RaffleId,
        reseller_id: &ResellerId,
        numbers: Vec<String>,
    ) -> AllocationReport {
        let Some(modality) = target_modality(state, raffle_id, Some(reseller_id)) else {
            return AllocationReport::all_skipped(numbers);
        };
        let (valid, invalid) = canonical_numbers(modality, numbers);
        let mut report =
            allocation::assign(&mut state.tickets, raffle_id, reseller_id, &valid, env.clock.now());
        report.skipped.extend(invalid);

        metrics::record_tickets("reserved", report.applied.len());
        tracing::info!(
            raffle_id = %raffle_id,
            reseller_id = %reseller_id,
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "Tickets assigned to reseller"
        );
        report
    }

    fn delete_reseller(state: &mut RaffleState, reseller_id: &ResellerId) -> Effects {
        if !state.ledger.contains(reseller_id) {
            let error = RaffleError::ResellerNotFound(reseller_id.clone());
            return record(state, Outcome::Rejected(error), false);
        }

        let report = allocation::release_reseller(&mut state.tickets, reseller_id);
        state.ledger.remove(reseller_id);

        metrics::record_tickets("released", report.released);
        tracing::info!(
            reseller_id = %reseller_id,
            released = report.released,
            flagged = report.flagged,
            "Reseller deleted"
        );
        record(state, Outcome::ResellerDeleted(report), true)
    }
}

impl Reducer for RaffleReducer {
    type State = RaffleState;
    type Action = RaffleAction;
    type Environment = RaffleEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per command
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        tracing::debug!(action = action.name(), "Reducing raffle action");

        match action {
            // ========== Raffles ==========
            RaffleAction::CreateRaffle { raffle } => {
                match lifecycle::create(state, raffle, env.clock.now(), env.shuffler.as_ref()) {
                    Ok((raffle_id, generation)) => {
                        let changed = generation.generated > 0;
                        record(state, Outcome::RaffleCreated { raffle_id, generation }, changed)
                    }
                    Err(error) => reject(state, error),
                }
            }

            RaffleAction::GenerateTickets { raffle_id } => {
                let report = lifecycle::generate(state, &raffle_id, env.shuffler.as_ref());
                record(state, Outcome::Generated(report), report.generated > 0)
            }

            RaffleAction::RegenerateTickets { raffle_id } => {
                let done = lifecycle::regenerate(state, &raffle_id, env.shuffler.as_ref());
                record(state, Outcome::Regenerated(done), done)
            }

            RaffleAction::ClearTickets { raffle_id } => {
                let done = lifecycle::clear(state, &raffle_id);
                record(state, Outcome::Cleared(done), done)
            }

            RaffleAction::UpdateRaffle { raffle_id, patch } => {
                match lifecycle::update(state, &raffle_id, patch, env.shuffler.as_ref()) {
                    Ok(report) => record(state, Outcome::Patched(report), true),
                    Err(error) => reject(state, error),
                }
            }

            // ========== Tickets ==========
            RaffleAction::SetTicketStatus {
                raffle_id,
                numbers,
                status: TicketStatus::Sold,
                reseller_id,
            } => {
                let sale = SaleDetails {
                    reseller_id,
                    ..SaleDetails::default()
                };
                Self::sell(state, env, &raffle_id, numbers, sale)
            }

            RaffleAction::SetTicketStatus {
                raffle_id,
                numbers,
                status,
                reseller_id,
            } => Self::overwrite(state, env, &raffle_id, numbers, status, reseller_id.as_ref()),

            RaffleAction::SellTickets {
                raffle_id,
                numbers,
                sale,
            } => Self::sell(state, env, &raffle_id, numbers, sale),

            // ========== Allocation ==========
            RaffleAction::AssignToReseller {
                raffle_id,
                reseller_id,
                numbers,
            } => {
                let report = Self::assign(state, env, &raffle_id, &reseller_id, numbers);
                let changed = !report.applied.is_empty();
                record(state, Outcome::Allocated(report), changed)
            }

            RaffleAction::ReserveFromText {
                raffle_id,
                reseller_id,
                text,
            } => {
                let Some(modality) = state.raffle(&raffle_id).map(|r| r.modality) else {
                    return record(state, Outcome::Allocated(AllocationReport::default()), false);
                };
                let parsed = ranges::parse_selection(&text, modality);
                if parsed.is_blank() {
                    return reject(state, RaffleError::EmptyNumberSelection);
                }
                if !parsed.rejected.is_empty() {
                    tracing::debug!(rejected = ?parsed.rejected, "Malformed selection tokens dropped");
                }

                let mut report = Self::assign(state, env, &raffle_id, &reseller_id, parsed.numbers);
                report.rejected = parsed.rejected;
                let changed = !report.applied.is_empty();
                record(state, Outcome::Allocated(report), changed)
            }

            RaffleAction::RevokeFromReseller {
                raffle_id,
                reseller_id,
                numbers,
            } => {
                let Some(modality) = state.raffle(&raffle_id).map(|r| r.modality) else {
                    let report = AllocationReport::all_skipped(numbers);
                    return record(state, Outcome::Allocated(report), false);
                };
                let (valid, invalid) = canonical_numbers(modality, numbers);
                let mut report = allocation::revoke(&mut state.tickets, &raffle_id, &reseller_id, &valid);
                report.skipped.extend(invalid);

                metrics::record_tickets("revoked", report.applied.len());
                tracing::info!(
                    raffle_id = %raffle_id,
                    reseller_id = %reseller_id,
                    applied = report.applied.len(),
                    "Reservations revoked"
                );
                let changed = !report.applied.is_empty();
                record(state, Outcome::Allocated(report), changed)
            }

            RaffleAction::CloneAllocations {
                source,
                target,
                reseller_id,
            } => {
                let modalities = (
                    state.raffle(&source).map(|r| r.modality),
                    state.raffle(&target).map(|r| r.modality),
                );
                let (Some(from), Some(to)) = modalities else {
                    tracing::warn!(source = %source, target = %target, "Cannot clone between unknown raffles");
                    return record(state, Outcome::Allocated(AllocationReport::default()), false);
                };
                if from != to {
                    tracing::debug!(%from, %to, "Cross-modality clone is unsupported, nothing matches");
                }

                let report = allocation::clone_reservations(
                    &mut state.tickets,
                    &source,
                    &target,
                    reseller_id.as_ref(),
                    from == to,
                    env.clock.now(),
                );
                metrics::record_tickets("cloned", report.applied.len());
                tracing::info!(
                    source = %source,
                    target = %target,
                    applied = report.applied.len(),
                    skipped = report.skipped.len(),
                    "Reservations cloned"
                );
                let changed = !report.applied.is_empty();
                record(state, Outcome::Allocated(report), changed)
            }

            // ========== Resellers ==========
            RaffleAction::AddReseller { reseller } => {
                let reseller_id =
                    fresh_id(|| env.ids.reseller_id(), |id| state.ledger.contains(id));
                match state.ledger.add(reseller_id.clone(), reseller) {
                    Ok(_) => {
                        tracing::info!(reseller_id = %reseller_id, "Reseller added");
                        record(state, Outcome::ResellerAdded(reseller_id), true)
                    }
                    Err(error) => reject(state, error),
                }
            }

            RaffleAction::UpdateReseller { reseller_id, patch } => {
                match state.ledger.update(&reseller_id, patch) {
                    Ok(_) => record(state, Outcome::ResellerUpdated(reseller_id), true),
                    Err(error) => reject(state, error),
                }
            }

            RaffleAction::DeleteReseller { reseller_id } => Self::delete_reseller(state, &reseller_id),

            RaffleAction::SettleResellerDebt { reseller_id, amount } => {
                match state.ledger.settle(&reseller_id, amount) {
                    Ok(outstanding) => {
                        metrics::record_settlement(amount.cents());
                        tracing::info!(reseller_id = %reseller_id, %amount, %outstanding, "Reseller payment recorded");
                        record(state, Outcome::DebtSettled(outstanding), true)
                    }
                    Err(error) => reject(state, error),
                }
            }

            // ========== Follow-ups ==========
            RaffleAction::SaleRecorded {
                sale_id,
                reseller_id,
                amount,
                tickets,
            } => {
                metrics::record_sale(amount.cents());
                metrics::record_tickets("sold", tickets);
                if let Some(reseller_id) = reseller_id {
                    if !state.ledger.credit(&reseller_id, amount) {
                        tracing::warn!(sale_id = %sale_id, reseller_id = %reseller_id, "Sale credited to unknown reseller");
                    }
                }
                SmallVec::new()
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Store the outcome; request persistence when state changed
fn record(state: &mut RaffleState, outcome: Outcome, changed: bool) -> Effects {
    state.last_outcome = Some(outcome);
    if changed {
        smallvec![Effect::Persist]
    } else {
        SmallVec::new()
    }
}

fn reject(state: &mut RaffleState, error: RaffleError) -> Effects {
    tracing::warn!(%error, "Command rejected");
    record(state, Outcome::Rejected(error), false)
}

/// Attempts before a colliding identifier is handed on as-is
const MAX_ID_DRAWS: usize = 64;

/// Draw identifiers until one is not `taken`
///
/// A generator restarted on loaded state (such as `SequentialIds`) hands out
/// ids that already exist; those are skipped. After [`MAX_ID_DRAWS`] the
/// last draw is returned and the caller's own uniqueness check applies.
fn fresh_id<T>(mut draw: impl FnMut() -> T, taken: impl Fn(&T) -> bool) -> T {
    let mut id = draw();
    for _ in 1..MAX_ID_DRAWS {
        if !taken(&id) {
            break;
        }
        id = draw();
    }
    id
}

/// Modality of the raffle when it (and the reseller, if named) exists
fn target_modality(
    state: &RaffleState,
    raffle_id: &RaffleId,
    reseller_id: Option<&ResellerId>,
) -> Option<Modality> {
    let Some(raffle) = state.raffle(raffle_id) else {
        tracing::warn!(raffle_id = %raffle_id, "Unknown raffle, nothing applied");
        return None;
    };
    if let Some(reseller_id) = reseller_id {
        if !state.ledger.contains(reseller_id) {
            tracing::warn!(reseller_id = %reseller_id, "Unknown reseller, nothing applied");
            return None;
        }
    }
    Some(raffle.modality)
}

/// Split caller input into canonical ticket numbers and unreadable entries
fn canonical_numbers(modality: Modality, numbers: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut valid = Vec::with_capacity(numbers.len());
    let mut invalid = Vec::new();
    for number in numbers {
        match modality.normalize_number(&number) {
            Some(canonical) => valid.push(canonical),
            None => invalid.push(number),
        }
    }
    (valid, invalid)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::environment::SequentialIds;
    use crate::numbering::SeededShuffler;
    use crate::types::CommissionRate;
    use raffle_core::environment::Clock;
    use raffle_testing::reducer_test::assertions;
    use raffle_testing::{ReducerTest, test_clock};
    use std::sync::Arc;

    fn env() -> RaffleEnvironment {
        RaffleEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(SequentialIds::new()),
            Arc::new(SeededShuffler::new(11)),
        )
    }

    fn create(id: &str) -> RaffleAction {
        RaffleAction::CreateRaffle {
            raffle: NewRaffle::new(id, "Rifa", Money::from_reais(5), Modality::Hundred, test_clock().now()),
        }
    }

    fn add_reseller() -> RaffleAction {
        RaffleAction::AddReseller {
            reseller: NewReseller {
                name: "Rita".into(),
                phone: "11".into(),
                pix_key: None,
                commission_rate: CommissionRate::from_percent(10).unwrap(),
            },
        }
    }

    fn nums(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn create_generates_and_persists() {
        ReducerTest::new(RaffleReducer::new())
            .with_env(env())
            .given_state(RaffleState::default())
            .when_action(create("r"))
            .then_state(|state| {
                assert_eq!(state.tickets.for_raffle(&RaffleId::new("r")).len(), 100);
                assert!(matches!(state.last_outcome, Some(Outcome::RaffleCreated { .. })));
            })
            .then_effects(assertions::assert_persists)
            .run();
    }

    #[test]
    fn restarted_id_source_skips_taken_reseller_ids() {
        let mut state = RaffleState::default();
        state
            .ledger
            .add(
                ResellerId::new("reseller-1"),
                NewReseller::new("Ana", CommissionRate::from_percent(10).unwrap()),
            )
            .unwrap();

        ReducerTest::new(RaffleReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(add_reseller())
            .then_state(|state| {
                let added = ResellerId::new("reseller-2");
                assert_eq!(state.last_outcome, Some(Outcome::ResellerAdded(added.clone())));
                assert_eq!(state.ledger.get(&ResellerId::new("reseller-1")).unwrap().name, "Ana");
                assert_eq!(state.ledger.get(&added).unwrap().name, "Rita");
            })
            .then_effects(assertions::assert_persists)
            .run();
    }

    #[test]
    fn sale_dispatches_ledger_credit() {
        // SequentialIds hands out "reseller-1" to the first reseller.
        let reseller = ResellerId::new("reseller-1");
        ReducerTest::new(RaffleReducer::new())
            .with_env(env())
            .given_state(RaffleState::default())
            .given_action(create("r"))
            .given_action(add_reseller())
            .when_action(RaffleAction::SetTicketStatus {
                raffle_id: RaffleId::new("r"),
                numbers: nums(&["00", "01"]),
                status: TicketStatus::Sold,
                reseller_id: Some(reseller.clone()),
            })
            .then_state(|state| {
                assert_eq!(state.ledger.sales().len(), 1);
                assert_eq!(state.ledger.sales()[0].total_amount, Money::from_reais(10));
            })
            .then_effects(move |effects| {
                assertions::assert_has_dispatch(effects);
                assertions::assert_persists(effects);
                assert!(effects.iter().any(|e| matches!(
                    e,
                    Effect::Dispatch(action) if matches!(
                        action.as_ref(),
                        RaffleAction::SaleRecorded { reseller_id: Some(r), amount, tickets: 2, .. }
                            if *r == reseller && *amount == Money::from_reais(10)
                    )
                )));
            })
            .run();
    }

    #[test]
    fn sale_recorded_credits_reseller_without_further_effects() {
        ReducerTest::new(RaffleReducer::new())
            .with_env(env())
            .given_state(RaffleState::default())
            .given_action(add_reseller())
            .when_action(RaffleAction::SaleRecorded {
                sale_id: SaleId::new("s"),
                reseller_id: Some(ResellerId::new("reseller-1")),
                amount: Money::from_reais(7),
                tickets: 1,
            })
            .then_state(|state| {
                let reseller = state.ledger.get(&ResellerId::new("reseller-1")).unwrap();
                assert_eq!(reseller.total_sales, Money::from_reais(7));
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn assigning_to_unknown_reseller_changes_nothing() {
        ReducerTest::new(RaffleReducer::new())
            .with_env(env())
            .given_state(RaffleState::default())
            .given_action(create("r"))
            .when_action(RaffleAction::AssignToReseller {
                raffle_id: RaffleId::new("r"),
                reseller_id: ResellerId::new("ghost"),
                numbers: nums(&["01"]),
            })
            .then_state(|state| {
                assert_eq!(state.tickets.count(&RaffleId::new("r"), TicketStatus::Reserved), 0);
                assert_eq!(
                    state.last_outcome,
                    Some(Outcome::Allocated(AllocationReport::all_skipped(nums(&["01"]))))
                );
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn blank_range_text_is_rejected() {
        ReducerTest::new(RaffleReducer::new())
            .with_env(env())
            .given_state(RaffleState::default())
            .given_action(create("r"))
            .given_action(add_reseller())
            .when_action(RaffleAction::ReserveFromText {
                raffle_id: RaffleId::new("r"),
                reseller_id: ResellerId::new("reseller-1"),
                text: " , ".into(),
            })
            .then_state(|state| {
                assert_eq!(
                    state.last_outcome,
                    Some(Outcome::Rejected(RaffleError::EmptyNumberSelection))
                );
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn short_numbers_are_padded_before_matching() {
        ReducerTest::new(RaffleReducer::new())
            .with_env(env())
            .given_state(RaffleState::default())
            .given_action(create("r"))
            .when_action(RaffleAction::SetTicketStatus {
                raffle_id: RaffleId::new("r"),
                numbers: nums(&["7", "x"]),
                status: TicketStatus::Blocked,
                reseller_id: None,
            })
            .then_state(|state| {
                let ticket = state.tickets.get(&RaffleId::new("r"), "07").unwrap();
                assert_eq!(ticket.status, TicketStatus::Blocked);
                let Some(Outcome::Transitioned(report)) = &state.last_outcome else {
                    panic!("expected a transition outcome");
                };
                assert_eq!(report.applied, ["07"]);
                assert_eq!(report.skipped, ["x"]);
            })
            .then_effects(assertions::assert_persists)
            .run();
    }
}
