//! Aggregate state of the raffle engine.

use crate::error::RaffleError;
use crate::ledger::ResellerLedger;
use crate::tickets::TicketBook;
use crate::types::{
    AllocationReport, DeletionReport, GenerationReport, Money, PatchReport, Raffle, RaffleId,
    ResellerId, TransitionReport,
};
use std::collections::BTreeMap;

/// Everything the engine knows: raffles, tickets, resellers and sales
#[derive(Clone, Debug, Default)]
pub struct RaffleState {
    /// Raffle metadata by id
    pub raffles: BTreeMap<RaffleId, Raffle>,
    /// Ticket rows of every raffle
    pub tickets: TicketBook,
    /// Resellers and the sale log
    pub ledger: ResellerLedger,
    /// Outcome of the most recent command
    pub last_outcome: Option<Outcome>,
}

impl RaffleState {
    /// Raffle metadata
    #[must_use]
    pub fn raffle(&self, raffle_id: &RaffleId) -> Option<&Raffle> {
        self.raffles.get(raffle_id)
    }
}

/// What a command did, recorded for the caller
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Raffle stored (or already present) and its tickets generated
    RaffleCreated {
        /// Raffle id
        raffle_id: RaffleId,
        /// Generation result
        generation: GenerationReport,
    },
    /// Generation attempted
    Generated(GenerationReport),
    /// Regeneration succeeded or was refused
    Regenerated(bool),
    /// Clearing succeeded or was refused
    Cleared(bool),
    /// Raffle metadata updated
    Patched(PatchReport),
    /// Status overwrite or sale
    Transitioned(TransitionReport),
    /// Guarded assign, revoke or clone
    Allocated(AllocationReport),
    /// Reseller registered
    ResellerAdded(ResellerId),
    /// Reseller updated
    ResellerUpdated(ResellerId),
    /// Reseller removed with its tickets released or flagged
    ResellerDeleted(DeletionReport),
    /// Payment recorded; amount still owed
    DebtSettled(Money),
    /// The command was refused
    Rejected(RaffleError),
}
