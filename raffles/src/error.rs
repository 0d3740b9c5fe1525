//! Error types for the raffle engine.

use crate::types::{Money, RaffleId, ResellerId};
use raffle_core::persistence::PersistenceError;
use raffle_runtime::StoreError;
use thiserror::Error;

/// Errors reported by raffle operations
///
/// Guard refusals (regenerate/clear with committed tickets) are not errors;
/// they come back as `Ok(false)`. Bulk operations skip what they cannot apply
/// and report it instead of failing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// No raffle with this id
    #[error("Raffle not found: {0}")]
    RaffleNotFound(RaffleId),

    /// No reseller with this id
    #[error("Reseller not found: {0}")]
    ResellerNotFound(ResellerId),

    /// A reseller with this id already exists
    #[error("Reseller already exists: {0}")]
    DuplicateReseller(ResellerId),

    /// Ticket price must be positive
    #[error("Ticket price must be greater than zero")]
    InvalidPrice,

    /// Commission rate above 100%
    #[error("Commission rate of {0} basis points exceeds 100%")]
    InvalidCommissionRate(u32),

    /// Blank raffle title or reseller name
    #[error("{0} must not be blank")]
    InvalidTitle(&'static str),

    /// Range text contained no numbers at all
    #[error("No ticket numbers given")]
    EmptyNumberSelection,

    /// Settlement amount of zero
    #[error("Settlement amount must be greater than zero")]
    InvalidSettlement,

    /// Settlement larger than the outstanding debt
    #[error("Settlement of {requested} exceeds outstanding {outstanding}")]
    SettlementExceedsDebt {
        /// Amount offered
        requested: Money,
        /// Amount actually owed
        outstanding: Money,
    },

    /// The store runtime failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading or writing a snapshot failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A command completed without recording its outcome
    #[error("Command {0} produced no outcome")]
    NoOutcome(&'static str),
}

impl From<PersistenceError> for RaffleError {
    fn from(error: PersistenceError) -> Self {
        Self::Persistence(error.to_string())
    }
}

/// Result type for raffle operations
pub type Result<T> = std::result::Result<T, RaffleError>;
