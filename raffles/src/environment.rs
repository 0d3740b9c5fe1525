//! Injected dependencies of the raffle reducer.

use crate::numbering::{NumberShuffler, SeededShuffler, ThreadRngShuffler};
use crate::types::{ResellerId, SaleId};
use raffle_core::environment::{Clock, SystemClock};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of identifiers for records the engine creates
pub trait IdGenerator: Send + Sync {
    /// Identifier for a new reseller
    fn reseller_id(&self) -> ResellerId;

    /// Identifier for a new sale
    fn sale_id(&self) -> SaleId;
}

/// Random UUID v4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn reseller_id(&self) -> ResellerId {
        ResellerId::new(Uuid::new_v4().to_string())
    }

    fn sale_id(&self) -> SaleId {
        SaleId::new(Uuid::new_v4().to_string())
    }
}

/// Predictable identifiers (`reseller-1`, `sale-2`, ...) for tests and demos
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Start counting at 1
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    fn bump(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn reseller_id(&self) -> ResellerId {
        ResellerId::new(format!("reseller-{}", self.bump()))
    }

    fn sale_id(&self) -> SaleId {
        SaleId::new(format!("sale-{}", self.bump()))
    }
}

/// Environment dependencies for the raffle reducer
#[derive(Clone)]
pub struct RaffleEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
    /// Identifier source
    pub ids: Arc<dyn IdGenerator>,
    /// Ticket number shuffler
    pub shuffler: Arc<dyn NumberShuffler>,
}

impl RaffleEnvironment {
    /// Creates a new `RaffleEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        shuffler: Arc<dyn NumberShuffler>,
    ) -> Self {
        Self {
            clock,
            ids,
            shuffler,
        }
    }

    /// Wall clock, UUIDs, and a thread-local shuffle, or a seeded one when
    /// `shuffle_seed` is given
    #[must_use]
    pub fn production(shuffle_seed: Option<u64>) -> Self {
        let shuffler: Arc<dyn NumberShuffler> = match shuffle_seed {
            Some(seed) => Arc::new(SeededShuffler::new(seed)),
            None => Arc::new(ThreadRngShuffler),
        };
        Self::new(Arc::new(SystemClock), Arc::new(UuidIds), shuffler)
    }
}

impl std::fmt::Debug for RaffleEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaffleEnvironment").finish_non_exhaustive()
    }
}
