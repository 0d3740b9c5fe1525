//! # Raffle Testing
//!
//! Testing utilities and helpers for the raffle engine.
//!
//! This crate provides:
//! - Deterministic clocks (`FixedClock`, `SteppingClock`)
//! - An in-memory persistence backend that records every save
//! - `ReducerTest`, a Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use raffle_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(RaffleReducer::new())
//!     .with_env(environment_with(test_clock()))
//!     .given_state(RaffleState::default())
//!     .when_action(RaffleAction::CreateRaffle { raffle })
//!     .then_state(|state| assert_eq!(state.raffles.len(), 1))
//!     .run();
//! ```

use chrono::{DateTime, Duration, Utc};
use raffle_core::environment::Clock;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Duration, Utc};
    use raffle_core::persistence::{Persistence, PersistenceError};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use raffle_testing::mocks::FixedClock;
    /// use raffle_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step on every reading
    ///
    /// Useful when a test must tell "fresh" timestamps apart from old ones.
    #[derive(Debug)]
    pub struct SteppingClock {
        start: DateTime<Utc>,
        step_millis: i64,
        ticks: AtomicI64,
    }

    impl SteppingClock {
        /// Start at `start`, advancing `step` per call to `now`
        #[must_use]
        pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                start,
                step_millis: step.num_milliseconds(),
                ticks: AtomicI64::new(0),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
            self.start + Duration::milliseconds(self.step_millis.saturating_mul(tick))
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// In-memory persistence that keeps the last saved state
    ///
    /// Construct with [`InMemoryPersistence::failing`] to simulate an
    /// unavailable backend.
    #[derive(Debug)]
    pub struct InMemoryPersistence<S> {
        last: Mutex<Option<S>>,
        saves: AtomicUsize,
        fail: bool,
    }

    impl<S> InMemoryPersistence<S> {
        /// Backend that accepts every save
        #[must_use]
        pub const fn new() -> Self {
            Self {
                last: Mutex::new(None),
                saves: AtomicUsize::new(0),
                fail: false,
            }
        }

        /// Backend that rejects every save
        #[must_use]
        pub const fn failing() -> Self {
            Self {
                last: Mutex::new(None),
                saves: AtomicUsize::new(0),
                fail: true,
            }
        }

        /// Number of successful saves
        #[must_use]
        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    impl<S: Clone> InMemoryPersistence<S> {
        /// The most recently saved state
        #[must_use]
        pub fn last(&self) -> Option<S> {
            self.last.lock().ok().and_then(|guard| guard.clone())
        }
    }

    impl<S> Default for InMemoryPersistence<S> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<S: Clone + Send> Persistence<S> for InMemoryPersistence<S> {
        fn save(&self, state: &S) -> Result<(), PersistenceError> {
            if self.fail {
                return Err(PersistenceError::Io(std::io::Error::other(
                    "simulated backend outage",
                )));
            }
            if let Ok(mut guard) = self.last.lock() {
                *guard = Some(state.clone());
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, InMemoryPersistence, SteppingClock, test_clock};
pub use reducer_test::ReducerTest;
