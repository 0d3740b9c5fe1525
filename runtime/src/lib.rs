//! # Raffle Runtime
//!
//! Runtime implementation for the raffle engine.
//!
//! The [`Store`] owns the state behind a lock, runs the reducer for each
//! action, and executes the returned effects:
//!
//! - `Effect::Dispatch` feeds an action back into the reducer while the write
//!   lock is still held, so follow-up bookkeeping is atomic with the command
//!   that triggered it.
//! - `Effect::Persist` hands the resulting state to the configured
//!   persistence backend once the whole action chain has been reduced.
//!
//! Every mutation holds the single write lock from validation to last
//! follow-up effect. Two bulk operations can therefore never both observe a
//! ticket as available and both claim it.

use raffle_core::action::Action;
use raffle_core::persistence::{Persistence, PersistenceError};
use raffle_core::{effect::Effect, reducer::Reducer};
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Store-level metrics
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// A previous holder of the state lock panicked
        ///
        /// The state may be half-updated; the store refuses further access.
        #[error("Store state lock poisoned")]
        LockPoisoned,

        /// Feedback dispatches nested deeper than the configured limit
        ///
        /// Indicates a reducer that keeps dispatching actions to itself.
        #[error("Dispatch depth {0} exceeded")]
        DispatchDepthExceeded(usize),

        /// An explicit flush could not write the state
        #[error("Persistence failed: {0}")]
        Persistence(String),
    }
}

pub use error::StoreError;

/// Configuration for a [`Store`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum nesting of `Effect::Dispatch` chains per `send`
    pub max_dispatch_depth: usize,
}

impl StoreConfig {
    /// Set the maximum dispatch depth
    #[must_use]
    pub const fn with_max_dispatch_depth(mut self, depth: usize) -> Self {
        self.max_dispatch_depth = depth;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_dispatch_depth: 8,
        }
    }
}

/// Store module - runtime coordinator for a reducer
pub mod store {
    use super::{
        Action, Arc, Effect, Instant, Persistence, PersistenceError, Reducer, RwLock, StoreConfig,
        StoreError, metrics,
    };

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (feedback dispatch and persistence)
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::new(RaffleState::default(), RaffleReducer, environment);
    /// store.send(RaffleAction::CreateRaffle { raffle })?;
    /// let count = store.state(|s| s.raffles.len())?;
    /// ```
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: RwLock<S>,
        reducer: R,
        environment: E,
        persistence: Option<Arc<dyn Persistence<S>>>,
        config: StoreConfig,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        A: Action,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// No persistence is attached; `Effect::Persist` is a no-op until
        /// [`Store::with_persistence`] is used.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self {
                state: RwLock::new(initial_state),
                reducer,
                environment,
                persistence: None,
                config: StoreConfig::default(),
            }
        }

        /// Attach a persistence backend
        #[must_use]
        pub fn with_persistence(mut self, persistence: Arc<dyn Persistence<S>>) -> Self {
            self.persistence = Some(persistence);
            self
        }

        /// Replace the store configuration
        #[must_use]
        pub const fn with_config(mut self, config: StoreConfig) -> Self {
            self.config = config;
            self
        }

        /// Access the injected environment
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Send an action to the store
        ///
        /// Reduces the action and executes its effects before returning.
        ///
        /// # Errors
        ///
        /// - [`StoreError::LockPoisoned`] if the state lock is poisoned
        /// - [`StoreError::DispatchDepthExceeded`] if feedback dispatches nest too deep
        #[tracing::instrument(skip(self, action), fields(action = action.name()), name = "store_send")]
        pub fn send(&self, action: A) -> Result<(), StoreError> {
            self.send_and_inspect(action, |_| ())
        }

        /// Send an action and read the resulting state under the same lock
        ///
        /// This is the request-response path: the closure observes exactly
        /// the state produced by `action` and its feedback dispatches, with no
        /// other writer interleaved.
        ///
        /// # Errors
        ///
        /// Same as [`Store::send`].
        pub fn send_and_inspect<F, T>(&self, action: A, inspect: F) -> Result<T, StoreError>
        where
            F: FnOnce(&S) -> T,
        {
            let started = Instant::now();
            let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;

            let persist = self.reduce_chain(&mut state, action, 0)?;

            if persist {
                if let Err(error) = self.persist(&state) {
                    metrics::record_persist_failure();
                    tracing::warn!(%error, "Persisting state failed; will retry on next mutation");
                }
            }

            let result = inspect(&state);
            drop(state);

            metrics::record_send_duration(started.elapsed());
            Ok(result)
        }

        /// Read from current state via a closure
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::LockPoisoned`] if the state lock is poisoned.
        pub fn state<F, T>(&self, f: F) -> Result<T, StoreError>
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
            Ok(f(&state))
        }

        /// Persist the current state immediately, regardless of pending effects
        ///
        /// # Errors
        ///
        /// - [`StoreError::LockPoisoned`] if the state lock is poisoned
        /// - [`StoreError::Persistence`] if the backend rejects the write
        pub fn flush(&self) -> Result<(), StoreError> {
            let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
            self.persist(&state).map_err(|error| {
                metrics::record_persist_failure();
                StoreError::Persistence(error.to_string())
            })
        }

        /// Reduce one action and every action it dispatches, depth-first
        ///
        /// Returns whether any effect in the chain requested persistence.
        fn reduce_chain(&self, state: &mut S, action: A, depth: usize) -> Result<bool, StoreError> {
            if depth > self.config.max_dispatch_depth {
                tracing::error!(depth, "Dispatch depth exceeded, dropping action {}", action.name());
                return Err(StoreError::DispatchDepthExceeded(depth));
            }

            metrics::record_action(action.name());
            tracing::trace!(depth, action = action.name(), "Reducing action");

            let effects = self.reducer.reduce(state, action, &self.environment);

            let mut persist = false;
            for effect in effects {
                persist |= self.execute(state, effect, depth)?;
            }
            Ok(persist)
        }

        fn execute(&self, state: &mut S, effect: Effect<A>, depth: usize) -> Result<bool, StoreError> {
            match effect {
                Effect::None => Ok(false),
                Effect::Persist => Ok(true),
                Effect::Dispatch(action) => self.reduce_chain(state, *action, depth + 1),
                Effect::Sequential(effects) => {
                    let mut persist = false;
                    for effect in effects {
                        persist |= self.execute(state, effect, depth)?;
                    }
                    Ok(persist)
                }
            }
        }

        fn persist(&self, state: &S) -> Result<(), PersistenceError> {
            match &self.persistence {
                Some(persistence) => persistence.save(state),
                None => Ok(()),
            }
        }
    }
}

pub use store::Store;
