//! # Raffle Core
//!
//! Core traits and types for the raffle engine.
//!
//! Every mutation of raffle state goes through the Reducer pattern:
//!
//! - **State**: the raffle ledger (raffles, tickets, resellers, sales)
//! - **Action**: all inputs to a reducer (commands and follow-up notifications)
//! - **Reducer**: pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: description of follow-up work (not execution)
//! - **Environment**: injected dependencies (clock, id generation, shuffling)
//!
//! The runtime crate owns the state and executes the effects; this crate only
//! defines the seams.
//!
//! ## Example
//!
//! ```ignore
//! use raffle_core::*;
//!
//! impl Reducer for TicketReducer {
//!     type State = TicketState;
//!     type Action = TicketAction;
//!     type Environment = TicketEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut TicketState,
//!         action: TicketAction,
//!         env: &TicketEnvironment,
//!     ) -> SmallVec<[Effect<TicketAction>; 4]> {
//!         match action {
//!             TicketAction::Reserve { number, .. } => {
//!                 state.reserve(&number, env.clock.now());
//!                 smallvec![Effect::Persist]
//!             }
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Action module - Unified input type for reducers
///
/// Actions unify commands (requests to change state) and the follow-up
/// notifications a reducer dispatches to itself.
pub mod action {
    /// Common behaviour of action enums
    pub trait Action {
        /// Stable, low-cardinality name used for logs and metric labels
        fn name(&self) -> &'static str;
    }
}

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They hold every business rule and are deterministic given their environment.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime, in order
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned from reducers. The Store executes them after
/// the reducer returns, while it still holds the state lock, so a follow-up
/// action observes exactly the state the originating action produced.
pub mod effect {
    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Feed an action back into the reducer before the lock is released
        Dispatch(Box<Action>),

        /// Hand the current state to the configured persistence backend
        Persist,

        /// Run effects one after another
        Sequential(Vec<Effect<Action>>),
    }

    impl<Action> Effect<Action> {
        /// Wrap an action as a feedback effect
        #[must_use]
        pub fn dispatch(action: Action) -> Self {
            Effect::Dispatch(Box::new(action))
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Whether this effect (or any nested effect) requests persistence
        #[must_use]
        pub fn requests_persist(&self) -> bool {
            match self {
                Effect::Persist => true,
                Effect::Sequential(effects) => effects.iter().any(Effect::requests_persist),
                Effect::None | Effect::Dispatch(_) => false,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All sources of non-determinism (time, randomness, identifiers) are
/// abstracted behind traits and injected via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use raffle_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let earlier = clock.now();
    /// assert!(clock.now() >= earlier);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock used in production
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

/// Persistence module - where state goes after a mutation
///
/// The engine never waits on persistence to decide an outcome: a failed save
/// is reported back to the runtime, logged, and retried on the next mutation.
pub mod persistence {
    use thiserror::Error;

    /// Errors raised by a persistence backend
    #[derive(Error, Debug)]
    pub enum PersistenceError {
        /// Underlying I/O failed
        #[error("I/O error: {0}")]
        Io(#[from] std::io::Error),

        /// State could not be encoded or decoded
        #[error("Serialization error: {0}")]
        Serialization(String),

        /// The stored data was written by an incompatible version
        #[error("Unsupported schema version {found} (expected {expected})")]
        UnsupportedSchema {
            /// Version found in storage
            found: u32,
            /// Version this build understands
            expected: u32,
        },
    }

    /// Persistence backend for a state type
    pub trait Persistence<S>: Send + Sync {
        /// Write the full state
        ///
        /// # Errors
        ///
        /// Returns [`PersistenceError`] if the state cannot be written.
        fn save(&self, state: &S) -> Result<(), PersistenceError>;
    }
}
