//! # Composable MVI Core
//!
//! Core traits and types for the Composable MVI architecture.
//!
//! This crate provides the fundamental abstractions for building screen-level
//! state machines driven by user intents, using the Reducer pattern.
//!
//! ## Core Concepts
//!
//! - **State**: Immutable-by-convention snapshot observed by the UI
//! - **Action**: All inputs to a reducer (user intents and the results they produce)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution), including one-shot signals
//! - **Environment**: Injected dependencies, passed by the runtime
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Cancellation by scope, not by handle
//!
//! ## Example
//!
//! ```ignore
//! use composable_mvi_core::*;
//!
//! impl Reducer for SearchReducer {
//!     type State = SearchState;
//!     type Action = SearchAction;
//!     type Signal = SearchSignal;
//!     type Environment = SearchEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut SearchState,
//!         action: SearchAction,
//!         env: &SearchEnvironment,
//!     ) -> SmallVec<[Effect<SearchAction, SearchSignal>; 4]> {
//!         match action {
//!             SearchAction::QueryChanged { query } => smallvec![Effect::debounce(
//!                 SEARCH,
//!                 Duration::from_millis(300),
//!                 move || Some(SearchAction::Search { query }),
//!             )],
//!             SearchAction::Search { .. } => smallvec![Effect::None],
//!         }
//!     }
//! }
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Declarative macros for effect construction
pub mod effect_macros;

/// Reducer module - The core trait for screen logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all screen logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for screen logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Signal`: One-shot notifications for the UI, never stored in state
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// One-shot UI signal type published alongside state
        type Signal;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Updates state in place
        /// 2. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action, Self::Signal>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable and cancellable.
pub mod effect {
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Identifier of a cancellation scope
    ///
    /// Effects wrapped in [`Effect::Cancellable`] with the same id belong to
    /// the same scope and can be superseded or cancelled together.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EffectId(&'static str);

    impl EffectId {
        /// Create a new effect id
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(name)
        }

        /// The name this id was created with
        #[must_use]
        pub const fn name(&self) -> &'static str {
            self.0
        }
    }

    impl fmt::Display for EffectId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    /// - `Signal`: The one-shot UI signal type
    pub enum Effect<Action, Signal> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action, Signal>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Publish a one-shot signal to current signal subscribers
        Signal(Signal),

        /// Run `effect` inside the cancellation scope `id`
        ///
        /// With `cancel_in_flight`, everything still running in the scope is
        /// cancelled first and its pending feedback is discarded.
        Cancellable {
            /// Scope identifier
            id: EffectId,
            /// Supersede work already running in the scope
            cancel_in_flight: bool,
            /// The wrapped effect
            effect: Box<Effect<Action, Signal>>,
        },

        /// Cancel everything running in the scope
        Cancel(EffectId),
    }

    impl<Action, Signal> fmt::Debug for Effect<Action, Signal>
    where
        Action: fmt::Debug,
        Signal: fmt::Debug,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::None => write!(f, "Effect::None"),
                Self::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Self::Future(_) => write!(f, "Effect::Future(<future>)"),
                Self::Signal(signal) => f.debug_tuple("Effect::Signal").field(signal).finish(),
                Self::Cancellable {
                    id,
                    cancel_in_flight,
                    effect,
                } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("cancel_in_flight", cancel_in_flight)
                    .field("effect", effect)
                    .finish(),
                Self::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action, Signal> Effect<Action, Signal> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Self>) -> Self {
            Self::Parallel(effects)
        }

        /// Place this effect in the cancellation scope `id`
        #[must_use]
        pub fn cancellable(self, id: EffectId, cancel_in_flight: bool) -> Self {
            Self::Cancellable {
                id,
                cancel_in_flight,
                effect: Box::new(self),
            }
        }

        /// Latest-wins: run this effect in scope `id`, superseding whatever
        /// the scope is still running
        #[must_use]
        pub fn switch_latest(self, id: EffectId) -> Self {
            self.cancellable(id, true)
        }
    }

    impl<Action, Signal> Effect<Action, Signal>
    where
        Action: Send + 'static,
    {
        /// Debounce: wait for `duration` of quiet in scope `id`, then run `work`
        ///
        /// Each new debounced effect for the same id restarts the timer and
        /// discards the pending one, so only the last of a burst produces an
        /// action.
        #[must_use]
        pub fn debounce<F>(id: EffectId, duration: Duration, work: F) -> Self
        where
            F: FnOnce() -> Option<Action> + Send + 'static,
        {
            Self::Future(Box::pin(async move {
                tokio::time::sleep(duration).await;
                work()
            }))
            .switch_latest(id)
        }
    }
}

// Re-export the main types
pub use effect::{Effect, EffectId};
pub use reducer::Reducer;
