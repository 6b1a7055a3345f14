//! # Composable MVI Runtime
//!
//! Runtime implementation for the Composable MVI architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution,
//! effect handling and the sinks observed by the UI.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that owns state and executes effects
//! - **Ingress queue**: Non-blocking `submit` drained in order by one driver task
//! - **State sink**: Latest state, republished only when it actually changed
//! - **Signal sink**: One-shot UI signals, never replayed to late subscribers
//! - **Cancellation scopes**: Debounce and latest-wins semantics for effects
//!
//! ## Example
//!
//! ```ignore
//! use composable_mvi_runtime::Store;
//!
//! let store = Store::new(LoginState::default(), LoginReducer::new(), environment);
//!
//! // Queue an intent from UI code (non-blocking)
//! store.submit(LoginAction::Event(LoginEvent::ScreenLoad))?;
//!
//! // Observe state
//! let mut states = store.subscribe_states();
//! states.changed().await?;
//! let loading = states.borrow().loading;
//! ```

use composable_mvi_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use tokio::sync::RwLock;

mod cancellation;

/// Metric names and descriptions
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
    pub enum StoreError {
        /// Store has been disposed and does not accept actions anymore
        ///
        /// Returned by `send()`/`submit()` after `dispose()`, and used
        /// internally to discard feedback from effects that outlived the store.
        #[error("Store has been disposed")]
        Disposed,

        /// The ingress queue is closed
        ///
        /// The driver task that drains submitted actions has stopped.
        #[error("Store ingress channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use composable_mvi_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_signal_capacity(64)
///     .with_action_capacity(256);
///
/// assert_eq!(config.signal_capacity, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Signals buffered per subscriber before it lags
    pub signal_capacity: usize,
    /// Effect-produced actions buffered per action observer
    pub action_capacity: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    ///
    /// Capacities are clamped to at least 1.
    #[must_use]
    pub fn new(signal_capacity: usize, action_capacity: usize) -> Self {
        Self {
            signal_capacity: signal_capacity.max(1),
            action_capacity: action_capacity.max(1),
        }
    }

    /// Set the signal channel capacity
    #[must_use]
    pub fn with_signal_capacity(mut self, capacity: usize) -> Self {
        self.signal_capacity = capacity.max(1);
        self
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub fn with_action_capacity(mut self, capacity: usize) -> Self {
        self.action_capacity = capacity.max(1);
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            signal_capacity: 16,
            action_capacity: 16,
        }
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::cancellation::{EffectRegistry, ScopeToken};
    use super::metrics::{
        ACTIONS_TOTAL, DISPOSED, EFFECTS_EXECUTED, FEEDBACK_STALE, REDUCER_DURATION,
        SIGNALS_EMITTED, STATE_EMITTED, STATE_SUPPRESSED,
    };
    use super::{Arc, Effect, Reducer, RwLock, StoreConfig, StoreError};
    use std::fmt::Debug;
    use std::future::Future;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::OnceLock;
    use tokio::sync::{broadcast, mpsc, watch};
    use tokio::task::AbortHandle;

    /// Where an action entered the store from
    enum ActionSource {
        /// `send()` / `submit()` from outside the store
        External,
        /// Feedback from an effect task, with the scope it ran in
        Effect(Option<ScopeToken>),
    }

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`, the only writer is the reducer)
    /// 2. Reducer (screen logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and cancellation scopes)
    /// 5. A state sink (`watch`) and a signal sink (`broadcast`)
    ///
    /// Reductions are strictly sequential: every action, whether submitted
    /// by the UI or fed back by an effect, is reduced while holding the
    /// state write lock, and the resulting effects are started before the
    /// lock is released.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    ///
    /// # Lifecycle
    ///
    /// Creating a store spawns the ingress driver task. The store stays
    /// alive until [`Store::dispose`] is called, which cancels the driver,
    /// pending timers and in-flight effects.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        states: Arc<watch::Sender<S>>,
        signals: broadcast::Sender<R::Signal>,
        /// Action broadcast channel for observing actions produced by effects.
        action_broadcast: broadcast::Sender<A>,
        ingress: mpsc::UnboundedSender<A>,
        effects: Arc<EffectRegistry>,
        driver: Arc<OnceLock<AbortHandle>>,
        disposed: Arc<AtomicBool>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        R::Signal: Clone + Debug + Send + 'static,
        A: Clone + Debug + Send + 'static,
        S: Clone + PartialEq + Debug + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default`].
        ///
        /// # Panics
        ///
        /// Panics if called outside of a Tokio runtime, since the ingress
        /// driver task is spawned immediately.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        ///
        /// # Panics
        ///
        /// Panics if called outside of a Tokio runtime.
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (states, _) = watch::channel(initial_state.clone());
            let (signals, _) = broadcast::channel(config.signal_capacity.max(1));
            let (action_broadcast, _) = broadcast::channel(config.action_capacity.max(1));
            let (ingress, queue) = mpsc::unbounded_channel();

            let store = Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                states: Arc::new(states),
                signals,
                action_broadcast,
                ingress,
                effects: Arc::new(EffectRegistry::default()),
                driver: Arc::new(OnceLock::new()),
                disposed: Arc::new(AtomicBool::new(false)),
            };
            store.spawn_driver(queue);
            store
        }

        /// Drain the ingress queue in submission order
        fn spawn_driver(&self, mut queue: mpsc::UnboundedReceiver<A>) {
            let store = self.clone();
            let driver = tokio::spawn(async move {
                while let Some(action) = queue.recv().await {
                    if let Err(error) = store.send(action).await {
                        tracing::debug!(%error, "Ingress driver stopping");
                        break;
                    }
                }
            });
            let _ = self.driver.set(driver.abort_handle());
        }

        /// Queue an action without waiting for it to be reduced
        ///
        /// Actions are reduced in the order they were submitted. This is the
        /// entry point for UI code, which must never block.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Disposed`] if the store has been disposed
        /// - [`StoreError::ChannelClosed`] if the ingress driver is gone
        pub fn submit(&self, action: A) -> Result<(), StoreError> {
            if self.is_disposed() {
                tracing::warn!("Rejected submitted action: store is disposed");
                return Err(StoreError::Disposed);
            }

            self.ingress
                .send(action)
                .map_err(|_| StoreError::ChannelClosed)
        }

        /// Reduce an action and start its effects
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Publishes the new state if it differs from the previous one
        /// 4. Starts the returned effects (they may feed actions back)
        ///
        /// Returns once the reduction is done; effects keep running.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Disposed`] if the store has been disposed.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            self.send_internal(action, ActionSource::External).await
        }

        async fn send_internal(&self, action: A, source: ActionSource) -> Result<(), StoreError> {
            if self.is_disposed() {
                return Err(StoreError::Disposed);
            }

            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            // Disposal may have happened while waiting for the lock
            if self.is_disposed() {
                return Err(StoreError::Disposed);
            }

            if let ActionSource::Effect(scope) = &source {
                if let Some(token) = scope {
                    if !self.effects.is_current(token) {
                        tracing::trace!(scope = %token.id(), "Dropping feedback from superseded effect");
                        metrics::counter!(FEEDBACK_STALE).increment(1);
                        return Ok(());
                    }
                }
                // Broadcast to observers before reducing
                let _ = self.action_broadcast.send(action.clone());
            }

            tracing::debug!(?action, "Processing action");
            metrics::counter!(ACTIONS_TOTAL).increment(1);

            let previous = state.clone();
            let effects = {
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut state, action, &self.environment);
                metrics::histogram!(REDUCER_DURATION).record(start.elapsed().as_secs_f64());
                effects
            };

            if *state == previous {
                tracing::trace!("State unchanged, emission suppressed");
                metrics::counter!(STATE_SUPPRESSED).increment(1);
            } else {
                tracing::debug!(state = ?*state, "State updated");
                metrics::counter!(STATE_EMITTED).increment(1);
                self.states.send_replace(state.clone());
            }

            tracing::trace!("Executing {} effects", effects.len());
            for effect in effects {
                self.execute_effect(effect, None);
            }

            Ok(())
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let loading = store.state(|s| s.loading).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Latest published state
        #[must_use]
        pub fn current_state(&self) -> S {
            self.states.borrow().clone()
        }

        /// Subscribe to state changes
        ///
        /// The receiver always holds a current value; `changed()` resolves
        /// only when a structurally different state was published.
        #[must_use]
        pub fn subscribe_states(&self) -> watch::Receiver<S> {
            self.states.subscribe()
        }

        /// Subscribe to one-shot signals
        ///
        /// Only signals emitted after subscribing are delivered.
        #[must_use]
        pub fn subscribe_signals(&self) -> broadcast::Receiver<R::Signal> {
            self.signals.subscribe()
        }

        /// Subscribe to all actions produced by effects
        ///
        /// Actions sent via `send`/`submit` are not broadcast, and neither is
        /// feedback discarded because its scope was superseded.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Number of effect tasks still running
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.effects.running()
        }

        /// Whether [`Store::dispose`] has been called
        #[must_use]
        pub fn is_disposed(&self) -> bool {
            self.disposed.load(Ordering::Acquire)
        }

        /// Tear the store down
        ///
        /// Stops the ingress driver, aborts every pending timer and in-flight
        /// effect, and rejects all later actions so that no state update can
        /// happen after disposal. Calling it again is a no-op.
        pub fn dispose(&self) {
            if self.disposed.swap(true, Ordering::AcqRel) {
                return;
            }

            if let Some(driver) = self.driver.get() {
                driver.abort();
            }
            let aborted = self.effects.abort_everything();

            tracing::info!(aborted_effects = aborted, "Store disposed");
            metrics::counter!(DISPOSED).increment(1);
        }

        /// Execute an effect
        ///
        /// Called while the state write lock is held, so scope generations
        /// change atomically with the reduction that requested them.
        ///
        /// # Effect Types
        ///
        /// - `None`: No-op
        /// - `Parallel`: Executes effects concurrently
        /// - `Future`: Executes async computation, sends resulting action if `Some`
        /// - `Signal`: Publishes to signal subscribers
        /// - `Cancellable`: Runs the inner effect in a cancellation scope
        /// - `Cancel`: Aborts a scope
        fn execute_effect(&self, effect: Effect<A, R::Signal>, scope: Option<&ScopeToken>) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!(EFFECTS_EXECUTED, "type" => "none").increment(1);
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!(EFFECTS_EXECUTED, "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, scope);
                    }
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!(EFFECTS_EXECUTED, "type" => "future").increment(1);
                    self.spawn_feedback(scope, fut);
                },
                Effect::Signal(signal) => {
                    tracing::debug!(?signal, "Emitting signal");
                    metrics::counter!(SIGNALS_EMITTED).increment(1);
                    if self.signals.send(signal).is_err() {
                        tracing::trace!("Signal dropped: no subscribers");
                    }
                },
                Effect::Cancellable {
                    id,
                    cancel_in_flight,
                    effect,
                } => {
                    metrics::counter!(EFFECTS_EXECUTED, "type" => "cancellable").increment(1);
                    let token = self.effects.enter(id, cancel_in_flight);
                    self.execute_effect(*effect, Some(&token));
                },
                Effect::Cancel(id) => {
                    metrics::counter!(EFFECTS_EXECUTED, "type" => "cancel").increment(1);
                    let aborted = self.effects.cancel(id);
                    tracing::debug!(scope = %id, aborted, "Cancelled scope");
                },
            }
        }

        /// Spawn an effect task whose output is fed back into the store
        fn spawn_feedback<F>(&self, scope: Option<&ScopeToken>, work: F)
        where
            F: Future<Output = Option<A>> + Send + 'static,
        {
            let store = self.clone();
            let token = scope.copied();

            let task = tokio::spawn(async move {
                let Some(action) = work.await else {
                    tracing::trace!("Effect completed with no action");
                    return;
                };
                if let Err(error) = store.send_internal(action, ActionSource::Effect(token)).await {
                    tracing::trace!(%error, "Feedback rejected");
                }
            });

            self.effects.track(scope, task.abort_handle());
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                states: Arc::clone(&self.states),
                signals: self.signals.clone(),
                action_broadcast: self.action_broadcast.clone(),
                ingress: self.ingress.clone(),
                effects: Arc::clone(&self.effects),
                driver: Arc::clone(&self.driver),
                disposed: Arc::clone(&self.disposed),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
