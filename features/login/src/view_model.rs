//! Screen-facing facade over the login store.

use crate::config::LoginConfig;
use crate::reducer::{LoginEnvironment, LoginReducer};
use crate::repository::LoginRepository;
use crate::types::{LoginAction, LoginEvent, LoginSignal, LoginState};
use composable_mvi_runtime::{Store, StoreConfig, StoreError};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Store type driving one login screen
pub type LoginStore<R> = Store<LoginState, LoginAction, LoginEnvironment<R>, LoginReducer<R>>;

/// One login screen session
///
/// Owns the store for as long as the screen lives. Dropping the view model
/// disposes the store, cancelling pending validations and login calls.
///
/// # Example
///
/// ```no_run
/// use login_screen::{InMemoryLoginRepository, LoginConfig, LoginEvent, LoginViewModel};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repository = Arc::new(InMemoryLoginRepository::new());
/// let view_model = LoginViewModel::new(repository, LoginConfig::default());
///
/// let mut states = view_model.states();
/// view_model.submit_event(LoginEvent::EnableDarkTheme { enable: true })?;
///
/// states.changed().await?;
/// assert!(states.borrow().enable_dark_theme);
/// # Ok(())
/// # }
/// ```
pub struct LoginViewModel<R: LoginRepository> {
    store: LoginStore<R>,
    repository: Arc<R>,
}

impl<R: LoginRepository> LoginViewModel<R> {
    /// Create a view model with its own store
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn new(repository: Arc<R>, config: LoginConfig) -> Self {
        Self::with_store_config(repository, config, StoreConfig::default())
    }

    /// Create a view model with custom store channel capacities
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn with_store_config(
        repository: Arc<R>,
        config: LoginConfig,
        store_config: StoreConfig,
    ) -> Self {
        let environment = LoginEnvironment::new(Arc::clone(&repository), config);
        let store = Store::with_config(
            LoginState::default(),
            LoginReducer::new(),
            environment,
            store_config,
        );

        Self { store, repository }
    }

    /// Queue a user intent without blocking
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] once the view model has been disposed.
    pub fn submit_event(&self, event: LoginEvent) -> Result<(), StoreError> {
        self.store.submit(LoginAction::Event(event))
    }

    /// Latest state snapshot
    #[must_use]
    pub fn current_state(&self) -> LoginState {
        self.store.current_state()
    }

    /// Subscribe to state changes
    #[must_use]
    pub fn states(&self) -> watch::Receiver<LoginState> {
        self.store.subscribe_states()
    }

    /// Subscribe to one-shot signals emitted from now on
    #[must_use]
    pub fn signals(&self) -> broadcast::Receiver<LoginSignal> {
        self.store.subscribe_signals()
    }

    /// Persist the night-mode preference
    pub fn set_night_mode(&self, enabled: bool) {
        tracing::debug!(enabled, "Setting night mode");
        self.repository.set_night_mode(enabled);
    }

    /// Observe the persisted night-mode preference
    #[must_use]
    pub fn night_mode(&self) -> watch::Receiver<bool> {
        self.repository.night_mode()
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &LoginStore<R> {
        &self.store
    }

    /// End the session; later events are rejected
    pub fn dispose(&self) {
        self.store.dispose();
    }
}

impl<R: LoginRepository> Drop for LoginViewModel<R> {
    fn drop(&mut self) {
        self.store.dispose();
    }
}
