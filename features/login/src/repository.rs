//! The login screen's external collaborator.
//!
//! The reducer only talks to a [`LoginRepository`]: it performs the login
//! call, answers e-mail checks and owns the persisted night-mode flag.
//! Transport and storage are up to the implementation.

use crate::types::Token;
use crate::validation;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Errors a login call can fail with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backend refused the credentials
    #[error("login rejected: {0}")]
    Rejected(String),

    /// The call did not complete
    #[error("transport error: {0}")]
    Transport(String),

    /// Failure without any description
    #[error("unknown error")]
    Unknown,
}

impl RepositoryError {
    /// Message suitable for the user, if the error carries one
    ///
    /// Returns `None` for [`RepositoryError::Unknown`] and for blank messages.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Rejected(message) | Self::Transport(message) => {
                let message = message.trim();
                (!message.is_empty()).then_some(message)
            },
            Self::Unknown => None,
        }
    }
}

/// Repository trait for the login screen
///
/// Implementations must be shareable across effect tasks.
pub trait LoginRepository: Send + Sync + 'static {
    /// Authenticate and return a session token
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the backend rejects the credentials or
    /// cannot be reached.
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<Token, RepositoryError>> + Send;

    /// Whether `username` is an acceptable e-mail address
    fn is_valid_email_id(&self, username: &str) -> bool;

    /// Persist the night-mode preference
    fn set_night_mode(&self, enabled: bool);

    /// Observe the persisted night-mode preference
    fn night_mode(&self) -> watch::Receiver<bool>;
}

/// In-memory repository for demos and tests
///
/// Accepts a fixed set of credentials, issues sequential tokens and keeps
/// the night-mode flag in a watch channel.
///
/// # Example
///
/// ```
/// use login_screen::repository::{InMemoryLoginRepository, LoginRepository};
///
/// # async fn example() {
/// let repository = InMemoryLoginRepository::new()
///     .with_account("test@worldofplay.in", "Worldofplay@2020");
///
/// let token = repository.login("test@worldofplay.in", "Worldofplay@2020").await;
/// assert!(token.is_ok());
/// # }
/// ```
#[derive(Debug)]
pub struct InMemoryLoginRepository {
    accounts: Mutex<HashMap<String, String>>,
    latency: Duration,
    issued: AtomicU64,
    night_mode: watch::Sender<bool>,
}

impl InMemoryLoginRepository {
    /// Create an empty repository with no accounts
    #[must_use]
    pub fn new() -> Self {
        let (night_mode, _) = watch::channel(false);
        Self {
            accounts: Mutex::new(HashMap::new()),
            latency: Duration::ZERO,
            issued: AtomicU64::new(0),
            night_mode,
        }
    }

    /// Register an account
    #[must_use]
    pub fn with_account(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.add_account(username, password);
        self
    }

    /// Simulate network latency on every login call
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Register an account on a shared repository
    pub fn add_account(&self, username: impl Into<String>, password: impl Into<String>) {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(username.into(), password.into());
    }

    /// Number of tokens issued so far
    #[must_use]
    pub fn issued_tokens(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    fn authenticate(&self, username: &str, password: &str) -> Result<Token, RepositoryError> {
        let accepted = self
            .accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .is_some_and(|expected| expected == password);

        if !accepted {
            return Err(RepositoryError::Rejected(
                "invalid username or password".to_string(),
            ));
        }

        let serial = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(Token::new(format!("session-{serial}")))
    }
}

impl Default for InMemoryLoginRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRepository for InMemoryLoginRepository {
    async fn login(&self, username: &str, password: &str) -> Result<Token, RepositoryError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let outcome = self.authenticate(username, password);
        match &outcome {
            Ok(_) => tracing::info!(username, "Login accepted"),
            Err(error) => tracing::info!(username, %error, "Login rejected"),
        }
        outcome
    }

    fn is_valid_email_id(&self, username: &str) -> bool {
        validation::is_valid_email_id(username)
    }

    fn set_night_mode(&self, enabled: bool) {
        self.night_mode.send_replace(enabled);
    }

    fn night_mode(&self) -> watch::Receiver<bool> {
        self.night_mode.subscribe()
    }
}
