//! Scripted repository for deterministic login tests.
//!
//! Each login call consumes the next scripted response, waits its delay
//! (use a paused Tokio clock) and returns its outcome. Calls are recorded.

use crate::repository::{LoginRepository, RepositoryError};
use crate::types::Token;
use crate::validation;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug)]
struct ScriptedLogin {
    delay: Duration,
    outcome: Result<Token, RepositoryError>,
}

/// Mock [`LoginRepository`] driven by a script of responses
///
/// # Example
///
/// ```
/// use login_screen::mocks::MockLoginRepository;
/// use login_screen::repository::RepositoryError;
/// use std::time::Duration;
///
/// let repository = MockLoginRepository::new()
///     .succeed_after(Duration::from_millis(300), "token-1")
///     .fail_after(Duration::ZERO, RepositoryError::Unknown);
/// ```
#[derive(Debug)]
pub struct MockLoginRepository {
    script: Mutex<VecDeque<ScriptedLogin>>,
    calls: Mutex<Vec<String>>,
    email_checks: Mutex<Vec<String>>,
    night_mode: watch::Sender<bool>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockLoginRepository {
    /// Create a mock with an empty script
    #[must_use]
    pub fn new() -> Self {
        let (night_mode, _) = watch::channel(false);
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            email_checks: Mutex::new(Vec::new()),
            night_mode,
        }
    }

    /// Script the next login call to succeed with `token` after `delay`
    #[must_use]
    pub fn succeed_after(self, delay: Duration, token: impl Into<String>) -> Self {
        lock(&self.script).push_back(ScriptedLogin {
            delay,
            outcome: Ok(Token::new(token.into())),
        });
        self
    }

    /// Script the next login call to fail with `error` after `delay`
    #[must_use]
    pub fn fail_after(self, delay: Duration, error: RepositoryError) -> Self {
        lock(&self.script).push_back(ScriptedLogin {
            delay,
            outcome: Err(error),
        });
        self
    }

    /// Usernames passed to `login`, in call order
    #[must_use]
    pub fn login_calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Usernames passed to `is_valid_email_id`, in call order
    #[must_use]
    pub fn email_checks(&self) -> Vec<String> {
        lock(&self.email_checks).clone()
    }

    /// Scripted responses not consumed yet
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }
}

impl Default for MockLoginRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRepository for MockLoginRepository {
    async fn login(&self, username: &str, _password: &str) -> Result<Token, RepositoryError> {
        lock(&self.calls).push(username.to_string());

        let next = lock(&self.script).pop_front();
        let Some(scripted) = next else {
            return Err(RepositoryError::Transport(
                "no scripted login response".to_string(),
            ));
        };

        tokio::time::sleep(scripted.delay).await;
        scripted.outcome
    }

    fn is_valid_email_id(&self, username: &str) -> bool {
        lock(&self.email_checks).push(username.to_string());
        validation::is_valid_email_id(username)
    }

    fn set_night_mode(&self, enabled: bool) {
        self.night_mode.send_replace(enabled);
    }

    fn night_mode(&self) -> watch::Receiver<bool> {
        self.night_mode.subscribe()
    }
}
