//! Login reducer mapping events to results and folding results into state.
//!
//! Synchronous events fold immediately. Field validation is debounced per
//! field, and login calls are latest-wins: a newer submission cancels the
//! one in flight and its outcome is never folded.

use crate::config::LoginConfig;
use crate::repository::LoginRepository;
use crate::types::{LoginAction, LoginEvent, LoginResult, LoginSignal, LoginState, MessageKey};
use crate::validation::validate_password;
use composable_mvi_core::effect::{Effect, EffectId};
use composable_mvi_core::reducer::Reducer;
use composable_mvi_core::{async_effect, smallvec, SmallVec};
use std::marker::PhantomData;
use std::sync::Arc;

/// Scope of the pending username validation
pub const USER_NAME_VALIDATION: EffectId = EffectId::new("login.validate_username");
/// Scope of the pending password validation
pub const PASSWORD_VALIDATION: EffectId = EffectId::new("login.validate_password");
/// Scope of the in-flight login call
pub const LOGIN_REQUEST: EffectId = EffectId::new("login.request");

type Effects = SmallVec<[Effect<LoginAction, LoginSignal>; 4]>;

/// Environment for the login screen containing dependencies
pub struct LoginEnvironment<R> {
    /// Login backend, e-mail check and night-mode preference
    pub repository: Arc<R>,
    /// Debounce and fallback message settings
    pub config: LoginConfig,
}

impl<R> LoginEnvironment<R> {
    /// Creates a new login environment
    #[must_use]
    pub const fn new(repository: Arc<R>, config: LoginConfig) -> Self {
        Self { repository, config }
    }
}

impl<R> Clone for LoginEnvironment<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            config: self.config.clone(),
        }
    }
}

/// Reducer implementing the login screen logic
///
/// Generic over the repository so tests can inject a scripted one.
pub struct LoginReducer<R> {
    _phantom: PhantomData<fn() -> R>,
}

impl<R> LoginReducer<R> {
    /// Creates a new login reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<R> Default for LoginReducer<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for LoginReducer<R> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for LoginReducer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LoginReducer")
    }
}

impl<R: LoginRepository> LoginReducer<R> {
    /// Fold a result into state and emit the signal it implies
    fn fold(state: &mut LoginState, result: LoginResult) -> Effects {
        let next = state.apply(&result);
        tracing::debug!(state = ?next, "state");
        *state = next;

        match result {
            LoginResult::LoginSucceeded { token } => {
                smallvec![Effect::Signal(LoginSignal::LoginSuccessful { token })]
            },
            LoginResult::LoginFailed { message } => {
                smallvec![Effect::Signal(LoginSignal::ShowToast { message })]
            },
            _ => smallvec![Effect::None],
        }
    }

    fn check_user_name(username: String, env: &LoginEnvironment<R>) -> Effects {
        let repository = Arc::clone(&env.repository);

        smallvec![Effect::debounce(
            USER_NAME_VALIDATION,
            env.config.validation_debounce,
            move || {
                let result = if repository.is_valid_email_id(&username) {
                    LoginResult::UserNameValid
                } else {
                    LoginResult::UserNameInvalid {
                        message_key: MessageKey::InvalidEmail,
                    }
                };
                Some(LoginAction::Result(result))
            },
        )]
    }

    fn check_password(password: String, env: &LoginEnvironment<R>) -> Effects {
        smallvec![Effect::debounce(
            PASSWORD_VALIDATION,
            env.config.validation_debounce,
            move || {
                let result = match validate_password(&password) {
                    None => LoginResult::PasswordValid,
                    Some(error) => LoginResult::PasswordInvalid {
                        message_key: error.message_key(),
                    },
                };
                Some(LoginAction::Result(result))
            },
        )]
    }

    fn submit_login(
        state: &mut LoginState,
        username: String,
        password: String,
        env: &LoginEnvironment<R>,
    ) -> Effects {
        let mut effects = Self::fold(state, LoginResult::LoginLoading);

        let repository = Arc::clone(&env.repository);
        let fallback = env.config.fallback_error_message.clone();

        let login = async_effect! {
            let result = match repository.login(&username, &password).await {
                Ok(token) => LoginResult::LoginSucceeded { token },
                Err(error) => {
                    tracing::warn!(%error, username = %username, "Login call failed");
                    LoginResult::LoginFailed {
                        message: error.user_message().map_or(fallback, str::to_string),
                    }
                },
            };
            Some(LoginAction::Result(result))
        };

        effects.push(login.switch_latest(LOGIN_REQUEST));
        effects
    }
}

impl<R: LoginRepository> Reducer for LoginReducer<R> {
    type State = LoginState;
    type Action = LoginAction;
    type Signal = LoginSignal;
    type Environment = LoginEnvironment<R>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        match action {
            LoginAction::Event(event) => {
                tracing::debug!(?event, "event");
                match event {
                    LoginEvent::ScreenLoad => Self::fold(state, LoginResult::ScreenLoaded),
                    LoginEvent::EnableDarkTheme { enable } => {
                        Self::fold(state, LoginResult::DarkThemeSet { enable })
                    },
                    LoginEvent::UserNameValidationCheck { username } => {
                        Self::check_user_name(username, env)
                    },
                    LoginEvent::PasswordValidationCheck { password } => {
                        Self::check_password(password, env)
                    },
                    LoginEvent::SubmitLogin { username, password } => {
                        Self::submit_login(state, username, password, env)
                    },
                }
            },
            LoginAction::Result(result) => {
                tracing::debug!(?result, "result");
                Self::fold(state, result)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockLoginRepository;
    use crate::types::Token;
    use composable_mvi_testing::{assertions, ReducerTest};
    use std::time::Duration;

    fn test_env() -> LoginEnvironment<MockLoginRepository> {
        LoginEnvironment::new(Arc::new(MockLoginRepository::new()), LoginConfig::default())
    }

    fn reducer() -> LoginReducer<MockLoginRepository> {
        LoginReducer::new()
    }

    fn event(event: LoginEvent) -> LoginAction {
        LoginAction::Event(event)
    }

    #[test]
    fn test_screen_load_keeps_default_state() {
        ReducerTest::new(reducer())
            .with_env(test_env())
            .given_state(LoginState::default())
            .when_action(event(LoginEvent::ScreenLoad))
            .then_state(|state| assert_eq!(*state, LoginState::default()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_dark_theme_folds_immediately() {
        ReducerTest::new(reducer())
            .with_env(test_env())
            .given_state(LoginState::default())
            .when_action(event(LoginEvent::EnableDarkTheme { enable: true }))
            .then_state(|state| assert!(state.enable_dark_theme))
            .run();
    }

    #[test]
    fn test_username_check_is_debounced() {
        ReducerTest::new(reducer())
            .with_env(test_env())
            .given_state(LoginState::default())
            .when_action(event(LoginEvent::UserNameValidationCheck {
                username: "me@example.com".to_string(),
            }))
            .then_state(|state| assert_eq!(*state, LoginState::default()))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_cancellable_effect(effects, USER_NAME_VALIDATION);
            })
            .run();
    }

    #[test]
    fn test_password_check_runs_rules_after_quiet_period() {
        let mut state = LoginState::default();
        let reducer = reducer();
        let env = LoginEnvironment::new(
            Arc::new(MockLoginRepository::new()),
            LoginConfig::default().with_validation_debounce(Duration::from_millis(1)),
        );

        let mut effects = reducer.reduce(
            &mut state,
            event(LoginEvent::PasswordValidationCheck {
                password: "ab".to_string(),
            }),
            &env,
        );

        let Some(Effect::Cancellable { id, effect, .. }) = effects.pop() else {
            unreachable!("password check must be scoped");
        };
        assert_eq!(id, PASSWORD_VALIDATION);
        let Effect::Future(check) = *effect else {
            unreachable!("password check must be a future");
        };

        let action = tokio_test::block_on(check);
        assert_eq!(
            action,
            Some(LoginAction::Result(LoginResult::PasswordInvalid {
                message_key: MessageKey::PasswordLength,
            }))
        );
    }

    #[test]
    fn test_submit_sets_loading_and_starts_latest_wins_call() {
        ReducerTest::new(reducer())
            .with_env(test_env())
            .given_state(LoginState::default())
            .when_action(event(LoginEvent::SubmitLogin {
                username: "me@example.com".to_string(),
                password: "Abcdef1!".to_string(),
            }))
            .then_state(|state| assert!(state.loading))
            .then_effects(|effects| {
                assertions::assert_has_future_effect(effects);
                assertions::assert_has_cancellable_effect(effects, LOGIN_REQUEST);
            })
            .run();
    }

    #[test]
    fn test_success_emits_login_successful() {
        let token = Token::new("session-1".to_string());
        let expected = LoginSignal::LoginSuccessful {
            token: token.clone(),
        };

        ReducerTest::new(reducer())
            .with_env(test_env())
            .given_state(LoginState {
                loading: true,
                login_api_error: Some("earlier failure".to_string()),
                ..LoginState::default()
            })
            .when_action(LoginAction::Result(LoginResult::LoginSucceeded { token }))
            .then_state(|state| {
                assert!(!state.loading);
                assert_eq!(state.login_api_error, None);
            })
            .then_effects(move |effects| assertions::assert_has_signal(effects, &expected))
            .run();
    }

    #[test]
    fn test_failure_emits_toast() {
        let expected = LoginSignal::ShowToast {
            message: "api error".to_string(),
        };

        ReducerTest::new(reducer())
            .with_env(test_env())
            .given_state(LoginState::default())
            .when_action(LoginAction::Result(LoginResult::LoginLoading))
            .when_action(LoginAction::Result(LoginResult::LoginFailed {
                message: "api error".to_string(),
            }))
            .then_state(|state| {
                assert!(!state.loading);
                assert_eq!(state.login_api_error.as_deref(), Some("api error"));
            })
            .then_effects(move |effects| assertions::assert_has_signal(effects, &expected))
            .run();
    }
}
