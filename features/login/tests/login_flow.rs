//! Integration tests for the login screen.
//!
//! Every test runs on a paused Tokio clock, so debounce windows and login
//! latencies are exact.

#![allow(clippy::unwrap_used)]

use composable_mvi_testing::helpers::{advance, drain, init_test_tracing, settle};
use login_screen::mocks::MockLoginRepository;
use login_screen::{
    LoginAction, LoginConfig, LoginEvent, LoginResult, LoginSignal, LoginViewModel, MessageKey,
    RepositoryError, Token,
};
use std::sync::Arc;
use std::time::Duration;

const USER: &str = "test@worldofplay.in";
const PASSWORD: &str = "Worldofplay@2020";

fn view_model(
    repository: MockLoginRepository,
) -> (LoginViewModel<MockLoginRepository>, Arc<MockLoginRepository>) {
    init_test_tracing();
    let repository = Arc::new(repository);
    let view_model = LoginViewModel::new(Arc::clone(&repository), LoginConfig::default());
    (view_model, repository)
}

fn submit_login(password: &str) -> LoginEvent {
    LoginEvent::SubmitLogin {
        username: USER.to_string(),
        password: password.to_string(),
    }
}

fn is_user_name_result(action: &LoginAction) -> bool {
    matches!(
        action,
        LoginAction::Result(LoginResult::UserNameValid | LoginResult::UserNameInvalid { .. })
    )
}

#[tokio::test(start_paused = true)]
async fn test_username_burst_validates_only_last_value() {
    let (view_model, repository) = view_model(MockLoginRepository::new());
    let mut actions = view_model.store().subscribe_actions();

    view_model
        .submit_event(LoginEvent::UserNameValidationCheck {
            username: "r".to_string(),
        })
        .unwrap();
    advance(Duration::from_millis(100)).await;
    view_model
        .submit_event(LoginEvent::UserNameValidationCheck {
            username: "ru".to_string(),
        })
        .unwrap();
    advance(Duration::from_millis(100)).await;
    view_model
        .submit_event(LoginEvent::UserNameValidationCheck {
            username: "rus".to_string(),
        })
        .unwrap();

    // Nothing before the quiet period after the last keystroke
    advance(Duration::from_millis(499)).await;
    assert!(drain(&mut actions).is_empty());

    advance(Duration::from_millis(200)).await;
    let results: Vec<_> = drain(&mut actions)
        .into_iter()
        .filter(is_user_name_result)
        .collect();

    assert_eq!(
        results,
        vec![LoginAction::Result(LoginResult::UserNameInvalid {
            message_key: MessageKey::InvalidEmail,
        })]
    );
    assert_eq!(repository.email_checks(), vec!["rus"]);

    let state = view_model.current_state();
    assert_eq!(state.user_name_error, Some(MessageKey::InvalidEmail));
    assert!(!state.is_user_name_valid);
}

#[tokio::test(start_paused = true)]
async fn test_valid_username_clears_error() {
    let (view_model, _) = view_model(MockLoginRepository::new());

    view_model
        .submit_event(LoginEvent::UserNameValidationCheck {
            username: "nope".to_string(),
        })
        .unwrap();
    advance(Duration::from_millis(600)).await;
    assert_eq!(view_model.current_state().user_name_error, Some(MessageKey::InvalidEmail));

    view_model
        .submit_event(LoginEvent::UserNameValidationCheck {
            username: USER.to_string(),
        })
        .unwrap();
    advance(Duration::from_millis(600)).await;

    let state = view_model.current_state();
    assert_eq!(state.user_name_error, None);
    assert!(state.is_user_name_valid);
}

#[tokio::test(start_paused = true)]
async fn test_password_rules_reach_state() {
    let (view_model, _) = view_model(MockLoginRepository::new());

    view_model
        .submit_event(LoginEvent::PasswordValidationCheck {
            password: "ab".to_string(),
        })
        .unwrap();
    advance(Duration::from_millis(600)).await;

    let state = view_model.current_state();
    assert_eq!(state.password_error, Some(MessageKey::PasswordLength));
    assert!(!state.is_password_valid);

    view_model
        .submit_event(LoginEvent::PasswordValidationCheck {
            password: "Abcdef1!".to_string(),
        })
        .unwrap();
    advance(Duration::from_millis(600)).await;

    let state = view_model.current_state();
    assert_eq!(state.password_error, None);
    assert!(state.is_password_valid);
}

#[tokio::test(start_paused = true)]
async fn test_field_debounces_are_independent() {
    let (view_model, _) = view_model(MockLoginRepository::new());

    view_model
        .submit_event(LoginEvent::UserNameValidationCheck {
            username: USER.to_string(),
        })
        .unwrap();
    advance(Duration::from_millis(100)).await;
    view_model
        .submit_event(LoginEvent::PasswordValidationCheck {
            password: PASSWORD.to_string(),
        })
        .unwrap();
    advance(Duration::from_millis(600)).await;

    let state = view_model.current_state();
    assert!(state.is_user_name_valid);
    assert!(state.is_password_valid);
}

#[tokio::test(start_paused = true)]
async fn test_configured_debounce_is_used() {
    init_test_tracing();
    let view_model = LoginViewModel::new(
        Arc::new(MockLoginRepository::new()),
        LoginConfig::default().with_validation_debounce(Duration::from_millis(50)),
    );

    view_model
        .submit_event(LoginEvent::PasswordValidationCheck {
            password: PASSWORD.to_string(),
        })
        .unwrap();
    advance(Duration::from_millis(60)).await;

    assert!(view_model.current_state().is_password_valid);
}

#[tokio::test(start_paused = true)]
async fn test_identical_states_are_not_emitted_twice() {
    let (view_model, _) = view_model(MockLoginRepository::new());
    let mut states = view_model.states();

    view_model.submit_event(LoginEvent::ScreenLoad).unwrap();
    view_model.submit_event(LoginEvent::ScreenLoad).unwrap();
    settle().await;
    assert!(!states.has_changed().unwrap());

    view_model
        .submit_event(LoginEvent::EnableDarkTheme { enable: true })
        .unwrap();
    settle().await;
    assert!(states.has_changed().unwrap());
    assert!(states.borrow_and_update().enable_dark_theme);

    view_model
        .submit_event(LoginEvent::EnableDarkTheme { enable: true })
        .unwrap();
    settle().await;
    assert!(!states.has_changed().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_successful_login_toggles_loading_and_signals() {
    let (view_model, repository) = view_model(
        MockLoginRepository::new().succeed_after(Duration::from_millis(300), "session-1"),
    );
    let mut signals = view_model.signals();

    view_model.submit_event(submit_login(PASSWORD)).unwrap();
    settle().await;
    assert!(view_model.current_state().loading);

    advance(Duration::from_millis(300)).await;

    let state = view_model.current_state();
    assert!(!state.loading);
    assert_eq!(state.login_api_error, None);
    assert_eq!(
        drain(&mut signals),
        vec![LoginSignal::LoginSuccessful {
            token: Token::new("session-1".to_string()),
        }]
    );
    assert_eq!(repository.login_calls(), vec![USER]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_login_records_error_and_toasts() {
    let (view_model, _) = view_model(MockLoginRepository::new().fail_after(
        Duration::from_millis(100),
        RepositoryError::Rejected("bad credentials".to_string()),
    ));
    let mut signals = view_model.signals();

    view_model.submit_event(submit_login("Wrong@2020x")).unwrap();
    settle().await;
    assert!(view_model.current_state().loading);

    advance(Duration::from_millis(100)).await;

    let state = view_model.current_state();
    assert!(!state.loading);
    assert_eq!(state.login_api_error.as_deref(), Some("bad credentials"));
    assert_eq!(
        drain(&mut signals),
        vec![LoginSignal::ShowToast {
            message: "bad credentials".to_string(),
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failure_without_message_uses_fallback() {
    init_test_tracing();
    let repository = Arc::new(
        MockLoginRepository::new()
            .fail_after(Duration::ZERO, RepositoryError::Unknown)
            .fail_after(Duration::ZERO, RepositoryError::Transport(String::new())),
    );
    let view_model = LoginViewModel::new(
        Arc::clone(&repository),
        LoginConfig::default().with_fallback_error_message("something went wrong"),
    );

    view_model.submit_event(submit_login(PASSWORD)).unwrap();
    advance(Duration::from_millis(1)).await;
    assert_eq!(
        view_model.current_state().login_api_error.as_deref(),
        Some("something went wrong")
    );

    view_model.submit_event(submit_login(PASSWORD)).unwrap();
    advance(Duration::from_millis(1)).await;
    let state = view_model.current_state();
    assert_eq!(state.login_api_error.as_deref(), Some("something went wrong"));
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn test_default_fallback_message() {
    let (view_model, _) =
        view_model(MockLoginRepository::new().fail_after(Duration::ZERO, RepositoryError::Unknown));

    view_model.submit_event(submit_login(PASSWORD)).unwrap();
    advance(Duration::from_millis(1)).await;

    assert_eq!(
        view_model.current_state().login_api_error.as_deref(),
        Some("api error")
    );
}

#[tokio::test(start_paused = true)]
async fn test_newer_login_supersedes_in_flight_one() {
    let (view_model, repository) = view_model(
        MockLoginRepository::new()
            .succeed_after(Duration::from_millis(200), "first")
            .succeed_after(Duration::from_millis(500), "second"),
    );
    let mut signals = view_model.signals();
    let mut actions = view_model.store().subscribe_actions();

    view_model.submit_event(submit_login(PASSWORD)).unwrap();
    advance(Duration::from_millis(100)).await;
    view_model.submit_event(submit_login(PASSWORD)).unwrap();

    // The first call would have finished at t = 200 ms
    advance(Duration::from_millis(200)).await;
    assert!(view_model.current_state().loading);
    assert!(drain(&mut signals).is_empty());

    advance(Duration::from_millis(400)).await;
    assert!(!view_model.current_state().loading);

    let outcomes: Vec<_> = drain(&mut actions)
        .into_iter()
        .filter(|action| {
            matches!(
                action,
                LoginAction::Result(
                    LoginResult::LoginSucceeded { .. } | LoginResult::LoginFailed { .. }
                )
            )
        })
        .collect();
    assert_eq!(
        outcomes,
        vec![LoginAction::Result(LoginResult::LoginSucceeded {
            token: Token::new("second".to_string()),
        })]
    );
    assert_eq!(
        drain(&mut signals),
        vec![LoginSignal::LoginSuccessful {
            token: Token::new("second".to_string()),
        }]
    );
    assert_eq!(repository.login_calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_user_can_retry_after_failure() {
    let (view_model, _) = view_model(
        MockLoginRepository::new()
            .fail_after(Duration::from_millis(50), RepositoryError::Rejected("locked".to_string()))
            .succeed_after(Duration::from_millis(50), "session-2"),
    );

    view_model.submit_event(submit_login("Wrong@2020x")).unwrap();
    advance(Duration::from_millis(60)).await;
    assert_eq!(view_model.current_state().login_api_error.as_deref(), Some("locked"));

    view_model.submit_event(submit_login(PASSWORD)).unwrap();
    settle().await;
    let state = view_model.current_state();
    assert!(state.loading);
    assert_eq!(state.login_api_error, None);

    advance(Duration::from_millis(60)).await;
    let state = view_model.current_state();
    assert!(!state.loading);
    assert_eq!(state.login_api_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_signals_are_not_replayed_to_late_subscribers() {
    let (view_model, _) =
        view_model(MockLoginRepository::new().fail_after(Duration::ZERO, RepositoryError::Unknown));

    view_model.submit_event(submit_login(PASSWORD)).unwrap();
    advance(Duration::from_millis(1)).await;

    let mut late = view_model.signals();
    settle().await;
    assert!(drain(&mut late).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dispose_cancels_pending_work() {
    let (view_model, _) = view_model(
        MockLoginRepository::new().succeed_after(Duration::from_millis(300), "never"),
    );
    let mut signals = view_model.signals();

    view_model.submit_event(submit_login(PASSWORD)).unwrap();
    view_model
        .submit_event(LoginEvent::PasswordValidationCheck {
            password: PASSWORD.to_string(),
        })
        .unwrap();
    settle().await;
    let before = view_model.current_state();
    assert!(before.loading);
    assert!(view_model.store().state(|s| s.loading).await);
    assert_eq!(view_model.store().pending_effects(), 2);

    view_model.dispose();
    assert_eq!(view_model.store().pending_effects(), 0);
    advance(Duration::from_secs(2)).await;

    assert_eq!(view_model.current_state(), before);
    assert!(drain(&mut signals).is_empty());
    assert!(view_model.submit_event(LoginEvent::ScreenLoad).is_err());
}
