//! Login screen demo binary
//!
//! Drives a scripted login session against the in-memory repository and
//! prints every state snapshot and signal the screen would render.

use anyhow::Context;
use login_screen::{InMemoryLoginRepository, LoginConfig, LoginEvent, LoginViewModel};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_USER: &str = "test@worldofplay.in";
const DEMO_PASSWORD: &str = "Worldofplay@2020";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "login_screen=debug,composable_mvi_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    composable_mvi_runtime::metrics::describe_metrics();

    println!("=== Login Screen Demo: Composable MVI ===\n");

    let config = LoginConfig::from_env().context("invalid login configuration")?;
    let debounce = config.validation_debounce;

    let repository = Arc::new(
        InMemoryLoginRepository::new()
            .with_account(DEMO_USER, DEMO_PASSWORD)
            .with_latency(Duration::from_millis(300)),
    );
    let view_model = LoginViewModel::new(Arc::clone(&repository), config);

    let mut states = view_model.states();
    let printer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            match serde_json::to_string(&state) {
                Ok(json) => println!("state  {json}"),
                Err(error) => tracing::error!(%error, "Failed to serialize state"),
            }
        }
    });

    let mut signals = view_model.signals();
    let signal_printer = tokio::spawn(async move {
        while let Ok(signal) = signals.recv().await {
            println!("signal {signal:?}");
        }
    });

    let mut night_mode = view_model.night_mode();
    view_model.set_night_mode(true);
    if night_mode.has_changed().unwrap_or(false) {
        println!("night mode persisted: {}", *night_mode.borrow_and_update());
    }

    println!("\n>>> Screen load, dark theme on");
    view_model.submit_event(LoginEvent::ScreenLoad)?;
    view_model.submit_event(LoginEvent::EnableDarkTheme { enable: true })?;

    println!("\n>>> Typing the username one keystroke at a time");
    for end in 1..=DEMO_USER.len() {
        view_model.submit_event(LoginEvent::UserNameValidationCheck {
            username: DEMO_USER[..end].to_string(),
        })?;
        tokio::time::sleep(Duration::from_millis(40)).await;
    }
    tokio::time::sleep(debounce + Duration::from_millis(100)).await;

    println!("\n>>> Weak password, then the real one");
    view_model.submit_event(LoginEvent::PasswordValidationCheck {
        password: "password".to_string(),
    })?;
    tokio::time::sleep(debounce + Duration::from_millis(100)).await;
    view_model.submit_event(LoginEvent::PasswordValidationCheck {
        password: DEMO_PASSWORD.to_string(),
    })?;
    tokio::time::sleep(debounce + Duration::from_millis(100)).await;

    println!("\n>>> Wrong password");
    view_model.submit_event(LoginEvent::SubmitLogin {
        username: DEMO_USER.to_string(),
        password: "Wrong@2020x".to_string(),
    })?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    println!("\n>>> Double tap on login: only the second call counts");
    for _ in 0..2 {
        view_model.submit_event(LoginEvent::SubmitLogin {
            username: DEMO_USER.to_string(),
            password: DEMO_PASSWORD.to_string(),
        })?;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_millis(500)).await;

    println!(
        "\nFinal state: {}",
        serde_json::to_string_pretty(&view_model.current_state())?
    );
    println!("Tokens issued: {}", repository.issued_tokens());

    drop(view_model);
    printer.abort();
    signal_printer.abort();

    println!("\n=== Demo Complete ===");
    Ok(())
}
