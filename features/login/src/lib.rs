//! # Login Screen
//!
//! Login screen logic built on the Composable MVI architecture.
//!
//! This crate showcases:
//! - Events mapped to results, results folded into immutable state snapshots
//! - Debounced field validation (username and password)
//! - Latest-wins login calls (a newer submission cancels the previous one)
//! - One-shot signals for navigation and toasts, separate from state
//! - Repository injection, with an in-memory and a scripted implementation
//!
//! ## Architecture
//!
//! ```text
//! LoginEvent ──submit──▶ Store ──▶ LoginReducer ──▶ LoginResult ──apply──▶ LoginState ──▶ watch
//!                                     │                   ▲
//!                                     └── effects ────────┘ (debounce, login call)
//!                                     └── LoginSignal ──────────────────────────────▶ broadcast
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use login_screen::{InMemoryLoginRepository, LoginConfig, LoginEvent, LoginViewModel};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Arc::new(
//!     InMemoryLoginRepository::new().with_account("test@worldofplay.in", "Worldofplay@2020"),
//! );
//! let view_model = LoginViewModel::new(repository, LoginConfig::default());
//! let mut signals = view_model.signals();
//!
//! view_model.submit_event(LoginEvent::SubmitLogin {
//!     username: "test@worldofplay.in".to_string(),
//!     password: "Worldofplay@2020".to_string(),
//! })?;
//!
//! let signal = signals.recv().await?;
//! println!("{signal:?}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod mocks;
pub mod reducer;
pub mod repository;
pub mod types;
pub mod validation;
pub mod view_model;

pub use config::{ConfigError, LoginConfig};
pub use reducer::{LoginEnvironment, LoginReducer};
pub use repository::{InMemoryLoginRepository, LoginRepository, RepositoryError};
pub use types::{
    LoginAction, LoginEvent, LoginResult, LoginSignal, LoginState, MessageKey, Token,
};
pub use validation::{is_valid_email_id, validate_password, PasswordError};
pub use view_model::{LoginStore, LoginViewModel};
