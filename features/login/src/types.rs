//! Core domain types for the login screen.
//!
//! Intents flow in as [`LoginEvent`]s, are mapped to [`LoginResult`]s
//! (immediately or after an asynchronous effect), and every result is folded
//! into the next [`LoginState`] snapshot by [`LoginState::apply`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Localizable error identifiers shown next to the login form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKey {
    /// Username is not a well-formed e-mail address
    #[serde(rename = "error_invalid_email")]
    InvalidEmail,
    /// Password must be 8 to 16 characters long
    #[serde(rename = "error_password_length")]
    PasswordLength,
    /// Password needs an uppercase letter
    #[serde(rename = "error_password_need_uppercase")]
    PasswordNeedUppercase,
    /// Password needs a lowercase letter
    #[serde(rename = "error_password_need_lowercase")]
    PasswordNeedLowercase,
    /// Password needs a digit
    #[serde(rename = "error_password_need_digit")]
    PasswordNeedDigit,
    /// Password needs a special character
    #[serde(rename = "error_password_need_special_char")]
    PasswordNeedSpecialChar,
}

impl MessageKey {
    /// Stable resource key used to look up the localized text
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::InvalidEmail => "error_invalid_email",
            Self::PasswordLength => "error_password_length",
            Self::PasswordNeedUppercase => "error_password_need_uppercase",
            Self::PasswordNeedLowercase => "error_password_need_lowercase",
            Self::PasswordNeedDigit => "error_password_need_digit",
            Self::PasswordNeedSpecialChar => "error_password_need_special_char",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InvalidEmail => "Please enter a valid e-mail address",
            Self::PasswordLength => "Password must be 8 to 16 characters long",
            Self::PasswordNeedUppercase => "Password needs at least one uppercase letter",
            Self::PasswordNeedLowercase => "Password needs at least one lowercase letter",
            Self::PasswordNeedDigit => "Password needs at least one digit",
            Self::PasswordNeedSpecialChar => "Password needs at least one special character",
        };
        f.write_str(text)
    }
}

/// Session token returned by a successful login
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token(String);

impl Token {
    /// Creates a new `Token` from a string
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// User intents submitted by the login screen
#[derive(Clone, PartialEq, Eq)]
pub enum LoginEvent {
    /// The screen became visible
    ScreenLoad,
    /// The theme switch was toggled
    EnableDarkTheme {
        /// Whether dark theme is requested
        enable: bool,
    },
    /// The username field changed
    UserNameValidationCheck {
        /// Current field content
        username: String,
    },
    /// The password field changed
    PasswordValidationCheck {
        /// Current field content
        password: String,
    },
    /// The login button was pressed
    SubmitLogin {
        /// Username to log in with
        username: String,
        /// Password to log in with
        password: String,
    },
}

// Passwords never reach the logs
impl fmt::Debug for LoginEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScreenLoad => f.write_str("ScreenLoad"),
            Self::EnableDarkTheme { enable } => f
                .debug_struct("EnableDarkTheme")
                .field("enable", enable)
                .finish(),
            Self::UserNameValidationCheck { username } => f
                .debug_struct("UserNameValidationCheck")
                .field("username", username)
                .finish(),
            Self::PasswordValidationCheck { .. } => f
                .debug_struct("PasswordValidationCheck")
                .field("password", &"<redacted>")
                .finish(),
            Self::SubmitLogin { username, .. } => f
                .debug_struct("SubmitLogin")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Outcomes derived from events, each folded into exactly one next state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginResult {
    /// Screen load acknowledged
    ScreenLoaded,
    /// Theme preference applied
    DarkThemeSet {
        /// New theme flag
        enable: bool,
    },
    /// Username passed validation
    UserNameValid,
    /// Username failed validation
    UserNameInvalid {
        /// Error to show under the field
        message_key: MessageKey,
    },
    /// Password passed validation
    PasswordValid,
    /// Password failed validation
    PasswordInvalid {
        /// First rule the password violated
        message_key: MessageKey,
    },
    /// Login call started
    LoginLoading,
    /// Login call succeeded
    LoginSucceeded {
        /// Session token
        token: Token,
    },
    /// Login call failed
    LoginFailed {
        /// Human readable reason
        message: String,
    },
}

/// Login actions
///
/// The reducer's single input: user events plus the results they produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    /// A user intent
    Event(LoginEvent),
    /// An outcome to fold into state
    Result(LoginResult),
}

impl From<LoginEvent> for LoginAction {
    fn from(event: LoginEvent) -> Self {
        Self::Event(event)
    }
}

impl From<LoginResult> for LoginAction {
    fn from(result: LoginResult) -> Self {
        Self::Result(result)
    }
}

/// One-shot notifications for the screen, never stored in state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginSignal {
    /// Login finished; the host screen may leave the login flow
    LoginSuccessful {
        /// Session token
        token: Token,
    },
    /// Show a transient message
    ShowToast {
        /// Text to show
        message: String,
    },
}

/// Everything the login screen renders
///
/// A valid field never carries an error. Snapshots are replaced, never
/// mutated after publication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginState {
    /// Error under the username field
    pub user_name_error: Option<MessageKey>,
    /// Username passed validation
    pub is_user_name_valid: bool,
    /// Error under the password field
    pub password_error: Option<MessageKey>,
    /// Password passed validation
    pub is_password_valid: bool,
    /// Last login failure reason
    pub login_api_error: Option<String>,
    /// A login call is in flight
    pub loading: bool,
    /// Dark theme is enabled
    pub enable_dark_theme: bool,
}

impl LoginState {
    /// Fold one result into the next state
    ///
    /// Pure: `self` is left untouched.
    #[must_use]
    pub fn apply(&self, result: &LoginResult) -> Self {
        match result {
            LoginResult::ScreenLoaded => self.clone(),
            LoginResult::DarkThemeSet { enable } => Self {
                enable_dark_theme: *enable,
                ..self.clone()
            },
            LoginResult::UserNameValid => Self {
                user_name_error: None,
                is_user_name_valid: true,
                ..self.clone()
            },
            LoginResult::UserNameInvalid { message_key } => Self {
                user_name_error: Some(*message_key),
                is_user_name_valid: false,
                ..self.clone()
            },
            LoginResult::PasswordValid => Self {
                password_error: None,
                is_password_valid: true,
                ..self.clone()
            },
            LoginResult::PasswordInvalid { message_key } => Self {
                password_error: Some(*message_key),
                is_password_valid: false,
                ..self.clone()
            },
            LoginResult::LoginLoading => Self {
                login_api_error: None,
                loading: true,
                ..self.clone()
            },
            LoginResult::LoginSucceeded { .. } => Self {
                login_api_error: None,
                loading: false,
                ..self.clone()
            },
            LoginResult::LoginFailed { message } => Self {
                login_api_error: Some(message.clone()),
                loading: false,
                ..self.clone()
            },
        }
    }
}
