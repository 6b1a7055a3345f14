//! Field validation rules for the login form.
//!
//! Both checks are pure functions. The reducer runs them after the field
//! has been quiet for the debounce period.

use crate::types::MessageKey;
use thiserror::Error;

/// Shortest accepted password, in characters
pub const PASSWORD_MIN_CHARS: usize = 8;
/// Longest accepted password, in characters
pub const PASSWORD_MAX_CHARS: usize = 16;

/// The first password rule a candidate violates
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordError {
    /// Fewer than 8 or more than 16 characters
    #[error("password must be 8 to 16 characters long")]
    Length,
    /// No uppercase letter
    #[error("password needs at least one uppercase letter")]
    NeedUppercase,
    /// No lowercase letter
    #[error("password needs at least one lowercase letter")]
    NeedLowercase,
    /// No digit
    #[error("password needs at least one digit")]
    NeedDigit,
    /// Only letters, digits and whitespace
    #[error("password needs at least one special character")]
    NeedSpecialChar,
}

impl PasswordError {
    /// Key of the message shown under the password field
    #[must_use]
    pub const fn message_key(self) -> MessageKey {
        match self {
            Self::Length => MessageKey::PasswordLength,
            Self::NeedUppercase => MessageKey::PasswordNeedUppercase,
            Self::NeedLowercase => MessageKey::PasswordNeedLowercase,
            Self::NeedDigit => MessageKey::PasswordNeedDigit,
            Self::NeedSpecialChar => MessageKey::PasswordNeedSpecialChar,
        }
    }
}

/// Decimal digits 0-9 only; fractions and numerals like `½` or `Ⅻ` are not digits
fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Anything that is not a letter, a digit or whitespace
fn is_special(c: char) -> bool {
    !c.is_alphabetic() && !is_digit(c) && !c.is_whitespace()
}

/// Check a password against the rules, in order
///
/// Returns the first violated rule, or `None` if the password is accepted.
///
/// ```
/// use login_screen::validation::{validate_password, PasswordError};
///
/// assert_eq!(validate_password("ab"), Some(PasswordError::Length));
/// assert_eq!(validate_password("Abcdef1!"), None);
/// ```
#[must_use]
pub fn validate_password(password: &str) -> Option<PasswordError> {
    let length = password.chars().count();

    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&length) {
        Some(PasswordError::Length)
    } else if !password.chars().any(char::is_uppercase) {
        Some(PasswordError::NeedUppercase)
    } else if !password.chars().any(char::is_lowercase) {
        Some(PasswordError::NeedLowercase)
    } else if !password.chars().any(is_digit) {
        Some(PasswordError::NeedDigit)
    } else if !password.chars().any(is_special) {
        Some(PasswordError::NeedSpecialChar)
    } else {
        None
    }
}

/// Shape check for an e-mail address
///
/// Accepts `local@domain.tld` where the local part uses the usual
/// unquoted address characters and the domain is dot-separated labels of
/// letters, digits and inner hyphens. Does not resolve anything.
#[must_use]
pub fn is_valid_email_id(candidate: &str) -> bool {
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };

    is_valid_local_part(local) && is_valid_domain(domain)
}

fn is_valid_local_part(local: &str) -> bool {
    const EXTRA: &str = ".!#$%&'*+/=?^_`{|}~-";

    !local.is_empty()
        && local.len() <= 64
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || EXTRA.contains(c))
}

fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();

    labels.len() >= 2
        && domain.len() <= 255
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}
