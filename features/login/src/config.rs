//! Configuration for the login screen.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Quiet period before a field is validated
pub const DEFAULT_VALIDATION_DEBOUNCE: Duration = Duration::from_millis(500);

/// Login failure text used when the error carries no description
pub const DEFAULT_FALLBACK_ERROR_MESSAGE: &str = "api error";

/// Environment variable overriding the debounce period, in milliseconds
pub const ENV_VALIDATION_DEBOUNCE_MS: &str = "LOGIN_VALIDATION_DEBOUNCE_MS";

/// Environment variable overriding the fallback error message
pub const ENV_FALLBACK_ERROR_MESSAGE: &str = "LOGIN_FALLBACK_ERROR_MESSAGE";

/// Errors raised while loading [`LoginConfig`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Login screen configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginConfig {
    /// Quiet period before username and password are validated
    pub validation_debounce: Duration,
    /// Text used when a failed login carries no message
    pub fallback_error_message: String,
}

impl LoginConfig {
    /// Set the validation debounce period
    #[must_use]
    pub const fn with_validation_debounce(mut self, debounce: Duration) -> Self {
        self.validation_debounce = debounce;
        self
    }

    /// Set the fallback login error message
    #[must_use]
    pub fn with_fallback_error_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_error_message = message.into();
        self
    }

    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to a value
    /// that cannot be used.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`LoginConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_VALIDATION_DEBOUNCE_MS) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|error| ConfigError::InvalidValue {
                    key: ENV_VALIDATION_DEBOUNCE_MS,
                    value: raw.clone(),
                    reason: error.to_string(),
                })?;
            config.validation_debounce = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup(ENV_FALLBACK_ERROR_MESSAGE) {
            if raw.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_FALLBACK_ERROR_MESSAGE,
                    value: raw,
                    reason: "message must not be blank".to_string(),
                });
            }
            config.fallback_error_message = raw;
        }

        Ok(config)
    }
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            validation_debounce: DEFAULT_VALIDATION_DEBOUNCE,
            fallback_error_message: DEFAULT_FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LoginConfig::default();
        assert_eq!(config.validation_debounce, Duration::from_millis(500));
        assert_eq!(config.fallback_error_message, "api error");
    }

    #[test]
    fn test_builders() {
        let config = LoginConfig::default()
            .with_validation_debounce(Duration::from_millis(50))
            .with_fallback_error_message("login failed");

        assert_eq!(config.validation_debounce, Duration::from_millis(50));
        assert_eq!(config.fallback_error_message, "login failed");
    }

    #[test]
    fn test_lookup_overrides() {
        let config = LoginConfig::from_lookup(lookup_from(&[
            (ENV_VALIDATION_DEBOUNCE_MS, " 250 "),
            (ENV_FALLBACK_ERROR_MESSAGE, "something went wrong"),
        ]))
        .unwrap();

        assert_eq!(config.validation_debounce, Duration::from_millis(250));
        assert_eq!(config.fallback_error_message, "something went wrong");
    }

    #[test]
    fn test_lookup_without_variables_is_default() {
        let config = LoginConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, LoginConfig::default());
    }

    #[test]
    fn test_invalid_values() {
        let error = LoginConfig::from_lookup(lookup_from(&[(ENV_VALIDATION_DEBOUNCE_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(
            error,
            ConfigError::InvalidValue {
                key: ENV_VALIDATION_DEBOUNCE_MS,
                ..
            }
        ));

        let error = LoginConfig::from_lookup(lookup_from(&[(ENV_FALLBACK_ERROR_MESSAGE, " ")]))
            .unwrap_err();
        assert!(error.to_string().contains(ENV_FALLBACK_ERROR_MESSAGE));
    }
}
