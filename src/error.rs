//! Error types for admute
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! Configuration problems carry structured payloads so the boundary can log a
//! single human-readable message and exit with the documented code.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for admute
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration parsing or validation errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failure to reach or subscribe to the player's bus service
    #[error("Couldn't connect to the Spotify player service. Is Spotify running? (Detailed error was \"{0}\")")]
    Subscription(String),
}

/// Configuration error kinds
///
/// Missing-file is recoverable (caller falls back to defaults with a warning);
/// every other kind aborts startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Configuration file path does not exist
    #[error("Configuration file \"{}\" not found", path.display())]
    FileNotFound { path: PathBuf },

    /// File exists but is not syntactically valid INI
    #[error("Error while parsing configuration: {0}")]
    Parse(String),

    /// Section name outside the statically known set
    #[error("Invalid configuration section \"{section}\"")]
    InvalidSection { section: String },

    /// Entry name outside its section's allow-list
    #[error("Invalid configuration entry \"{entry}\" in section \"{section}\"")]
    InvalidEntry { section: String, entry: String },

    /// Entry value outside the allowed set
    #[error("Invalid configuration value detected for entry \"{entry}\": {value}. Valid values would be: {allowed}")]
    InvalidValue {
        entry: String,
        value: String,
        allowed: String,
    },
}

/// Convenience Result type using admute Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_error_names_the_player() {
        let err = Error::Subscription("name has no owner".to_string());
        let message = err.to_string();
        assert!(message.contains("Is Spotify running?"));
        assert!(message.contains("name has no owner"));
    }

    #[test]
    fn config_errors_pass_through_unchanged() {
        let config_err = ConfigError::InvalidSection {
            section: "FOO".to_string(),
        };
        let err = Error::from(config_err.clone());
        assert_eq!(err.to_string(), config_err.to_string());
    }
}
