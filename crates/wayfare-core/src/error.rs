//! Application-level error types.
//!
//! Errors here carry full context for logs and expose `user_message()` for
//! anything shown to the person using the app.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Service-level failures (weather, etc.) already rendered to text.
    #[error("Service error: {0}")]
    Service(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Service(_) => "Something went wrong. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not available")]
    NoConfigDir,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NoConfigDir => "No configuration directory found. Using defaults.",
            ConfigError::Read { .. } => "Configuration could not be read. Check file permissions.",
            ConfigError::Write { .. } => "Configuration could not be saved. Check file permissions.",
            ConfigError::Parse(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Serialize(_) => "Configuration could not be saved. Please try again.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::Config(ConfigError::NoConfigDir),
            AppError::Config(ConfigError::Invalid("weather.default_city".into())),
            AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
            AppError::Service("weather unavailable".into()),
            AppError::Other(anyhow::anyhow!("boom")),
        ];

        for e in errors {
            assert!(!e.user_message().is_empty(), "empty message for {:?}", e);
            assert!(!e.to_string().is_empty());
        }
    }

    #[test]
    fn test_config_error_passes_through_user_message() {
        let e = AppError::from(ConfigError::Invalid("x".into()));
        assert_eq!(e.user_message(), "Invalid configuration. Check your settings.");
    }

    #[test]
    fn test_parse_error_conversion() {
        let parse_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let e: ConfigError = parse_err.into();
        assert!(matches!(e, ConfigError::Parse(_)));
        assert!(e.user_message().contains("malformed"));
    }
}
