//! Error types for the VOLT action runtime

use thiserror::Error;

/// Errors raised while building, running or diagnosing action trees
#[derive(Debug, Error)]
pub enum VoltError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A leaf action failed during `advance`
    #[error("Action '{label}' failed: {message}")]
    Action { label: String, message: String },

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Signal handler error: {0}")]
    Signal(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VoltError {
    pub fn config(msg: impl Into<String>) -> Self {
        VoltError::Config(msg.into())
    }

    pub fn action(label: impl Into<String>, message: impl Into<String>) -> Self {
        VoltError::Action {
            label: label.into(),
            message: message.into(),
        }
    }

    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        VoltError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<ctrlc::Error> for VoltError {
    fn from(err: ctrlc::Error) -> Self {
        VoltError::Signal(err.to_string())
    }
}

/// Result alias used across the crate
pub type VoltResult<T> = Result<T, VoltError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_display() {
        let err = VoltError::action("lift", "servo stalled");
        assert_eq!(err.to_string(), "Action 'lift' failed: servo stalled");
    }

    #[test]
    fn test_from_json_error() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: VoltError = parse.unwrap_err().into();
        assert!(matches!(err, VoltError::Serialization(_)));
    }
}
