//! Error types shared by TrailHub crates

use thiserror::Error;

/// Result type alias for shared TrailHub operations
pub type Result<T> = std::result::Result<T, TrailHubError>;

/// Failures that are not tied to a single request
#[derive(Error, Debug)]
pub enum TrailHubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidSetting { name: String, reason: String },

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl TrailHubError {
    /// Create an invalid-setting error for an environment variable
    pub fn invalid_setting(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
