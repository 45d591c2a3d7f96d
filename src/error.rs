#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config key '{0}'")]
    InvalidConfigKey(String),

    #[error("invalid config value for '{key}': {msg}")]
    InvalidConfigValue { key: String, msg: String },

    #[error("invalid filter '{0}' (expected all, active or completed)")]
    InvalidFilter(String),

    #[error("invalid priority '{0}' (expected low, medium or high)")]
    InvalidPriority(String),

    #[error("invalid category '{0}' (expected work, personal or errand)")]
    InvalidCategory(String),

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("notifications are not available: {0}")]
    NotificationDenied(String),

    #[error("voice command failed: {0}")]
    Voice(String),

    #[error("{0}")]
    Other(String),
}
