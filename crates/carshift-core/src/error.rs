//! Core error types for carshift-core.
//!
//! Failures are split the way callers need to react to them: bad input is a
//! [`ValidationError`], a broken ranking feed is an [`UpstreamError`], and
//! everything touching the data directory goes through [`ConfigError`] or
//! plain IO/JSON errors. Empty results (no open hours, no decomposition, no
//! feasible plan, short history) are not errors and live in the outcome
//! enums of their modules.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for carshift-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Ranking feed errors
    #[error("Upstream unavailable: {0}")]
    Upstream(#[from] UpstreamError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Input rejected before any state was touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Hour range expression could not be parsed
    #[error("Invalid hour range '{0}' (expected e.g. 08-12)")]
    InvalidHourRange(String),

    /// Hour outside 0..=23
    #[error("Hour {0} is outside 0-23")]
    InvalidHour(u32),

    /// Participant has no registry entry
    #[error("Participant '{0}' is not registered")]
    NotRegistered(String),

    /// Sign-ups are switched off
    #[error("Sign-ups are not open")]
    SignupClosed,
}

impl ValidationError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The ranking feed could not deliver a complete page.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// Feed could not be reached or read
    #[error("ranking feed unreachable: {0}")]
    Unavailable(String),

    /// Feed answered with something that is not a complete ranking page
    #[error("ranking feed returned malformed data: {0}")]
    Malformed(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl<T> From<std::sync::PoisonError<T>> for CoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        CoreError::Custom(format!("Lock poisoned: {err}"))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
