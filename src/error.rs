// src/error.rs

//! Unified error handling for geoprobe.

use std::fmt;

use thiserror::Error;

/// Result type alias for geoprobe operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Submission or selection rejected
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single probe failed
    #[error("Probe error for {target}: {message}")]
    Probe { target: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a probe error with the target it concerns.
    pub fn probe(target: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Probe {
            target: target.into(),
            message: message.to_string(),
        }
    }
}
