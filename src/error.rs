//! Error types for SurveyFlow
//!
//! This module defines all error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for SurveyFlow operations
///
/// Covers session/auth failures, gateway and proxy failure classes,
/// client-side validation, configuration and local persistence.
#[derive(Error, Debug)]
pub enum SurveyflowError {
    /// Bad credentials on login/register
    ///
    /// The message is deliberately generic; server detail is never surfaced.
    #[error("Authentication failed: invalid email or password")]
    AuthenticationFailed,

    /// Expired or invalid access token (HTTP 401 from the backend)
    #[error("Unauthorized")]
    Unauthorized,

    /// Backend unreachable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Backend did not answer in time
    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    /// Any other proxy-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Client-side field validation failed; one entry per violated rule
    #[error("Validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend returned an unexpected status for a data call
    #[error("API error: {0}")]
    Api(String),

    /// Local store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for SurveyFlow operations
///
/// Uses `anyhow::Error` so callers get rich context; the concrete
/// [`SurveyflowError`] can be recovered with `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;
