//! Error types for apitrail
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! The fetch taxonomy (`Auth`, `RateLimitExceeded`, `Server`,
//! `MalformedResponse`, `Timeout`) is what a paginated fetch reports in
//! its [`FetchStatus`](crate::fetcher::FetchStatus).

use thiserror::Error;

/// The main error type for apitrail
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Fetch Errors
    // ============================================================================
    /// Credentials or harvested tokens were rejected. Never retried.
    #[error("Authentication failed (HTTP {status}): {body}")]
    Auth { status: u16, body: String },

    #[error("Rate limited: gave up after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    #[error("Server error (HTTP {status}) after {attempts} attempts")]
    Server { status: u16, attempts: u32 },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Deadline exceeded after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Unexpected HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    /// A session token could not be harvested from the landing response
    #[error("No session token found at {url}: {detail}")]
    TokenNotFound { url: String, detail: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("JSONPath error: {message}")]
    JsonPath { message: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    #[error("HAR error: {message}")]
    Har { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid value error for a config field
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(status: u16, body: impl Into<String>) -> Self {
        Self::Auth {
            status,
            body: body.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a token-not-found error
    pub fn token_not_found(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::TokenNotFound {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Create a JSONPath error
    pub fn json_path(message: impl Into<String>) -> Self {
        Self::JsonPath {
            message: message.into(),
        }
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create a HAR error
    pub fn har(message: impl Into<String>) -> Self {
        Self::Har {
            message: message.into(),
        }
    }
}

/// Check if an HTTP status code is retried with backoff
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

/// Check if an HTTP status code means the session is not authorized
pub fn is_auth_status(status: u16) -> bool {
    matches!(status, 401 | 403)
}

/// Result type alias for apitrail
pub type Result<T> = std::result::Result<T, Error>;
