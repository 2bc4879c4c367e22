//! Error handling module
//!
//! Defines the gateway and log store error types used in the project

use std::path::PathBuf;
use thiserror::Error;

/// Model gateway error types
///
/// Every failure of a single `generate` call maps to exactly one variant.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Credentials were rejected (401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Deployment or model does not exist on the endpoint (404)
    #[error("Deployment not found: {0}")]
    DeploymentNotFound(String),

    /// Endpoint is throttling requests (429)
    #[error("Rate limit exceeded{}", retry_hint(.retry_after_secs))]
    RateLimited {
        /// Seconds to wait before retrying, from the `Retry-After` header
        retry_after_secs: Option<u64>,
    },

    /// Transport failure, including timeouts
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint returned a payload that could not be interpreted
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Request rejected locally before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Any other non-success status
    #[error("Upstream API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
    },
}

fn retry_hint(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(", retry after {}s", secs),
        None => String::new(),
    }
}

impl GatewayError {
    /// Get error kind string
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::Authentication(_) => "authentication_error",
            GatewayError::DeploymentNotFound(_) => "deployment_not_found",
            GatewayError::RateLimited { .. } => "rate_limit_error",
            GatewayError::Network(_) => "network_error",
            GatewayError::MalformedResponse(_) => "malformed_response",
            GatewayError::InvalidRequest(_) => "invalid_request_error",
            GatewayError::Api { .. } => "api_error",
        }
    }

    /// Whether the same request may succeed if sent again later
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::RateLimited { .. } | GatewayError::Network(_))
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        !matches!(self, GatewayError::Authentication(_))
    }

    /// Server-suggested backoff, if any
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            GatewayError::RateLimited { retry_after_secs } => *retry_after_secs,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::MalformedResponse(err.to_string())
        } else if err.is_timeout() {
            GatewayError::Network(format!("request timed out: {}", err))
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

/// JSON log store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Log file exists but could not be read
    #[error("Failed to read log file {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Log file could not be written, renamed or backed up
    #[error("Failed to write log file {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Replacement write failed after a corrupted log was moved aside, and the
    /// corrupted log could not be moved back
    #[error(
        "Failed to write log file {}, corrupted log left at {}: {source}",
        .path.display(),
        .backup_path.display()
    )]
    RestoreFailed {
        path: PathBuf,
        backup_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Log file content is not a JSON array of records
    #[error("Corrupted log file {}: {reason}", .path.display())]
    CorruptedLog {
        path: PathBuf,
        reason: String,
    },

    /// Records could not be serialized
    #[error("Failed to encode log records: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    /// Path of the log file involved, when known
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            StoreError::ReadFailed { path, .. }
            | StoreError::WriteFailed { path, .. }
            | StoreError::RestoreFailed { path, .. }
            | StoreError::CorruptedLog { path, .. } => Some(path.as_path()),
            StoreError::Encode(_) => None,
        }
    }
}

/// Gateway result type alias
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Error handling helper functions
pub mod helpers {
    use super::*;

    /// Create invalid request error
    pub fn invalid_request(message: impl Into<String>) -> GatewayError {
        GatewayError::InvalidRequest(message.into())
    }

    /// Create malformed response error
    pub fn malformed(message: impl Into<String>) -> GatewayError {
        GatewayError::MalformedResponse(message.into())
    }

    /// Create write failure for a path
    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
        StoreError::WriteFailed { path: path.into(), source }
    }

    /// Create read failure for a path
    pub fn read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
        StoreError::ReadFailed { path: path.into(), source }
    }
}
