//! Error handling for the transform client
//!
//! This module provides the error system used across the crate:
//! - One variant per failure category the remote processor can report
//! - Transport variants for connection problems and per-attempt timeouts
//! - A flat `ErrorKind` so callers can match every category exhaustively
//! - Convenient Result type alias

use std::fmt;
use thiserror::Error;

pub mod mapping;

/// Result type for transform operations
pub type Result<T> = std::result::Result<T, TransformError>;

/// Category of a failure, independent of its message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoData,
    RateLimited,
    ContentRejected,
    FaceNotFound,
    InvalidRequest,
    Blocked,
    MalformedResponse,
    ExhaustedRetries,
    RecoveryFailed,
    InvalidConfiguration,
    /// Connection failures, bad HTTP statuses and timeouts
    Transport,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoData => "NoData",
            Self::RateLimited => "RateLimited",
            Self::ContentRejected => "ContentRejected",
            Self::FaceNotFound => "FaceNotFound",
            Self::InvalidRequest => "InvalidRequest",
            Self::Blocked => "Blocked",
            Self::MalformedResponse => "MalformedResponse",
            Self::ExhaustedRetries => "ExhaustedRetries",
            Self::RecoveryFailed => "RecoveryFailed",
            Self::InvalidConfiguration => "InvalidConfiguration",
            Self::Transport => "Transport",
        };
        f.write_str(name)
    }
}

/// Main error type for the transform client
///
/// Messages are shown to the user as-is, so no variant adds a prefix of
/// its own.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The processor answered with an empty body
    #[error("{0}")]
    NoData(String),

    /// The processor is throttling this client
    #[error("{0}")]
    RateLimited(String),

    /// The image was refused by the content filter
    #[error("{0}")]
    ContentRejected(String),

    /// No face could be located in the image
    #[error("{0}")]
    FaceNotFound(String),

    /// The processor rejected the request itself
    #[error("{0}")]
    InvalidRequest(String),

    /// The client (usually its IP range) is blocked
    #[error("{0}")]
    Blocked(String),

    /// A response arrived but could not be interpreted
    #[error("{0}")]
    MalformedResponse(String),

    /// Every attempt of a retried operation failed
    #[error("{message}")]
    ExhaustedRetries { attempts: u32, message: String },

    /// The recovery frame could not be produced
    #[error("{0}")]
    RecoveryFailed(String),

    /// Invalid configuration or CLI input
    #[error("{0}")]
    InvalidConfiguration(String),

    /// Network or connection errors, including non-success statuses
    #[error("{0}")]
    Network(String),

    /// A single attempt ran past its deadline
    #[error("{0}")]
    Timeout(String),
}

impl TransformError {
    /// Create a no-data error
    pub fn no_data() -> Self {
        TransformError::NoData("No data".to_string())
    }

    /// Create a rate limit error
    pub fn rate_limited(message: impl Into<String>) -> Self {
        TransformError::RateLimited(message.into())
    }

    /// Create a content rejection error
    pub fn content_rejected() -> Self {
        TransformError::ContentRejected("Couldn't pass the censorship. Try another photo.".to_string())
    }

    /// Create a face-not-found error
    pub fn face_not_found() -> Self {
        TransformError::FaceNotFound("Face not found. Try another photo.".to_string())
    }

    /// Create an invalid request error
    pub fn invalid_request() -> Self {
        TransformError::InvalidRequest("Try another photo.".to_string())
    }

    /// Create a blocked error
    pub fn blocked() -> Self {
        TransformError::Blocked("Blocked by qq. Change ip location.".to_string())
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        TransformError::MalformedResponse(message.into())
    }

    /// Wrap the last error of a retry loop
    pub fn exhausted(attempts: u32, last: &TransformError) -> Self {
        TransformError::ExhaustedRetries {
            attempts,
            message: last.to_string(),
        }
    }

    /// Create a recovery error
    pub fn recovery(message: impl Into<String>) -> Self {
        TransformError::RecoveryFailed(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        TransformError::InvalidConfiguration(message.into())
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        TransformError::Network(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        TransformError::Timeout(message.into())
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransformError::NoData(_) => ErrorKind::NoData,
            TransformError::RateLimited(_) => ErrorKind::RateLimited,
            TransformError::ContentRejected(_) => ErrorKind::ContentRejected,
            TransformError::FaceNotFound(_) => ErrorKind::FaceNotFound,
            TransformError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            TransformError::Blocked(_) => ErrorKind::Blocked,
            TransformError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            TransformError::ExhaustedRetries { .. } => ErrorKind::ExhaustedRetries,
            TransformError::RecoveryFailed(_) => ErrorKind::RecoveryFailed,
            TransformError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            TransformError::Network(_) | TransformError::Timeout(_) => ErrorKind::Transport,
        }
    }

    /// Check if another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            ErrorKind::Transport
            | ErrorKind::RateLimited
            | ErrorKind::NoData
            | ErrorKind::MalformedResponse => true,
            ErrorKind::FaceNotFound
            | ErrorKind::ContentRejected
            | ErrorKind::InvalidRequest
            | ErrorKind::Blocked
            | ErrorKind::ExhaustedRetries
            | ErrorKind::RecoveryFailed
            | ErrorKind::InvalidConfiguration => false,
        }
    }

    /// Check if this is a terminal error (not retryable)
    pub fn is_terminal(&self) -> bool {
        !self.is_retryable()
    }
}

/// Convert reqwest errors to TransformError
impl From<reqwest::Error> for TransformError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransformError::timeout(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            TransformError::network(format!("Connection error: {}", err))
        } else if err.is_redirect() {
            TransformError::network(format!("Too many redirects: {}", err))
        } else if let Some(status) = err.status() {
            TransformError::network(format!("HTTP status {}: {}", status, err))
        } else {
            TransformError::network(format!("HTTP client error: {}", err))
        }
    }
}

/// Convert serde_json errors to TransformError
impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        TransformError::malformed(format!("JSON error: {}", err))
    }
}

/// Convert image errors to TransformError
impl From<image::ImageError> for TransformError {
    fn from(err: image::ImageError) -> Self {
        TransformError::recovery(err.to_string())
    }
}
