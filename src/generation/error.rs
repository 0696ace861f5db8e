//! Error types for generation calls.

use std::time::Duration;

use thiserror::Error;

/// Errors a generation call can end with.
///
/// Screens do not distinguish between variants; they only show
/// [`GenerationError::message`].
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Missing API key or similar setup problem
    #[error("Generation service not configured: {reason}")]
    NotConfigured { reason: String },

    /// Failed to reach the service or read its response
    #[error("Connection failed: {source}")]
    Connection {
        #[from]
        source: reqwest::Error,
    },

    /// Request exceeded total timeout
    #[error("Request timeout after {duration:?}")]
    RequestTimeout { duration: Duration },

    /// Streaming response exceeded idle timeout
    #[error("Idle timeout after {duration:?} of inactivity")]
    IdleTimeout { duration: Duration },

    /// The service answered with an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body was not what the service promised
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Failure reported by the service without further classification
    #[error("{}", .message.as_deref().unwrap_or(""))]
    Service { message: Option<String> },
}

impl GenerationError {
    /// Human-readable description, if the error carries one.
    pub fn message(&self) -> Option<String> {
        match self {
            GenerationError::Service { message } => {
                message.clone().filter(|m| !m.trim().is_empty())
            }
            other => Some(other.to_string()),
        }
    }
}
