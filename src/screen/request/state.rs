//! State of a single prompt/response slot.

use crate::mvi::UiState;

/// Error text used when the model answers without any text.
pub const EMPTY_RESPONSE_MESSAGE: &str = "The model returned an empty response";

/// Lifecycle of the current request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    /// Nothing has been submitted yet.
    #[default]
    Idle,

    /// A request is in flight.
    Pending,

    /// Output received so far. For streamed responses this grows with
    /// every chunk.
    Success { text: String },

    /// The request failed. `message` may be empty.
    Error { message: String },
}

impl UiState for RequestState {}

impl RequestState {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Success { text } => Some(text),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }
}
