//! Intents for the request slot.

use crate::mvi::Intent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestIntent {
    /// A prompt was submitted.
    Submit,

    /// A one-shot call returned. `None` means the response had no text.
    Completed { text: Option<String> },

    /// A streamed chunk arrived.
    Chunk { text: String },

    /// The stream ended normally.
    StreamFinished,

    /// The service call failed.
    Failed { message: String },
}

impl Intent for RequestIntent {}
