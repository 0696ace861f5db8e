//! Intents for the chat screen.

use crate::mvi::Intent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatIntent {
    /// Append the user's message and a pending model placeholder.
    Submit { text: String },

    /// The reply for the placeholder at `placeholder` arrived.
    /// `None` means the reply had no text.
    Resolved {
        placeholder: usize,
        text: Option<String>,
    },

    /// The request for the placeholder at `placeholder` failed.
    Failed { placeholder: usize, message: String },
}

impl Intent for ChatIntent {}
