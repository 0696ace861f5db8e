//! Conversation log for the chat screen.

use crate::generation::Turn;
use crate::mvi::UiState;

/// Originator of a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    User,
    Model,
    /// A failure notice shown in place of a model reply.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub participant: Participant,
    pub text: String,
    /// True for a model placeholder that has not resolved yet.
    pub pending: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            participant: Participant::User,
            text: text.into(),
            pending: false,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            participant: Participant::Model,
            text: String::new(),
            pending: true,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            participant: Participant::Model,
            text: text.into(),
            pending: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            participant: Participant::Error,
            text: text.into(),
            pending: false,
        }
    }
}

/// Append-only log of messages, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationLog {
    pub(super) messages: Vec<ChatMessage>,
}

impl UiState for ConversationLog {}

impl ConversationLog {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChatMessage> {
        self.messages.get(index)
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.pending).count()
    }

    /// Completed exchanges before `end`, as context for the next request.
    ///
    /// Only a user message directly followed by a resolved model reply is
    /// included; exchanges that failed or are still pending are left out.
    pub fn history_before(&self, end: usize) -> Vec<Turn> {
        let end = end.min(self.messages.len());
        let window = &self.messages[..end];

        window
            .windows(2)
            .filter(|pair| {
                pair[0].participant == Participant::User
                    && pair[1].participant == Participant::Model
                    && !pair[1].pending
            })
            .flat_map(|pair| [Turn::user(&pair[0].text), Turn::model(&pair[1].text)])
            .collect()
    }
}
