//! Reducer for the chat screen.

use crate::mvi::Reducer;
use crate::screen::request::EMPTY_RESPONSE_MESSAGE;

use super::intent::ChatIntent;
use super::state::{ChatMessage, ConversationLog};

/// Messages are only ever appended or resolved in place. A placeholder
/// resolves once; later results for the same index are ignored.
pub struct ChatReducer;

impl Reducer for ChatReducer {
    type State = ConversationLog;
    type Intent = ChatIntent;

    fn reduce(mut state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ChatIntent::Submit { text } => {
                state.messages.push(ChatMessage::user(text));
                state.messages.push(ChatMessage::placeholder());
            }

            ChatIntent::Resolved { placeholder, text } => {
                let resolved = match text {
                    Some(text) => ChatMessage::model(text),
                    None => ChatMessage::error(EMPTY_RESPONSE_MESSAGE),
                };
                resolve(&mut state, placeholder, resolved);
            }

            ChatIntent::Failed {
                placeholder,
                message,
            } => resolve(&mut state, placeholder, ChatMessage::error(message)),
        }
        state
    }

    fn changes(state: &Self::State, intent: &Self::Intent) -> bool {
        match intent {
            ChatIntent::Submit { .. } => true,
            ChatIntent::Resolved { placeholder, .. } | ChatIntent::Failed { placeholder, .. } => {
                state.get(*placeholder).is_some_and(|m| m.pending)
            }
        }
    }
}

fn resolve(state: &mut ConversationLog, placeholder: usize, message: ChatMessage) {
    match state.messages.get_mut(placeholder) {
        Some(slot) if slot.pending => *slot = message,
        _ => tracing::debug!(placeholder, "Ignoring result for a settled or missing placeholder"),
    }
}
