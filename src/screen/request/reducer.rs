//! Reducer for the request slot.

use crate::mvi::Reducer;

use super::intent::RequestIntent;
use super::state::{RequestState, EMPTY_RESPONSE_MESSAGE};

/// Results are only accepted while a request is live (`Pending`, or
/// `Success` for a stream still delivering), so no transition skips
/// `Pending`.
pub struct RequestReducer;

impl Reducer for RequestReducer {
    type State = RequestState;
    type Intent = RequestIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            RequestIntent::Submit => RequestState::Pending,

            RequestIntent::Completed { text } => match state {
                RequestState::Pending => match text {
                    Some(text) => RequestState::Success { text },
                    None => RequestState::error(EMPTY_RESPONSE_MESSAGE),
                },
                other => other,
            },

            RequestIntent::Chunk { text: chunk } => match state {
                RequestState::Pending => RequestState::Success { text: chunk },
                RequestState::Success { mut text } => {
                    text.push_str(&chunk);
                    RequestState::Success { text }
                }
                other => other,
            },

            RequestIntent::StreamFinished => match state {
                RequestState::Pending => RequestState::error(EMPTY_RESPONSE_MESSAGE),
                other => other,
            },

            RequestIntent::Failed { message } => match state {
                RequestState::Pending | RequestState::Success { .. } => {
                    RequestState::Error { message }
                }
                other => other,
            },
        }
    }

    fn changes(state: &Self::State, intent: &Self::Intent) -> bool {
        match (state, intent) {
            (RequestState::Pending, RequestIntent::Submit) => false,
            (_, RequestIntent::Submit) => true,
            (RequestState::Pending, _) => true,
            (RequestState::Success { .. }, RequestIntent::Chunk { text }) => !text.is_empty(),
            (RequestState::Success { .. }, RequestIntent::Failed { .. }) => true,
            _ => false,
        }
    }
}
