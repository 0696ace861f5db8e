//! Chat screen: a conversation log instead of a single result slot.
//!
//! Uses MVI:
//! - `state.rs` - `ConversationLog` and its messages
//! - `intent.rs` - submissions and per-placeholder results
//! - `reducer.rs` - append / resolve-in-place transitions

mod intent;
mod reducer;
mod state;

use std::sync::{Arc, Weak};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::generation::{GenerationRequest, GenerationService};
use crate::mvi::Store;

use super::{view_stream, Prompt, PromptScreen, ScreenKind, ScreenView, ViewStream};

pub use intent::ChatIntent;
pub use reducer::ChatReducer;
pub use state::{ChatMessage, ConversationLog, Participant};

/// Each submit owns its own placeholder, so concurrent submissions resolve
/// independently and in whatever order the service answers.
pub struct ChatScreen {
    service: Arc<dyn GenerationService>,
    store: Arc<Store<ChatReducer>>,
}

impl ChatScreen {
    pub fn new(service: Arc<dyn GenerationService>, transition_capacity: usize) -> Self {
        Self {
            service,
            store: Arc::new(Store::new(transition_capacity)),
        }
    }

    pub fn log(&self) -> ConversationLog {
        self.store.state()
    }

    pub fn subscribe_log(&self) -> broadcast::Receiver<ConversationLog> {
        self.store.subscribe()
    }
}

impl PromptScreen for ChatScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Chat
    }

    fn submit(&self, prompt: Prompt) -> JoinHandle<()> {
        let text = prompt.into_inner();
        // Submit appends [user, placeholder].
        let (_, (placeholder, history)) = self
            .store
            .dispatch_and_read(ChatIntent::Submit { text: text.clone() }, |log| {
                let placeholder = log.len() - 1;
                (placeholder, log.history_before(placeholder - 1))
            });

        tracing::debug!(
            screen = %ScreenKind::Chat,
            placeholder,
            history = history.len(),
            "Submitting chat message"
        );

        let request = GenerationRequest::new(text).with_history(history);
        tokio::spawn(run_exchange(
            Arc::downgrade(&self.store),
            placeholder,
            self.service.clone(),
            request,
        ))
    }

    fn view(&self) -> ScreenView {
        ScreenView::Conversation(self.store.state())
    }

    fn subscribe(&self) -> ViewStream {
        view_stream(self.store.subscribe(), ScreenView::Conversation)
    }
}

async fn run_exchange(
    store: Weak<Store<ChatReducer>>,
    placeholder: usize,
    service: Arc<dyn GenerationService>,
    request: GenerationRequest,
) {
    let intent = match service.generate(request).await {
        Ok(generated) => ChatIntent::Resolved {
            placeholder,
            text: generated.text,
        },
        Err(err) => {
            tracing::warn!(placeholder, service = service.name(), error = %err, "Chat generation failed");
            ChatIntent::Failed {
                placeholder,
                message: err.message().unwrap_or_default(),
            }
        }
    };

    match store.upgrade() {
        Some(store) => {
            store.dispatch(intent);
        }
        None => tracing::debug!(placeholder, "Chat screen dropped, discarding reply"),
    }
}
