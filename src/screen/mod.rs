//! Prompt screens and the factory that builds them.
//!
//! Every screen owns one state machine: the text and image screens a
//! single [`RequestState`] slot, the chat screen a [`ConversationLog`].
//! The presentation layer talks to all of them through [`PromptScreen`].

pub mod chat;
mod error;
pub mod image;
pub mod request;
pub mod text;

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use futures_util::stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::attachment::ImageAttachment;
use crate::config::Config;
use crate::generation::GenerationService;
use crate::mvi::DEFAULT_TRANSITION_CAPACITY;

pub use chat::{ChatMessage, ChatScreen, ConversationLog, Participant};
pub use error::ScreenError;
pub use image::ImageScreen;
pub use request::{RequestState, EMPTY_RESPONSE_MESSAGE};
pub use text::TextScreen;

/// The screens the application offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenKind {
    #[default]
    Text,
    Image,
    Chat,
}

impl ScreenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenKind::Text => "text",
            ScreenKind::Image => "image",
            ScreenKind::Chat => "chat",
        }
    }

    pub fn all() -> [ScreenKind; 3] {
        [ScreenKind::Text, ScreenKind::Image, ScreenKind::Chat]
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User input that is guaranteed not to be blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn new(input: impl Into<String>) -> Result<Self, ScreenError> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(ScreenError::BlankPrompt);
        }
        Ok(Self(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// What a screen currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenView {
    Request(RequestState),
    Conversation(ConversationLog),
}

/// Every view a screen publishes after subscription, in order.
pub type ViewStream = Pin<Box<dyn Stream<Item = ScreenView> + Send>>;

/// A screen as seen by the presentation layer.
pub trait PromptScreen: Send + Sync {
    fn kind(&self) -> ScreenKind;

    /// Start a generation for `prompt`.
    ///
    /// The screen has already moved to its pending state when this
    /// returns; the handle completes once the result has been applied.
    fn submit(&self, prompt: Prompt) -> JoinHandle<()>;

    /// Add an image to send with the next submission.
    fn attach(&self, _image: ImageAttachment) -> Result<(), ScreenError> {
        Err(ScreenError::AttachmentsUnsupported { kind: self.kind() })
    }

    fn view(&self) -> ScreenView;

    fn subscribe(&self) -> ViewStream;
}

/// Construction parameters shared by all screens.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSettings {
    pub image_prompt_template: String,
    pub transition_capacity: usize,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            image_prompt_template: image::DEFAULT_PROMPT_TEMPLATE.to_string(),
            transition_capacity: DEFAULT_TRANSITION_CAPACITY,
        }
    }
}

impl ScreenSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            image_prompt_template: config.image.prompt_template.clone(),
            transition_capacity: config.defaults.transition_capacity,
        }
    }
}

/// Build a fresh screen of the given kind, starting from its initial state.
pub fn create_screen(
    kind: ScreenKind,
    service: Arc<dyn GenerationService>,
    settings: &ScreenSettings,
) -> Box<dyn PromptScreen> {
    tracing::debug!(screen = %kind, service = service.name(), "Creating screen");

    match kind {
        ScreenKind::Text => Box::new(TextScreen::new(service, settings.transition_capacity)),
        ScreenKind::Image => Box::new(ImageScreen::new(
            service,
            settings.image_prompt_template.clone(),
            settings.transition_capacity,
        )),
        ScreenKind::Chat => Box::new(ChatScreen::new(service, settings.transition_capacity)),
    }
}

/// Adapt a store subscription into a [`ViewStream`].
///
/// A subscriber that falls more than the channel capacity behind skips the
/// oldest states and continues with the newest.
fn view_stream<S, F>(rx: broadcast::Receiver<S>, to_view: F) -> ViewStream
where
    S: Clone + Send + 'static,
    F: Fn(S) -> ScreenView + Send + 'static,
{
    Box::pin(stream::unfold((rx, to_view), |(mut rx, to_view)| async move {
        loop {
            match rx.recv().await {
                Ok(state) => return Some((to_view(state), (rx, to_view))),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Screen observer lagged behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }))
}
