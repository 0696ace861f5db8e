//! Generation service capability.
//!
//! Screens only talk to the remote model through [`GenerationService`]:
//! a one-shot call returning the whole response, or a streaming call
//! yielding text chunks in arrival order.

mod error;
pub mod gemini;
pub mod sse;

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::attachment::ImageAttachment;

pub use error::GenerationError;
pub use gemini::GeminiClient;

/// Incremental text chunks of a streamed response.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send>>;

/// Author of a prior conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// A completed exchange entry sent as context with chat requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Everything the service needs for one generation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    /// Earlier turns, oldest first.
    pub history: Vec<Turn>,
    pub prompt: String,
    /// Sent before the prompt text, in order.
    pub images: Vec<ImageAttachment>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_images(mut self, images: Vec<ImageAttachment>) -> Self {
        self.images = images;
        self
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }
}

/// Result of a one-shot call. `text` is `None` when the model produced no
/// text at all (for example a blocked prompt).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generated {
    pub text: Option<String>,
}

impl Generated {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn empty() -> Self {
        Self { text: None }
    }
}

/// Remote text generation, optionally conditioned on images.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Short identifier for logging.
    fn name(&self) -> &'static str;

    /// Generate the full response in one call.
    async fn generate(&self, request: GenerationRequest) -> Result<Generated, GenerationError>;

    /// Generate the response as a stream of chunks.
    ///
    /// An `Err` here means the call failed before any chunk was produced;
    /// later failures arrive as `Err` items on the stream.
    async fn generate_stream(
        &self,
        request: GenerationRequest,
    ) -> Result<ChunkStream, GenerationError>;
}
