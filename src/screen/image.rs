//! Image screen: attach images, ask a question, watch the answer stream in.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::attachment::{ImageAttachment, ImageAttachmentSet};
use crate::generation::{GenerationRequest, GenerationService};

use super::error::ScreenError;
use super::request::{Delivery, RequestMachine, RequestState};
use super::{view_stream, Prompt, PromptScreen, ScreenKind, ScreenView, ViewStream};

/// Placeholder replaced by the user's question in the prompt template.
pub const PROMPT_PLACEHOLDER: &str = "{input}";

pub const DEFAULT_PROMPT_TEMPLATE: &str =
    "Look at the image(s), and then answer the following question: {input}";

pub struct ImageScreen {
    machine: RequestMachine,
    attachments: Mutex<ImageAttachmentSet>,
    template: String,
}

impl ImageScreen {
    pub fn new(
        service: Arc<dyn GenerationService>,
        template: impl Into<String>,
        transition_capacity: usize,
    ) -> Self {
        Self {
            machine: RequestMachine::new(
                ScreenKind::Image,
                Delivery::Streaming,
                service,
                transition_capacity,
            ),
            attachments: Mutex::new(ImageAttachmentSet::new()),
            template: template.into(),
        }
    }

    pub fn state(&self) -> RequestState {
        self.machine.state()
    }

    pub fn attachments(&self) -> ImageAttachmentSet {
        self.attachments.lock().clone()
    }

    /// The prompt text actually sent for `question`.
    pub fn compose_prompt(&self, question: &str) -> String {
        self.template.replace(PROMPT_PLACEHOLDER, question)
    }
}

impl PromptScreen for ImageScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Image
    }

    fn submit(&self, prompt: Prompt) -> JoinHandle<()> {
        let images = self.attachments.lock().to_vec();
        let request =
            GenerationRequest::new(self.compose_prompt(prompt.as_str())).with_images(images);
        self.machine.submit(request)
    }

    fn attach(&self, image: ImageAttachment) -> Result<(), ScreenError> {
        tracing::debug!(name = image.name(), mime_type = image.mime_type(), "Attaching image");
        self.attachments.lock().push(image);
        Ok(())
    }

    fn view(&self) -> ScreenView {
        ScreenView::Request(self.machine.state())
    }

    fn subscribe(&self) -> ViewStream {
        view_stream(self.machine.subscribe(), ScreenView::Request)
    }
}
