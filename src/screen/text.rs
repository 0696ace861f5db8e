//! Text screen: a prompt in, one complete response out.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::generation::{GenerationRequest, GenerationService};

use super::request::{Delivery, RequestMachine, RequestState};
use super::{view_stream, Prompt, PromptScreen, ScreenKind, ScreenView, ViewStream};

pub struct TextScreen {
    machine: RequestMachine,
}

impl TextScreen {
    pub fn new(service: Arc<dyn GenerationService>, transition_capacity: usize) -> Self {
        Self {
            machine: RequestMachine::new(
                ScreenKind::Text,
                Delivery::OneShot,
                service,
                transition_capacity,
            ),
        }
    }

    pub fn state(&self) -> RequestState {
        self.machine.state()
    }
}

impl PromptScreen for TextScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Text
    }

    fn submit(&self, prompt: Prompt) -> JoinHandle<()> {
        self.machine
            .submit(GenerationRequest::new(prompt.into_inner()))
    }

    fn view(&self) -> ScreenView {
        ScreenView::Request(self.machine.state())
    }

    fn subscribe(&self) -> ViewStream {
        view_stream(self.machine.subscribe(), ScreenView::Request)
    }
}
