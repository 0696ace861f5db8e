//! Runs generation calls for a request slot.

use std::sync::{Arc, Weak};

use futures_util::StreamExt;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::{AbortHandle, JoinHandle};

use crate::generation::{GenerationRequest, GenerationService};
use crate::mvi::Store;
use crate::screen::ScreenKind;

use super::intent::RequestIntent;
use super::reducer::RequestReducer;
use super::state::RequestState;

/// How the service delivers output to the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// A single `generate` call.
    OneShot,
    /// A `generate_stream` call, each chunk extending the output.
    Streaming,
}

/// Owns one [`RequestState`] and the request currently feeding it.
///
/// Submitting while a request is in flight aborts that request; results it
/// already produced but had not yet delivered are dropped. Spawned tasks
/// only hold a weak reference, so dropping the machine abandons them.
pub struct RequestMachine {
    kind: ScreenKind,
    delivery: Delivery,
    service: Arc<dyn GenerationService>,
    shared: Arc<Shared>,
}

struct Shared {
    store: Store<RequestReducer>,
    inflight: Mutex<InFlight>,
}

#[derive(Default)]
struct InFlight {
    /// Incremented by every submit; results tagged with an older value are stale.
    generation: u64,
    task: Option<AbortHandle>,
}

impl Shared {
    /// Dispatch a result of request `generation`. Returns `false` if the
    /// request has been superseded.
    fn deliver(&self, generation: u64, intent: RequestIntent) -> bool {
        let inflight = self.inflight.lock();
        if inflight.generation != generation {
            return false;
        }
        self.store.dispatch(intent);
        true
    }
}

impl RequestMachine {
    pub fn new(
        kind: ScreenKind,
        delivery: Delivery,
        service: Arc<dyn GenerationService>,
        transition_capacity: usize,
    ) -> Self {
        Self {
            kind,
            delivery,
            service,
            shared: Arc::new(Shared {
                store: Store::new(transition_capacity),
                inflight: Mutex::new(InFlight::default()),
            }),
        }
    }

    pub fn state(&self) -> RequestState {
        self.shared.store.state()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RequestState> {
        self.shared.store.subscribe()
    }

    /// Move to `Pending` and start the service call on the tokio runtime.
    ///
    /// The state is `Pending` when this returns. Must be called from
    /// within a tokio runtime.
    pub fn submit(&self, request: GenerationRequest) -> JoinHandle<()> {
        let mut inflight = self.shared.inflight.lock();

        if let Some(previous) = inflight.task.take() {
            if !previous.is_finished() {
                tracing::debug!(
                    screen = %self.kind,
                    superseded = inflight.generation,
                    "Aborting superseded request"
                );
                previous.abort();
            }
        }

        inflight.generation += 1;
        let generation = inflight.generation;
        self.shared.store.dispatch(RequestIntent::Submit);

        tracing::debug!(
            screen = %self.kind,
            generation,
            delivery = ?self.delivery,
            images = request.images.len(),
            "Submitting request"
        );

        let task = tokio::spawn(run_request(
            Arc::downgrade(&self.shared),
            generation,
            self.kind,
            self.delivery,
            self.service.clone(),
            request,
        ));
        inflight.task = Some(task.abort_handle());
        task
    }
}

async fn run_request(
    shared: Weak<Shared>,
    generation: u64,
    kind: ScreenKind,
    delivery: Delivery,
    service: Arc<dyn GenerationService>,
    request: GenerationRequest,
) {
    let deliver = |intent: RequestIntent| match shared.upgrade() {
        Some(shared) => shared.deliver(generation, intent),
        None => {
            tracing::debug!(screen = %kind, generation, "Screen dropped, discarding result");
            false
        }
    };

    match delivery {
        Delivery::OneShot => {
            let intent = match service.generate(request).await {
                Ok(generated) => RequestIntent::Completed {
                    text: generated.text,
                },
                Err(err) => {
                    tracing::warn!(screen = %kind, service = service.name(), error = %err, "Generation failed");
                    RequestIntent::Failed {
                        message: err.message().unwrap_or_default(),
                    }
                }
            };
            deliver(intent);
        }
        Delivery::Streaming => {
            let mut chunks = match service.generate_stream(request).await {
                Ok(chunks) => chunks,
                Err(err) => {
                    tracing::warn!(screen = %kind, service = service.name(), error = %err, "Generation stream failed to open");
                    deliver(RequestIntent::Failed {
                        message: err.message().unwrap_or_default(),
                    });
                    return;
                }
            };

            let mut received = 0usize;
            while let Some(item) = chunks.next().await {
                match item {
                    Ok(text) => {
                        received += 1;
                        if !deliver(RequestIntent::Chunk { text }) {
                            return;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(screen = %kind, received, error = %err, "Generation stream failed");
                        deliver(RequestIntent::Failed {
                            message: err.message().unwrap_or_default(),
                        });
                        return;
                    }
                }
            }

            tracing::debug!(screen = %kind, generation, received, "Generation stream finished");
            deliver(RequestIntent::StreamFinished);
        }
    }
}
