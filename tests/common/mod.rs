//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::{broadcast, oneshot};

use promptdeck::generation::{
    ChunkStream, Generated, GenerationError, GenerationRequest, GenerationService,
};

/// What the scripted service does for one call.
pub enum Script {
    /// One-shot reply; as a stream, a single chunk (or none for `None`).
    Reply(Option<String>),
    /// Stream items delivered in order; as a one-shot reply, the chunks joined.
    Stream(Vec<Result<String, GenerationError>>),
    /// Fail before producing anything.
    Fail(GenerationError),
    /// Wait until the sender fires (or is dropped), then run the inner script.
    Gated(oneshot::Receiver<()>, Box<Script>),
}

impl Script {
    pub fn reply(text: &str) -> Self {
        Script::Reply(Some(text.to_string()))
    }

    pub fn chunks(chunks: &[&str]) -> Self {
        Script::Stream(chunks.iter().map(|c| Ok(c.to_string())).collect())
    }

    pub fn fail(message: &str) -> Self {
        Script::Fail(service_error(message))
    }

    /// Hold `inner` back until the returned sender fires.
    pub fn gated(inner: Script) -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Script::Gated(rx, Box::new(inner)))
    }
}

pub fn service_error(message: &str) -> GenerationError {
    GenerationError::Service {
        message: Some(message.to_string()),
    }
}

/// A `GenerationService` that plays back scripts in call order and records
/// every request it receives.
#[derive(Default)]
pub struct ScriptedService {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedService {
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    async fn next_script(&self, request: GenerationRequest) -> Script {
        self.requests.lock().push(request);
        let mut script = self
            .scripts
            .lock()
            .pop_front()
            .unwrap_or_else(|| Script::fail("no script left"));

        while let Script::Gated(gate, inner) = script {
            let _ = gate.await;
            script = *inner;
        }
        script
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generated, GenerationError> {
        match self.next_script(request).await {
            Script::Reply(Some(text)) => Ok(Generated::text(text)),
            Script::Reply(None) => Ok(Generated::empty()),
            Script::Stream(items) => {
                let mut text = String::new();
                for item in items {
                    text.push_str(&item?);
                }
                Ok(Generated::text(text))
            }
            Script::Fail(err) => Err(err),
            Script::Gated(..) => unreachable!("gates are resolved in next_script"),
        }
    }

    async fn generate_stream(
        &self,
        request: GenerationRequest,
    ) -> Result<ChunkStream, GenerationError> {
        let items: Vec<Result<String, GenerationError>> = match self.next_script(request).await {
            Script::Reply(text) => text.into_iter().map(Ok).collect(),
            Script::Stream(items) => items,
            Script::Fail(err) => return Err(err),
            Script::Gated(..) => unreachable!("gates are resolved in next_script"),
        };
        Ok(Box::pin(stream::iter(items)))
    }
}

/// Collect every state currently buffered on `rx`.
pub fn drain<T: Clone>(rx: &mut broadcast::Receiver<T>) -> Vec<T> {
    let mut states = Vec::new();
    while let Ok(state) = rx.try_recv() {
        states.push(state);
    }
    states
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Write `content` to a `config.toml` in a fresh temporary directory.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
pub const JPEG_MAGIC: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";
