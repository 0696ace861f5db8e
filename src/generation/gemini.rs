//! Client for the Gemini `generateContent` REST API.
//!
//! One-shot calls use `:generateContent`; streaming calls use
//! `:streamGenerateContent?alt=sse` and decode the SSE body incrementally.

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use futures_core::Stream;
use futures_util::stream::{self, StreamExt};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{Config, Defaults, ServiceConfig};

use super::sse::SseDecoder;
use super::{ChunkStream, GenerationError, GenerationRequest, GenerationService, Generated};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for a Gemini-compatible endpoint.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    request_timeout: Duration,
    idle_timeout: Duration,
}

impl GeminiClient {
    /// Create a client with an explicit API key.
    pub fn new(
        service: &ServiceConfig,
        defaults: &Defaults,
        api_key: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(defaults.connect_timeout_seconds.into()))
            .build()?;

        Ok(Self {
            client,
            base_url: service.base_url.trim_end_matches('/').to_string(),
            model: service.model.clone(),
            api_key: api_key.into(),
            temperature: service.temperature,
            request_timeout: Duration::from_secs(defaults.timeout_seconds.into()),
            idle_timeout: Duration::from_secs(defaults.idle_timeout_seconds.into()),
        })
    }

    /// Create a client from configuration, resolving the API key from the
    /// config file or the configured environment variable.
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        let api_key =
            config
                .service
                .resolve_api_key()
                .ok_or_else(|| GenerationError::NotConfigured {
                    reason: format!(
                        "no API key: set service.api_key or the {} environment variable",
                        config.service.api_key_env
                    ),
                })?;

        Self::new(&config.service, &config.defaults, api_key)
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, self.model, method)
    }

    fn build_request(&self, request: &GenerationRequest) -> ApiRequest {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .map(|turn| Content {
                role: turn.role.as_str(),
                parts: vec![Part::Text {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        let mut parts: Vec<Part> = request
            .images
            .iter()
            .map(|image| Part::Inline {
                inline_data: InlineData {
                    mime_type: image.mime_type().to_string(),
                    data: STANDARD.encode(image.data()),
                },
            })
            .collect();
        parts.push(Part::Text {
            text: request.prompt.clone(),
        });

        contents.push(Content {
            role: "user",
            parts,
        });

        ApiRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }

    async fn send(&self, url: &str, body: &ApiRequest) -> Result<Response, GenerationError> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());

        tracing::error!(
            status = %status,
            error = %error_text,
            "Generation API error"
        );

        let message = api_error_message(&error_text).unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or(error_text)
        });

        Err(GenerationError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn generate_inner(&self, request: &GenerationRequest) -> Result<Generated, GenerationError> {
        let url = self.endpoint("generateContent");
        let body = self.build_request(request);

        let response = self.send(&url, &body).await?;
        let response_text = response.text().await?;

        let parsed: ApiResponse = serde_json::from_str(&response_text).map_err(|e| {
            GenerationError::Parse(format!("Failed to parse response JSON: {}", e))
        })?;

        parsed.log_block_reason();
        Ok(Generated {
            text: parsed.text(),
        })
    }

    fn timeout_error(&self) -> GenerationError {
        GenerationError::RequestTimeout {
            duration: self.request_timeout,
        }
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generated, GenerationError> {
        tracing::debug!(
            model = %self.model,
            history = request.history.len(),
            images = request.images.len(),
            "Sending generation request"
        );

        let start = Instant::now();
        let result = tokio::time::timeout(self.request_timeout, self.generate_inner(&request))
            .await
            .map_err(|_| self.timeout_error())?;

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Generation request finished"
        );
        result
    }

    async fn generate_stream(
        &self,
        request: GenerationRequest,
    ) -> Result<ChunkStream, GenerationError> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let body = self.build_request(&request);

        tracing::debug!(
            model = %self.model,
            history = request.history.len(),
            images = request.images.len(),
            "Opening generation stream"
        );

        let response = tokio::time::timeout(self.request_timeout, self.send(&url, &body))
            .await
            .map_err(|_| self.timeout_error())??;

        Ok(text_chunks(response.bytes_stream(), self.idle_timeout))
    }
}

/// Decode an SSE byte stream of `GenerateContentResponse` events into text
/// chunks. Events without text are skipped; an error event or a gap longer
/// than `idle_timeout` ends the stream with an `Err` item.
pub fn text_chunks<S, B, E>(bytes: S, idle_timeout: Duration) -> ChunkStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<GenerationError> + Send + 'static,
{
    let state = ChunkState {
        bytes: Box::pin(bytes),
        decoder: SseDecoder::new(),
        ready: VecDeque::new(),
        done: false,
    };

    Box::pin(stream::unfold(state, move |mut state| async move {
        loop {
            if let Some(item) = state.ready.pop_front() {
                return Some((item, state));
            }
            if state.done {
                return None;
            }

            match tokio::time::timeout(idle_timeout, state.bytes.next()).await {
                Ok(Some(Ok(bytes))) => {
                    let events = state.decoder.push(bytes.as_ref());
                    state.enqueue(events);
                }
                Ok(Some(Err(err))) => state.fail(err.into()),
                Ok(None) => {
                    let events = state.decoder.finish();
                    state.enqueue(events);
                    state.done = true;
                }
                Err(_) => state.fail(GenerationError::IdleTimeout {
                    duration: idle_timeout,
                }),
            }
        }
    }))
}

struct ChunkState<S> {
    bytes: Pin<Box<S>>,
    decoder: SseDecoder,
    ready: VecDeque<Result<String, GenerationError>>,
    done: bool,
}

impl<S> ChunkState<S> {
    fn enqueue(&mut self, events: Vec<Value>) {
        for event in events {
            if let Some(err) = stream_error(&event) {
                self.fail(err);
                return;
            }

            match serde_json::from_value::<ApiResponse>(event) {
                Ok(response) => {
                    response.log_block_reason();
                    if let Some(text) = response.text() {
                        self.ready.push_back(Ok(text));
                    }
                }
                Err(e) => {
                    self.fail(GenerationError::Parse(format!(
                        "Failed to parse stream event: {}",
                        e
                    )));
                    return;
                }
            }
        }
    }

    fn fail(&mut self, err: GenerationError) {
        self.ready.push_back(Err(err));
        self.done = true;
    }
}

/// Extract `error.message` from a Google API error body.
fn api_error_message(body: &str) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
    parsed.error.message.filter(|m| !m.is_empty())
}

fn stream_error(event: &Value) -> Option<GenerationError> {
    let detail: ApiErrorDetail = serde_json::from_value(event.get("error")?.clone()).ok()?;
    Some(GenerationError::Api {
        status: detail.code.unwrap_or(500),
        message: detail.message.unwrap_or_default(),
    })
}

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// `GenerateContentResponse`, reduced to the fields used here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl ApiResponse {
    /// Concatenated text of the first candidate, `None` when it has none.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn log_block_reason(&self) {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::warn!(reason = %reason, "Prompt was blocked by the service");
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: Option<u16>,
    message: Option<String>,
}
