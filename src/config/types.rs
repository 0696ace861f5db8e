use serde::{Deserialize, Serialize};

use crate::mvi::DEFAULT_TRANSITION_CAPACITY;
use crate::screen::image::DEFAULT_PROMPT_TEMPLATE;
use crate::screen::ScreenKind;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Default settings for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Screen opened when no subcommand is given (default: text).
    #[serde(default)]
    pub screen: ScreenKind,
    /// Request timeout in seconds (default: 60).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Connection timeout in seconds (default: 10).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    /// Max silence between streamed chunks in seconds (default: 60).
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u32,
    /// States buffered per screen observer before it starts skipping (default: 64).
    #[serde(default = "default_transition_capacity")]
    pub transition_capacity: usize,
}

/// The hosted generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Direct API key. Takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Image screen settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Prompt sent with the images; `{input}` is replaced by the user's text.
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,
}

/// Chat screen labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_user_label")]
    pub user_label: String,
    #[serde(default = "default_model_label")]
    pub model_label: String,
}

fn default_timeout() -> u32 {
    60
}

fn default_connect_timeout() -> u32 {
    10
}

fn default_idle_timeout() -> u32 {
    60
}

fn default_transition_capacity() -> usize {
    DEFAULT_TRANSITION_CAPACITY
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_prompt_template() -> String {
    DEFAULT_PROMPT_TEMPLATE.to_string()
}

fn default_user_label() -> String {
    "You".to_string()
}

fn default_model_label() -> String {
    "Gemini".to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            screen: ScreenKind::default(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            transition_capacity: default_transition_capacity(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
        }
    }
}

impl ServiceConfig {
    /// The configured key, or the value of `api_key_env`. Empty values count
    /// as unset.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Some(key.to_string());
        }

        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            prompt_template: default_prompt_template(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            user_label: default_user_label(),
            model_label: default_model_label(),
        }
    }
}
