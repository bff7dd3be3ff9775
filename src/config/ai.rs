// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::env;

pub const ENV_API_KEY: &str = "OPENROUTER_API_KEY";

fn default_enabled() -> bool {
    true
}
fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}
fn default_model() -> String {
    "tngtech/tng-r1t-chimera:free".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4000
}
fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Chat-completions URL (OpenAI-compatible shape).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from OPENROUTER_API_KEY at resolve time.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Upper bound for the whole completion call, transport included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sent as `HTTP-Referer` (OpenRouter app attribution).
    #[serde(default)]
    pub referer: Option<String>,
    /// Sent as `X-Title`.
    #[serde(default)]
    pub title: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: default_api_key(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            referer: None,
            title: Some("Market Brief".to_string()),
        }
    }
}

impl AiConfig {
    /// Resolve the credential. A missing env var is not an error here: the
    /// synthesizer degrades to the fallback brief when no key is available.
    pub fn resolved_api_key(&self) -> Option<String> {
        let raw = self.api_key.trim();
        let key = if raw.eq_ignore_ascii_case("env") {
            env::var(ENV_API_KEY).ok()?
        } else {
            raw.to_string()
        };
        let key = key.trim().to_string();
        (!key.is_empty()).then_some(key)
    }

    /// Keep sampling parameters inside the ranges the completion API accepts.
    pub fn sanitize(&mut self) {
        if !(0.0..=2.0).contains(&self.temperature) {
            self.temperature = default_temperature();
        }
        if self.max_tokens == 0 {
            self.max_tokens = default_max_tokens();
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
    }
}
