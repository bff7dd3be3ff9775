//! AI adapter: completion-provider abstraction for the brief synthesizer.
//!
//! Providers return `anyhow::Result<String>`; deciding what a failure means
//! (fallback brief) is the synthesizer's job, not the provider's.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;

pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Text-completion service: one user prompt in, generated text out.
pub trait CompletionClient: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynCompletionClient = Arc<dyn CompletionClient>;

/// Factory: build a client according to config and environment variables.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock client.
/// * If `AI_TEST_MODE=error`, returns a client that always fails.
/// * Else if disabled or no credential is available, returns a disabled client.
/// * Else builds the OpenAI-compatible chat-completions provider.
pub fn build_client_from_config(config: &AiConfig) -> DynCompletionClient {
    match std::env::var("AI_TEST_MODE").as_deref() {
        Ok("mock") => {
            return Arc::new(MockProvider {
                fixed: "# 📊 Executive Summary\n\nMock brief (AI_TEST_MODE=mock).".to_string(),
            })
        }
        Ok("error") => return Arc::new(FailingProvider),
        _ => {}
    }

    if !config.enabled {
        return Arc::new(DisabledClient);
    }
    let Some(api_key) = config.resolved_api_key() else {
        tracing::warn!("no completion API key available; brief will use the fallback");
        return Arc::new(DisabledClient);
    };
    match ChatCompletionsProvider::new(config, api_key) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            tracing::warn!(error = ?e, "completion provider unavailable");
            Arc::new(DisabledClient)
        }
    }
}

// ------------------------------------------------------------
// Chat-completions provider (OpenRouter / OpenAI shape)
// ------------------------------------------------------------

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}
#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
}
#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}
#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}
#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

/// Extract the first choice's text from a completion body.
pub fn parse_completion(body: &str) -> Result<String> {
    let resp: Resp = serde_json::from_str(body).context("completion body is not the expected json")?;
    let content = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| anyhow!("completion has no choices[0].message.content"))?;
    if content.trim().is_empty() {
        bail!("completion content is empty");
    }
    Ok(content)
}

pub struct ChatCompletionsProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    referer: Option<String>,
    title: Option<String>,
}

impl ChatCompletionsProvider {
    pub fn new(cfg: &AiConfig, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("market-brief/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()
            .context("building completion http client")?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_key,
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            referer: cfg.referer.clone(),
            title: cfg.title.clone(),
        })
    }
}

impl CompletionClient for ChatCompletionsProvider {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        Box::pin(async move {
            let req = Req {
                model: &self.model,
                messages: vec![Msg {
                    role: "user",
                    content: prompt,
                }],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            let mut builder = self
                .http
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&req);
            if let Some(r) = &self.referer {
                builder = builder.header("HTTP-Referer", r);
            }
            if let Some(t) = &self.title {
                builder = builder.header("X-Title", t);
            }

            let resp = builder.send().await.context("completion request")?;
            let status = resp.status();
            if !status.is_success() {
                bail!("completion service returned {status}");
            }
            let body = resp.text().await.context("completion body")?;
            parse_completion(&body)
        })
    }

    fn provider_name(&self) -> &'static str {
        "chat-completions"
    }
}

// ------------------------------------------------------------
// Offline providers
// ------------------------------------------------------------

/// Always fails; used when AI is disabled or no credential exists.
pub struct DisabledClient;

impl CompletionClient for DisabledClient {
    fn complete<'a>(&'a self, _prompt: &'a str) -> CompletionFuture<'a> {
        Box::pin(async { Err(anyhow!("completion disabled")) })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Simple mock provider for tests/local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: String,
}

impl CompletionClient for MockProvider {
    fn complete<'a>(&'a self, _prompt: &'a str) -> CompletionFuture<'a> {
        let out = self.fixed.clone();
        Box::pin(async move { Ok(out) })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

pub struct FailingProvider;

impl CompletionClient for FailingProvider {
    fn complete<'a>(&'a self, _prompt: &'a str) -> CompletionFuture<'a> {
        Box::pin(async { Err(anyhow!("simulated provider error")) })
    }
    fn provider_name(&self) -> &'static str {
        "error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_completion_takes_first_choice() {
        let body = r##"{"id":"x","choices":[{"message":{"role":"assistant","content":"# Hi"}},{"message":{"content":"second"}}]}"##;
        assert_eq!(parse_completion(body).unwrap(), "# Hi");
    }

    #[test]
    fn parse_completion_rejects_shape_mismatch() {
        assert!(parse_completion(r#"{"choices":[]}"#).is_err());
        assert!(parse_completion(r#"{"choices":[{"message":{"content":null}}]}"#).is_err());
        assert!(parse_completion(r#"{"choices":[{"message":{"content":"   "}}]}"#).is_err());
        assert!(parse_completion(r#"{"error":{"message":"rate limited"}}"#).is_err());
        assert!(parse_completion("not json").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn factory_respects_test_mode_and_missing_key() {
        std::env::set_var("AI_TEST_MODE", "mock");
        assert_eq!(build_client_from_config(&AiConfig::default()).provider_name(), "mock");

        std::env::set_var("AI_TEST_MODE", "error");
        assert_eq!(build_client_from_config(&AiConfig::default()).provider_name(), "error");

        std::env::remove_var("AI_TEST_MODE");
        std::env::remove_var(crate::config::ai::ENV_API_KEY);
        assert_eq!(build_client_from_config(&AiConfig::default()).provider_name(), "disabled");

        let cfg = AiConfig {
            api_key: "k".into(),
            ..AiConfig::default()
        };
        assert_eq!(build_client_from_config(&cfg).provider_name(), "chat-completions");
    }
}
