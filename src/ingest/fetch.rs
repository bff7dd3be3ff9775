// src/ingest/fetch.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use super::types::DocumentFetcher;
use crate::config::FetchConfig;

/// Plain HTTPS GET of a dashboard page.
pub struct HttpDocumentFetcher {
    client: reqwest::Client,
}

impl HttpDocumentFetcher {
    pub fn new(cfg: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(cfg)?,
        })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

pub fn build_http_client(cfg: &FetchConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs.max(1)))
        .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
        .build()
        .context("building http client")
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} status"))?;
        resp.text()
            .await
            .with_context(|| format!("GET {url} body"))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Fetch-or-null: failures are logged here and never reach the caller.
pub async fn fetch_document(fetcher: &dyn DocumentFetcher, url: &str) -> Option<String> {
    match fetcher.fetch(url).await {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::warn!(error = ?e, url, fetcher = fetcher.name(), "document fetch failed");
            None
        }
    }
}
