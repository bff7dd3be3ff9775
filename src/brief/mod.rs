// src/brief/mod.rs
//! Brief synthesis: prompt → completion service → brief, with a deterministic
//! fallback whenever the service cannot produce one.

pub mod ai_adapter;
pub mod prompt;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::brief::ai_adapter::DynCompletionClient;
use crate::brief::prompt::{build_prompt, EXECUTIVE_SUMMARY_HEADING};
use crate::ingest::types::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Generated,
    Fallback,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Generated => "generated",
            Provenance::Fallback => "fallback",
        }
    }
}

/// Markdown-like brief body. Provenance is for logs and metrics only; the
/// renderer treats both kinds the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brief {
    pub body: String,
    pub provenance: Provenance,
}

impl Brief {
    pub fn generated(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            provenance: Provenance::Generated,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

/// Minimal brief built straight from the snapshot.
pub fn fallback_brief(snapshot: &Snapshot) -> Brief {
    let body = format!(
        "{EXECUTIVE_SUMMARY_HEADING}\n\n\
Market data aggregated from {n} dashboards. AI analysis temporarily unavailable.\n\n\
## Key Metrics\n\
{json}\n\n\
Please check individual dashboards for detailed analysis.",
        n = snapshot.sources.len(),
        json = snapshot.to_pretty_json(),
    );
    Brief {
        body,
        provenance: Provenance::Fallback,
    }
}

pub struct BriefSynthesizer {
    client: DynCompletionClient,
    timeout: Duration,
}

impl BriefSynthesizer {
    pub fn new(client: DynCompletionClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Never fails: transport errors, non-2xx, malformed bodies and timeouts
    /// all yield the fallback brief.
    pub async fn synthesize(&self, snapshot: &Snapshot) -> Brief {
        static ONCE: OnceCell<()> = OnceCell::new();
        ONCE.get_or_init(|| {
            describe_counter!("brief_synthesis_total", "Briefs produced, by provenance.");
        });

        let prompt = build_prompt(snapshot);
        let provider = self.client.provider_name();
        tracing::info!(provider, prompt_chars = prompt.len(), "requesting brief");

        let brief = match tokio::time::timeout(self.timeout, self.client.complete(&prompt)).await {
            Ok(Ok(body)) => Brief::generated(body),
            Ok(Err(e)) => {
                tracing::warn!(error = ?e, provider, "completion failed; using fallback brief");
                fallback_brief(snapshot)
            }
            Err(_) => {
                tracing::warn!(provider, timeout_secs = self.timeout.as_secs_f64(), "completion timed out; using fallback brief");
                fallback_brief(snapshot)
            }
        };

        counter!("brief_synthesis_total", "provenance" => brief.provenance.as_str()).increment(1);
        brief
    }
}
