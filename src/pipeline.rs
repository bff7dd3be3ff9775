// src/pipeline.rs
//! One run: aggregate → synthesize → render → publish.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::brief::ai_adapter::{build_client_from_config, DynCompletionClient};
use crate::brief::{BriefSynthesizer, Provenance};
use crate::config::BriefConfig;
use crate::ingest::fetch::{build_http_client, HttpDocumentFetcher};
use crate::ingest::quotes::ChartQuoteProvider;
use crate::ingest::types::{DocumentFetcher, QuoteProvider};
use crate::ingest::Aggregator;
use crate::report::sinks::{FileSinks, PublishedPaths};
use crate::report::ReportRenderer;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub sources_ok: usize,
    pub sources_total: usize,
    pub quotes_ok: usize,
    pub quotes_total: usize,
    pub provenance: Provenance,
    pub published: PublishedPaths,
}

/// Wired stages of the pipeline. Transports are injected so tests can run the
/// whole flow without a network.
pub struct Pipeline {
    aggregator: Aggregator,
    synthesizer: BriefSynthesizer,
    renderer: ReportRenderer,
    sinks: FileSinks,
}

impl Pipeline {
    pub fn new(
        cfg: &BriefConfig,
        documents: Arc<dyn DocumentFetcher>,
        quotes: Arc<dyn QuoteProvider>,
        completion: DynCompletionClient,
    ) -> Self {
        let aggregator = Aggregator::new(cfg.sources.clone(), cfg.instruments.clone(), documents, quotes)
            .with_max_concurrency(cfg.fetch.max_concurrency);
        let synthesizer = BriefSynthesizer::new(completion, Duration::from_secs(cfg.ai.timeout_secs));
        let renderer = ReportRenderer::new(cfg.sources.clone(), cfg.instruments.len());
        let sinks = FileSinks::new(&cfg.output.latest_path, &cfg.output.archive_dir);
        Self {
            aggregator,
            synthesizer,
            renderer,
            sinks,
        }
    }

    /// Production wiring: HTTP fetchers and the configured completion provider.
    pub fn from_config(cfg: &BriefConfig) -> Result<Self> {
        let http = build_http_client(&cfg.fetch)?;
        let documents = Arc::new(HttpDocumentFetcher::with_client(http.clone()));
        let quotes = Arc::new(ChartQuoteProvider::new(http, cfg.quotes_endpoint.clone()));
        let completion = build_client_from_config(&cfg.ai);
        Ok(Self::new(cfg, documents, quotes, completion))
    }

    /// Setup step; errors here abort before any fetch.
    pub fn prepare(&self) -> Result<()> {
        self.sinks.prepare()
    }

    /// Only the final writes can fail; every fetch and the completion call
    /// degrade instead.
    pub async fn run_once(&self) -> Result<RunSummary> {
        tracing::info!(sources = self.aggregator.sources().len(), "📊 fetching dashboard data");
        let snapshot = self.aggregator.aggregate().await;

        tracing::info!("🤖 generating brief");
        let brief = self.synthesizer.synthesize(&snapshot).await;
        tracing::info!(provenance = brief.provenance.as_str(), chars = brief.body.len(), "brief ready");

        let report = self.renderer.render(&brief, snapshot.generated_at);
        let published = self.sinks.publish(&report)?;
        tracing::info!(
            latest = %published.latest.display(),
            archive = %published.archive.display(),
            "📝 report written"
        );

        Ok(RunSummary {
            sources_ok: snapshot.sources_ok(),
            sources_total: snapshot.sources.len(),
            quotes_ok: snapshot.quotes.len(),
            quotes_total: self.aggregator.instruments().len(),
            provenance: brief.provenance,
            published,
        })
    }
}
