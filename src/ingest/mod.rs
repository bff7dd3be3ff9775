// src/ingest/mod.rs
pub mod extract;
pub mod fetch;
pub mod quotes;
pub mod types;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::SourceDescriptor;
use crate::ingest::types::{DocumentFetcher, ExtractedFields, QuoteProvider, QuoteRecord, Snapshot};

/// One-time metrics registration (so series show up in the exposition).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "brief_source_fetch_total",
            "Dashboard fetch attempts by outcome."
        );
        describe_counter!(
            "brief_quote_fetch_total",
            "Quote fetch attempts by outcome."
        );
        describe_histogram!("brief_fetch_ms", "External fetch latency in milliseconds.");
    });
}

/// Merge per-source and per-instrument outcomes into a snapshot. Pure and
/// order-independent: every source key gets a slot, failed quotes get none.
pub fn merge_snapshot(
    sources: impl IntoIterator<Item = (String, Option<ExtractedFields>)>,
    quotes: impl IntoIterator<Item = (String, Option<QuoteRecord>)>,
    generated_at: DateTime<Utc>,
) -> Snapshot {
    Snapshot {
        sources: sources.into_iter().collect(),
        quotes: quotes
            .into_iter()
            .filter_map(|(k, q)| q.map(|q| (k, q)))
            .collect(),
        generated_at,
    }
}

/// Runs the extractor over every source and the quote fetcher over the
/// instrument set. Built from injected configuration so tests can swap in
/// fixtures for both the lists and the transports.
pub struct Aggregator {
    sources: Vec<SourceDescriptor>,
    instruments: Vec<String>,
    documents: Arc<dyn DocumentFetcher>,
    quotes: Arc<dyn QuoteProvider>,
    max_concurrency: usize,
}

impl Aggregator {
    pub fn new(
        sources: Vec<SourceDescriptor>,
        instruments: Vec<String>,
        documents: Arc<dyn DocumentFetcher>,
        quotes: Arc<dyn QuoteProvider>,
    ) -> Self {
        Self {
            sources,
            instruments,
            documents,
            quotes,
            max_concurrency: 4,
        }
    }

    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    pub fn sources(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub async fn aggregate(&self) -> Snapshot {
        self.aggregate_at(Utc::now()).await
    }

    /// Same as [`aggregate`](Self::aggregate) with an explicit timestamp.
    pub async fn aggregate_at(&self, generated_at: DateTime<Utc>) -> Snapshot {
        ensure_metrics_described();

        let (sources, quotes) = tokio::join!(
            self.collect_sources(),
            quotes::fetch_quotes(
                Arc::clone(&self.quotes),
                &self.instruments,
                self.max_concurrency
            )
        );

        let snapshot = merge_snapshot(
            sources,
            quotes.into_iter().map(|(k, q)| (k, Some(q))),
            generated_at,
        );
        tracing::info!(
            sources_ok = snapshot.sources_ok(),
            sources_total = snapshot.sources.len(),
            quotes_ok = snapshot.quotes.len(),
            quotes_total = self.instruments.len(),
            "snapshot assembled"
        );
        snapshot
    }

    async fn collect_sources(&self) -> BTreeMap<String, Option<ExtractedFields>> {
        let sem = Arc::new(Semaphore::new(self.max_concurrency));
        let mut set = JoinSet::new();

        for source in &self.sources {
            let sem = Arc::clone(&sem);
            let fetcher = Arc::clone(&self.documents);
            let source = source.clone();
            set.spawn(async move {
                // A closed semaphore only happens on shutdown; treat as a failed fetch.
                let fields = match sem.acquire_owned().await {
                    Ok(_permit) => {
                        let t0 = std::time::Instant::now();
                        let doc = fetch::fetch_document(fetcher.as_ref(), &source.url).await;
                        histogram!("brief_fetch_ms", "kind" => "document")
                            .record(t0.elapsed().as_secs_f64() * 1_000.0);
                        doc.map(|d| extract::extract(&d))
                    }
                    Err(_) => None,
                };
                match &fields {
                    Some(f) => {
                        counter!("brief_source_fetch_total", "outcome" => "ok").increment(1);
                        tracing::info!(source = %source.key, fields = f.len(), "✓ {}", source.name);
                    }
                    None => {
                        counter!("brief_source_fetch_total", "outcome" => "error").increment(1);
                        tracing::warn!(source = %source.key, "✗ {}", source.name);
                    }
                }
                (source.key, fields)
            });
        }

        let mut out: BTreeMap<String, Option<ExtractedFields>> = self
            .sources
            .iter()
            .map(|s| (s.key.clone(), None))
            .collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((key, fields)) => {
                    out.insert(key, fields);
                }
                Err(e) => tracing::warn!(error = ?e, "source task aborted"),
            }
        }
        out
    }
}
