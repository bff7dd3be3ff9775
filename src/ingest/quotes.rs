// src/ingest/quotes.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::types::{QuoteProvider, QuoteRecord};

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}
#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}
#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
}

/// Percent change against the previous close. A zero or missing previous
/// close divides by 1 instead, which yields an inflated figure rather than a
/// division error.
pub fn percent_change(current: f64, previous_close: Option<f64>) -> f64 {
    let prev = previous_close.unwrap_or(0.0);
    let divisor = if prev == 0.0 { 1.0 } else { prev };
    (current - prev) / divisor * 100.0
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Turn a chart API body into a quote. Any shape deviation is an error.
pub fn parse_chart(symbol: &str, body: &str) -> Result<QuoteRecord> {
    let env: ChartEnvelope = serde_json::from_str(body).context("parsing chart json")?;
    let meta = env
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .map(|r| r.meta)
        .ok_or_else(|| anyhow!("no chart result for {symbol}"))?;
    let price = meta
        .regular_market_price
        .filter(|p| p.is_finite())
        .ok_or_else(|| anyhow!("missing regularMarketPrice for {symbol}"))?;
    let prev = meta.previous_close.filter(|p| p.is_finite());

    Ok(QuoteRecord {
        symbol: symbol.to_string(),
        price: round2(price),
        change: price - prev.unwrap_or(0.0),
        change_percent: percent_change(price, prev),
    })
}

/// Quotes from the Yahoo-style chart endpoint: `<base>/<symbol>?interval=1d&range=1d`.
pub struct ChartQuoteProvider {
    client: reqwest::Client,
    base_url: String,
}

impl ChartQuoteProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn symbol_url(&self, symbol: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("quotes endpoint {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("quotes endpoint cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("interval", "1d")
            .append_pair("range", "1d");
        Ok(url)
    }
}

#[async_trait]
impl QuoteProvider for ChartQuoteProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteRecord> {
        let url = self.symbol_url(symbol)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("quote request for {symbol}"))?
            .error_for_status()
            .with_context(|| format!("quote status for {symbol}"))?;
        let body = resp.text().await.context("quote body")?;
        parse_chart(symbol, &body)
    }

    fn name(&self) -> &'static str {
        "chart"
    }
}

/// Fetch every symbol independently, at most `limit` in flight. Symbols that
/// fail are left out of the map.
pub async fn fetch_quotes(
    provider: Arc<dyn QuoteProvider>,
    instruments: &[String],
    limit: usize,
) -> BTreeMap<String, QuoteRecord> {
    let sem = Arc::new(Semaphore::new(limit.max(1)));
    let mut set = JoinSet::new();

    for symbol in instruments {
        let sem = Arc::clone(&sem);
        let provider = Arc::clone(&provider);
        let symbol = symbol.clone();
        set.spawn(async move {
            let _permit = sem.acquire_owned().await.ok()?;
            let t0 = std::time::Instant::now();
            let res = provider.fetch_quote(&symbol).await;
            histogram!("brief_fetch_ms", "kind" => "quote").record(t0.elapsed().as_secs_f64() * 1_000.0);
            match res {
                Ok(q) => {
                    counter!("brief_quote_fetch_total", "outcome" => "ok").increment(1);
                    Some((symbol, q))
                }
                Err(e) => {
                    counter!("brief_quote_fetch_total", "outcome" => "error").increment(1);
                    tracing::warn!(error = ?e, symbol = %symbol, provider = provider.name(), "quote unavailable");
                    None
                }
            }
        });
    }

    let mut out = BTreeMap::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Some((symbol, q))) => {
                out.insert(symbol, q);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = ?e, "quote task aborted"),
        }
    }
    out
}
