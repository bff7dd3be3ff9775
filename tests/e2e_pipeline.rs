// tests/e2e_pipeline.rs
//! Whole-run scenarios: three dashboards (ok / 404 / timeout), two
//! instruments (ok / malformed) and a failing completion service.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use market_brief::brief::ai_adapter::MockProvider;
use market_brief::config::{BriefConfig, FetchConfig, OutputConfig, SourceDescriptor};
use market_brief::ingest::types::{DocumentFetcher, QuoteProvider};
use market_brief::ingest::Aggregator;
use market_brief::{Pipeline, Provenance, QuoteRecord};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn source(key: &str, url: String) -> SourceDescriptor {
    SourceDescriptor::new(key, &url, key, "•", "test dashboard", "https://example.org/repo")
}

#[serial_test::serial]
#[tokio::test]
async fn degraded_run_still_publishes_report() {
    std::env::remove_var("AI_TEST_MODE");
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/one/");
            then.status(200)
                .body("<html><body><h2>Fear & Greed: 42</h2></body></html>");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/two/");
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/three/");
            then.status(200).body("Fear: 99").delay(Duration::from_secs(3));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/chart/BTC-USD");
            then.status(200).json_body(json!({
                "chart": { "result": [ { "meta": { "regularMarketPrice": 50000.00, "previousClose": 49000.00 } } ] }
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/chart/ETH-USD");
            then.status(200).body("{\"chart\": ");
        })
        .await;
    let ai = server
        .mock_async(|when, then| {
            when.method(POST).path("/ai");
            then.status(500);
        })
        .await;

    let out = tempfile::tempdir().unwrap();
    let mut cfg = BriefConfig {
        sources: vec![
            source("one", server.url("/one/")),
            source("two", server.url("/two/")),
            source("three", server.url("/three/")),
        ],
        instruments: vec!["BTC-USD".into(), "ETH-USD".into()],
        quotes_endpoint: server.url("/chart"),
        fetch: FetchConfig {
            timeout_secs: 1,
            connect_timeout_secs: 1,
            ..FetchConfig::default()
        },
        output: OutputConfig {
            latest_path: out.path().join("index.html"),
            archive_dir: out.path().join("briefs"),
            metrics_path: None,
        },
        ..BriefConfig::default()
    };
    cfg.ai.endpoint = server.url("/ai");
    cfg.ai.api_key = "test-key".into();
    let cfg = cfg.validate().unwrap();

    let pipeline = Pipeline::from_config(&cfg).unwrap();
    pipeline.prepare().unwrap();
    let summary = pipeline.run_once().await.expect("run must succeed despite failures");

    assert_eq!((summary.sources_ok, summary.sources_total), (1, 3));
    assert_eq!((summary.quotes_ok, summary.quotes_total), (1, 2));
    assert_eq!(summary.provenance, Provenance::Fallback);
    ai.assert_async().await;

    let html = std::fs::read_to_string(&summary.published.latest).unwrap();
    assert!(html.contains("AI analysis temporarily unavailable"));
    assert!(html.contains("&quot;fear_greed&quot;: &quot;42&quot;") || html.contains("\"fear_greed\": \"42\""));
    assert!(html.contains("\"three\": null"));

    let archive = std::fs::read_to_string(&summary.published.archive).unwrap();
    assert!(archive.starts_with("# Daily Intelligence Brief - "));
    assert!(archive.contains("\"BTC-USD\""));
    assert!(!archive.contains("\"ETH-USD\""));
}

// ---- in-process fakes: same scenario without sockets ----

struct FakeDocs;

#[async_trait]
impl DocumentFetcher for FakeDocs {
    async fn fetch(&self, url: &str) -> Result<String> {
        match url {
            "fake://one" => Ok("<p>Fear &amp; Greed: 42</p>".into()),
            "fake://two" => Err(anyhow!("HTTP status client error (404 Not Found)")),
            _ => Err(anyhow!("operation timed out")),
        }
    }
    fn name(&self) -> &'static str {
        "fake"
    }
}

struct FakeQuotes;

#[async_trait]
impl QuoteProvider for FakeQuotes {
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteRecord> {
        match symbol {
            "BTC-USD" => market_brief::ingest::quotes::parse_chart(
                symbol,
                r#"{"chart":{"result":[{"meta":{"regularMarketPrice":50000.0,"previousClose":49000.0}}]}}"#,
            ),
            _ => market_brief::ingest::quotes::parse_chart(symbol, "malformed"),
        }
    }
    fn name(&self) -> &'static str {
        "fake"
    }
}

fn fake_aggregator(limit: usize) -> Aggregator {
    Aggregator::new(
        vec![
            source("one", "fake://one".into()),
            source("two", "fake://two".into()),
            source("three", "fake://three".into()),
        ],
        vec!["BTC-USD".into(), "ETH-USD".into()],
        Arc::new(FakeDocs),
        Arc::new(FakeQuotes),
    )
    .with_max_concurrency(limit)
}

#[tokio::test]
async fn snapshot_matches_expected_partial_data() {
    let ts = Utc.with_ymd_and_hms(2025, 6, 2, 6, 0, 0).unwrap();
    let snap = fake_aggregator(4).aggregate_at(ts).await;

    assert_eq!(snap.sources.len(), 3);
    let one = snap.sources["one"].as_ref().expect("source one fetched");
    assert_eq!(one.get("fear_greed"), Some("42"));
    assert!(snap.sources["two"].is_none());
    assert!(snap.sources["three"].is_none());

    assert_eq!(snap.quotes.len(), 1);
    let btc = &snap.quotes["BTC-USD"];
    assert_eq!(format!("{:.2}", btc.change_percent), "2.04");
    assert_eq!(snap.generated_at, ts);
}

#[tokio::test]
async fn sequential_and_concurrent_runs_agree() {
    let ts = Utc.with_ymd_and_hms(2025, 6, 2, 6, 0, 0).unwrap();
    let sequential = fake_aggregator(1).aggregate_at(ts).await;
    let concurrent = fake_aggregator(8).aggregate_at(ts).await;
    assert_eq!(sequential, concurrent);
}

#[tokio::test]
async fn generated_brief_flows_into_archive() {
    let out = tempfile::tempdir().unwrap();
    let cfg = BriefConfig {
        sources: vec![source("one", "fake://one".into())],
        instruments: vec!["BTC-USD".into()],
        output: OutputConfig {
            latest_path: out.path().join("site/index.html"),
            archive_dir: out.path().join("briefs"),
            metrics_path: None,
        },
        ..BriefConfig::default()
    };
    let pipeline = Pipeline::new(
        &cfg,
        Arc::new(FakeDocs),
        Arc::new(FakeQuotes),
        Arc::new(MockProvider {
            fixed: "# 📊 Executive Summary\n\n- **Buy** dips".into(),
        }),
    );
    pipeline.prepare().unwrap();
    let summary = pipeline.run_once().await.unwrap();

    assert_eq!(summary.provenance, Provenance::Generated);
    let html = std::fs::read_to_string(&summary.published.latest).unwrap();
    assert!(html.contains("<li><strong>Buy</strong> dips</li>"));
    let archive = std::fs::read_to_string(&summary.published.archive).unwrap();
    assert!(archive.ends_with("# 📊 Executive Summary\n\n- **Buy** dips\n"));
}

#[tokio::test]
async fn unwritable_archive_dir_fails_setup() {
    let out = tempfile::tempdir().unwrap();
    let blocker = out.path().join("briefs");
    std::fs::write(&blocker, "file, not dir").unwrap();
    let cfg = BriefConfig {
        output: OutputConfig {
            latest_path: out.path().join("index.html"),
            archive_dir: blocker,
            metrics_path: None,
        },
        ..BriefConfig::default()
    };
    let pipeline = Pipeline::new(
        &cfg,
        Arc::new(FakeDocs),
        Arc::new(FakeQuotes),
        Arc::new(MockProvider { fixed: "x".into() }),
    );
    assert!(pipeline.prepare().is_err());
}
