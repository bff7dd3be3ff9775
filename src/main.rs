//! Daily brief — binary entrypoint.
//! Runs the pipeline once and exits; scheduling lives outside the process.

use anyhow::Context;
use market_brief::{config, metrics::Metrics, Pipeline};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `BRIEF_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("market_brief=info,warn"));
    let json = std::env::var("BRIEF_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact().with_target(false)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let started = chrono::Utc::now();
    tracing::info!(run_time = %started.to_rfc3339(), "🚀 starting daily brief run");

    // --- Setup: any failure here exits non-zero before fetching ---
    let cfg = config::load_default().context("loading configuration")?;
    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            None
        }
    };
    let pipeline = Pipeline::from_config(&cfg)?;
    pipeline.prepare()?;

    // --- Run: only the final writes can fail ---
    let summary = pipeline.run_once().await?;

    if let (Some(m), Some(path)) = (&metrics, &cfg.output.metrics_path) {
        if let Err(e) = m.write_textfile(path) {
            tracing::warn!(error = ?e, "metrics textfile not written");
        }
    }

    tracing::info!(
        sources = format_args!("{}/{}", summary.sources_ok, summary.sources_total),
        quotes = format_args!("{}/{}", summary.quotes_ok, summary.quotes_total),
        brief = summary.provenance.as_str(),
        "✅ run complete"
    );
    if let Some(url) = &cfg.site_url {
        tracing::info!("📍 view the brief at {url}");
    }
    Ok(())
}
