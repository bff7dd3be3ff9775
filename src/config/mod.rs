// src/config/mod.rs
//! Run configuration: dashboards, instruments, endpoints and output locations.
//!
//! Everything has a built-in default matching the production deployment, so a
//! bare `market-brief` invocation works without any file. A TOML or JSON file
//! may override any subset of fields.

pub mod ai;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub use ai::AiConfig;

pub const ENV_CONFIG_PATH: &str = "BRIEF_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/brief.toml";
pub const DEFAULT_JSON_PATH: &str = "config/brief.json";

/// One scraped dashboard. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Unique key; also the key of this source in the snapshot.
    pub key: String,
    pub url: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    /// Where the dashboard's code lives (linked from its card).
    pub repo: String,
}

impl SourceDescriptor {
    pub fn new(key: &str, url: &str, name: &str, icon: &str, description: &str, repo: &str) -> Self {
        Self {
            key: key.to_string(),
            url: url.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            description: description.to_string(),
            repo: repo.to_string(),
        }
    }
}

pub fn default_sources() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor::new(
            "crashDetector",
            "https://kaledh4.github.io/Crash_Detector/",
            "Crash Detector",
            "🚨",
            "Market Risk Analysis",
            "https://github.com/kaledh4/Crash_Detector",
        ),
        SourceDescriptor::new(
            "cryptoAnalytics",
            "https://kaledh4.github.io/hyper-analytical/",
            "Hyper Analytical",
            "₿",
            "Crypto Market Intelligence",
            "https://github.com/kaledh4/hyper-analytical",
        ),
        SourceDescriptor::new(
            "marketIntel",
            "https://kaledh4.github.io/Crypto/",
            "Market Intel",
            "📊",
            "Systematic Risk Analysis",
            "https://github.com/kaledh4/Crypto",
        ),
        SourceDescriptor::new(
            "economicCompass",
            "https://kaledh4.github.io/EconomicCompass/",
            "Economic Compass",
            "🧭",
            "Macro & TASI Markets",
            "https://github.com/kaledh4/EconomicCompass",
        ),
        SourceDescriptor::new(
            "aiRace",
            "https://kaledh4.github.io/AI_RACE_CLEAN/",
            "AI Race",
            "🤖",
            "Scientific Breakthroughs",
            "https://github.com/kaledh4/AI_RACE_CLEAN",
        ),
        SourceDescriptor::new(
            "intelligencePlatform",
            "https://kaledh4.github.io/Intelligence_Platform/",
            "Intelligence Platform",
            "🎯",
            "Unified Strategic Intelligence",
            "https://github.com/kaledh4/Intelligence_Platform",
        ),
    ]
}

pub fn default_instruments() -> Vec<String> {
    ["BTC-USD", "ETH-USD", "^GSPC", "GC=F", "CL=F", "DX-Y.NYB"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_quotes_endpoint() -> String {
    "https://query1.finance.yahoo.com/v8/finance/chart".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Upper bound on in-flight requests against remote hosts.
    pub max_concurrency: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            connect_timeout_secs: 5,
            max_concurrency: 4,
            user_agent: concat!("market-brief/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Overwritten every run.
    pub latest_path: PathBuf,
    /// Holds `brief-YYYY-MM-DD.md`, one per UTC day.
    pub archive_dir: PathBuf,
    /// Prometheus text exposition written after the run, if set.
    pub metrics_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            latest_path: PathBuf::from("index.html"),
            archive_dir: PathBuf::from("briefs"),
            metrics_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BriefConfig {
    pub sources: Vec<SourceDescriptor>,
    pub instruments: Vec<String>,
    /// Base of the chart API; the symbol is appended as a path segment.
    pub quotes_endpoint: String,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    pub ai: AiConfig,
    /// Public URL of the published page, logged after a run.
    pub site_url: Option<String>,
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            instruments: default_instruments(),
            quotes_endpoint: default_quotes_endpoint(),
            fetch: FetchConfig::default(),
            output: OutputConfig::default(),
            ai: AiConfig::default(),
            site_url: None,
        }
    }
}

impl BriefConfig {
    /// Reject configurations the pipeline cannot run with. Duplicate
    /// instruments are dropped (first occurrence wins) rather than rejected.
    pub fn validate(mut self) -> Result<Self> {
        if self.sources.is_empty() && self.instruments.is_empty() {
            bail!("config has neither sources nor instruments");
        }
        let mut keys = HashSet::new();
        for s in &self.sources {
            if s.key.trim().is_empty() {
                bail!("source with url {} has an empty key", s.url);
            }
            if !keys.insert(s.key.as_str()) {
                bail!("duplicate source key: {}", s.key);
            }
        }
        if self.fetch.max_concurrency == 0 {
            bail!("fetch.max_concurrency must be at least 1");
        }

        let mut seen = HashSet::new();
        self.instruments = self
            .instruments
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();

        self.ai.sanitize();
        Ok(self)
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_from(path: &Path) -> Result<BriefConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing config {}", path.display()))?;
    cfg.validate()
}

/// Load config using env var + fallbacks:
/// 1) $BRIEF_CONFIG_PATH
/// 2) config/brief.toml
/// 3) config/brief.json
/// 4) built-in defaults
pub fn load_default() -> Result<BriefConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from(DEFAULT_TOML_PATH);
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let json_p = PathBuf::from(DEFAULT_JSON_PATH);
    if json_p.exists() {
        return load_from(&json_p);
    }
    BriefConfig::default().validate()
}

fn parse_config(s: &str, hint_ext: &str) -> Result<BriefConfig> {
    if hint_ext == "json" {
        return Ok(serde_json::from_str(s)?);
    }
    if hint_ext == "toml" {
        return Ok(toml::from_str(s)?);
    }
    // Unknown extension: JSON first (cheap to reject), then TOML.
    if let Ok(v) = serde_json::from_str(s) {
        return Ok(v);
    }
    toml::from_str(s).map_err(|e| anyhow!("unsupported config format: {e}"))
}
