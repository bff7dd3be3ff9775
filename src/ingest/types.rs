// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields pulled out of one dashboard page. A field the page did not yield is
/// simply absent; there are no placeholder values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedFields(BTreeMap<String, String>);

impl ExtractedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, value: String) {
        self.0.insert(field.to_string(), value);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub symbol: String,
    /// Rounded to cents.
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

/// One run's merged view of every source and instrument.
///
/// `sources` has an entry for every configured source (`None` = fetch
/// failed); `quotes` only holds instruments that produced a usable quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sources: BTreeMap<String, Option<ExtractedFields>>,
    pub quotes: BTreeMap<String, QuoteRecord>,
    pub generated_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            sources: BTreeMap::new(),
            quotes: BTreeMap::new(),
            generated_at,
        }
    }

    pub fn sources_ok(&self) -> usize {
        self.sources.values().filter(|v| v.is_some()).count()
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Fetches the raw text of a page.
#[async_trait::async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Fetches one instrument's quote.
#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteRecord>;
    fn name(&self) -> &'static str;
}
