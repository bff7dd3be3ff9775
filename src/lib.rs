// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod brief;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod report;

// ---- Re-exports for stable public API ----
pub use crate::brief::{Brief, BriefSynthesizer, Provenance};
pub use crate::config::{BriefConfig, SourceDescriptor};
pub use crate::ingest::types::{ExtractedFields, QuoteRecord, Snapshot};
pub use crate::ingest::Aggregator;
pub use crate::pipeline::{Pipeline, RunSummary};
pub use crate::report::{Report, ReportRenderer};
