// src/report/mod.rs
pub mod markdown;
pub mod page;
pub mod sinks;

use chrono::{DateTime, NaiveDate, Utc};

use crate::brief::Brief;
use crate::config::SourceDescriptor;
use crate::report::page::Stat;

pub const PAGE_TITLE: &str = "Daily Intelligence Brief";

/// The rendered artifact of one run. Written once to each sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub html: String,
    /// Archive body: dated header followed by the raw brief.
    pub archive_markdown: String,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// UTC calendar date; one archive entry per date.
    pub fn archive_date(&self) -> NaiveDate {
        self.generated_at.date_naive()
    }

    pub fn archive_file_name(&self) -> String {
        format!("brief-{}.md", self.archive_date().format("%Y-%m-%d"))
    }
}

/// Pure function of its inputs: same brief and timestamp, same bytes.
pub struct ReportRenderer {
    sources: Vec<SourceDescriptor>,
    instrument_count: usize,
}

impl ReportRenderer {
    pub fn new(sources: Vec<SourceDescriptor>, instrument_count: usize) -> Self {
        Self {
            sources,
            instrument_count,
        }
    }

    /// Summary band; depends on configuration only.
    pub fn stats(&self) -> Vec<Stat> {
        vec![
            Stat::new(self.sources.len().to_string(), "Dashboards"),
            Stat::new(self.instrument_count.to_string(), "Live Instruments"),
            Stat::new("AI", "Synthesis"),
            Stat::new("24h", "Refresh Cycle"),
        ]
    }

    pub fn render(&self, brief: &Brief, generated_at: DateTime<Utc>) -> Report {
        let body = markdown::render_markdown(&brief.body);
        let html = page::page(PAGE_TITLE, &self.sources, &self.stats(), generated_at, &body);
        let date = generated_at.date_naive().format("%Y-%m-%d");
        let archive_markdown = format!("# {PAGE_TITLE} - {date}\n\n{}\n", brief.body.trim_end());
        Report {
            html,
            archive_markdown,
            generated_at,
        }
    }
}
