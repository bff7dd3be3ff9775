use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;

use crate::report::sinks::write_atomic;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Without it the `metrics` macros are no-ops.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        Ok(Self { handle })
    }

    /// Exposition text for a node-exporter textfile collector.
    pub fn write_textfile(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        write_atomic(path, self.handle.render().as_bytes())
            .with_context(|| format!("writing metrics to {}", path.display()))
    }
}
