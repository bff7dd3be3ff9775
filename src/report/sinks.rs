// src/report/sinks.rs
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::Report;

/// Where a report ends up after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPaths {
    pub latest: PathBuf,
    pub archive: PathBuf,
}

/// Latest-view file (overwritten) plus a dated archive directory. Two runs on
/// the same UTC date overwrite that date's archive entry.
#[derive(Debug, Clone)]
pub struct FileSinks {
    latest_path: PathBuf,
    archive_dir: PathBuf,
}

impl FileSinks {
    pub fn new(latest_path: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            latest_path: latest_path.into(),
            archive_dir: archive_dir.into(),
        }
    }

    /// Create output directories. Called before any fetch so a broken output
    /// location fails the run early.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.archive_dir)
            .with_context(|| format!("creating archive dir {}", self.archive_dir.display()))?;
        if let Some(parent) = self.latest_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
        Ok(())
    }

    pub fn publish(&self, report: &Report) -> Result<PublishedPaths> {
        write_atomic(&self.latest_path, report.html.as_bytes())
            .with_context(|| format!("writing {}", self.latest_path.display()))?;
        let archive = self.archive_dir.join(report.archive_file_name());
        write_atomic(&archive, report.archive_markdown.as_bytes())
            .with_context(|| format!("writing {}", archive.display()))?;
        Ok(PublishedPaths {
            latest: self.latest_path.clone(),
            archive,
        })
    }
}

/// Temp file + rename, so readers never see a half-written page.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let mut f = fs::File::create(&tmp)?;
    f.write_all(bytes)?;
    f.sync_all()?;
    drop(f);
    fs::rename(tmp, path)
}
