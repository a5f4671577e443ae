//! JSON run report

use crate::error::Result;
use crate::process::{BatchSummary, FileResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a run produced, as written by `--report`
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub root: &'a Path,
    pub recursive: bool,
    pub dry_run: bool,
    pub summary: BatchSummary,
    pub results: &'a [FileResult],
}

impl<'a> RunReport<'a> {
    pub fn new(root: &'a Path, recursive: bool, dry_run: bool, results: &'a [FileResult]) -> Self {
        Self {
            generated_at: Utc::now(),
            root,
            recursive,
            dry_run,
            summary: BatchSummary::from_results(results),
            results,
        }
    }

    /// Write the report as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;

        info!(path = %path.display(), files = self.results.len(), "Saved run report");
        Ok(path.to_path_buf())
    }
}
