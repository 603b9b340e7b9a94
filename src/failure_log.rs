//! Persistent record of unrecoverable extraction failures
//!
//! A side channel, not part of any return contract: when every repair avenue
//! inside the extractor is exhausted, the orchestrator appends one structured
//! record here so users can review what failed and why after the fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::BeatmapsetId;

/// One failure record, serialized as a single JSON line
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailureRecord {
    /// When the failure was recorded
    pub timestamp: DateTime<Utc>,
    /// The beatmapset that failed
    pub beatmapset_id: BeatmapsetId,
    /// The source whose archive was being extracted
    pub source: String,
    /// Top-level error message
    pub message: String,
    /// Full error chain, outermost first
    pub chain: Vec<String>,
}

/// Append-only JSON-lines failure log
#[derive(Clone, Debug)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    /// Create a log writing to `path`; the file is created on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build and append a record for a failed extraction
    pub fn record_failure(
        &self,
        beatmapset_id: BeatmapsetId,
        source: &str,
        error: &Error,
    ) -> Result<()> {
        let record = FailureRecord {
            timestamp: Utc::now(),
            beatmapset_id,
            source: source.to_string(),
            message: error.to_string(),
            chain: error_chain(error),
        };
        self.append(&record)
    }

    /// Append one record as a JSON line
    pub fn append(&self, record: &FailureRecord) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}")?;

        debug!(path = ?self.path, beatmapset_id = record.beatmapset_id.0, "appended failure record");
        Ok(())
    }
}

/// Collect an error's message chain, outermost first
fn error_chain(error: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut current = error.source();
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    chain
}
