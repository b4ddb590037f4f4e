//! History writes: single-outcome updates and two-run directory merges.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::config::MonitorConfig;
use crate::history::error::{HistoryError, HistoryResult};
use crate::history::reconcile::merge;
use crate::history::record::{read_sample, HealthRecord, HistorySample, RecordTime};
use crate::history::result_slot::ResultSlot;

/// Applies probe outcomes to per-endpoint history records.
#[derive(Debug, Clone)]
pub struct HistoryWriter {
    history_dir: PathBuf,
    url: String,
    generator: String,
}

impl HistoryWriter {
    pub fn new(
        history_dir: impl Into<PathBuf>,
        url: impl Into<String>,
        generator: impl Into<String>,
    ) -> Self {
        Self {
            history_dir: history_dir.into(),
            url: url.into(),
            generator: generator.into(),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            &config.paths.history_dir,
            &config.endpoint.status_url,
            &config.history.generator,
        )
    }

    pub fn record_path(&self, endpoint_key: &str) -> PathBuf {
        self.history_dir.join(format!("{}.yml", endpoint_key))
    }

    /// Replace the endpoint's record with `outcome`, keeping its start time.
    ///
    /// A prior `startTime` is carried over verbatim, even when it is not
    /// RFC 3339. A missing or unreadable prior record, or one without a
    /// start time, starts the history at `now`; a missing outcome is written
    /// as down. Only the final write can fail.
    pub fn apply_outcome(
        &self,
        endpoint_key: &str,
        outcome: Option<&ResultSlot>,
        now: DateTime<Utc>,
    ) -> HistoryResult<HealthRecord> {
        let path = self.record_path(endpoint_key);
        let slot = outcome.copied().unwrap_or_default();

        let start_time = match read_sample(&path) {
            Ok(Some(prior)) => prior.start_time.unwrap_or_else(|| RecordTime::from(now)),
            Ok(None) => RecordTime::from(now),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read history file");
                RecordTime::from(now)
            }
        };

        let record = HealthRecord {
            url: self.url.clone(),
            status: slot.status,
            code: slot.code,
            response_time: slot.response_time,
            last_updated: now,
            start_time,
            generator: self.generator.clone(),
        };
        record.write(&path)?;

        tracing::info!(
            file = %path.display(),
            status = %record.status,
            response_time = record.response_time,
            "Updated history record"
        );
        Ok(record)
    }
}

/// Per-run tally of a directory merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeCounts {
    /// Records rewritten.
    pub merged: usize,
    /// Records down in both runs.
    pub held_down: usize,
    /// Records down in the first run only.
    pub recovered: usize,
    /// Records that could not be read or written.
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeSummary {
    /// No first-run snapshot exists; nothing was touched.
    Skipped,
    Merged(MergeCounts),
}

/// Merge a first-run snapshot directory into the current history directory.
///
/// Every `*.yml` in `second_dir` is reconciled with its namesake in
/// `first_dir` and rewritten in place. Per-file problems are logged and
/// counted; only failing to list `second_dir` is an error.
pub fn merge_history_dirs(
    first_dir: &Path,
    second_dir: &Path,
    now: DateTime<Utc>,
) -> HistoryResult<MergeSummary> {
    if !first_dir.exists() {
        tracing::info!(dir = %first_dir.display(), "No first-run history found, skipping merge");
        return Ok(MergeSummary::Skipped);
    }

    let mut files: Vec<String> = fs::read_dir(second_dir)
        .map_err(|e| HistoryError::io(second_dir, e))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".yml"))
        .collect();
    files.sort();

    let mut counts = MergeCounts::default();

    for file in &files {
        let second_path = second_dir.join(file);
        let second = match read_sample(&second_path) {
            Ok(Some(sample)) => sample,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable history file");
                counts.failed += 1;
                continue;
            }
        };

        let first = match read_sample(&first_dir.join(file)) {
            Ok(sample) => sample,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable first-run file");
                None
            }
        };

        let first_down = first.as_ref().is_some_and(HistorySample::is_down);
        let second_down = second.is_down();

        let record = merge(first.as_ref(), &second, now);
        if let Err(e) = record.write(&second_path) {
            tracing::error!(error = %e, "Failed to write merged history file");
            counts.failed += 1;
            continue;
        }

        counts.merged += 1;
        match (first_down, second_down) {
            (true, true) => {
                counts.held_down += 1;
                tracing::info!(file = %file, "Merged (down)");
            }
            (true, false) => {
                counts.recovered += 1;
                tracing::info!(file = %file, "Merged (up on retry)");
            }
            _ => tracing::debug!(file = %file, status = %record.status, "Merged"),
        }
    }

    tracing::info!(
        merged = counts.merged,
        held_down = counts.held_down,
        recovered = counts.recovered,
        failed = counts.failed,
        "Merged history files (down only if both runs failed)"
    );
    Ok(MergeSummary::Merged(counts))
}
