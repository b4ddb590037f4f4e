//! History record codec.
//!
//! Records are line-oriented `key: value` pairs. Reading is permissive:
//! only lines shaped like `key: value` count, unknown keys are ignored and
//! unparseable values read as absent. `startTime` is the exception: text
//! that is not RFC 3339 is kept verbatim and written back unchanged. Writing
//! always emits the same seven fields in the same order.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::history::error::{HistoryError, HistoryResult};

/// Endpoint verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "up",
            Status::Down => "down",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Status::Up),
            "down" => Ok(Status::Down),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// Format a timestamp the way the status page writes them.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// A `startTime` value. Parsed when it is RFC 3339, otherwise the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordTime {
    Parsed(DateTime<Utc>),
    Raw(String),
}

impl RecordTime {
    pub fn parse(raw: &str) -> Self {
        match parse_timestamp(raw) {
            Some(ts) => RecordTime::Parsed(ts),
            None => RecordTime::Raw(raw.to_string()),
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            RecordTime::Parsed(ts) => Some(*ts),
            RecordTime::Raw(_) => None,
        }
    }
}

impl From<DateTime<Utc>> for RecordTime {
    fn from(ts: DateTime<Utc>) -> Self {
        RecordTime::Parsed(ts)
    }
}

impl PartialEq<DateTime<Utc>> for RecordTime {
    fn eq(&self, other: &DateTime<Utc>) -> bool {
        self.as_datetime().as_ref() == Some(other)
    }
}

impl fmt::Display for RecordTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordTime::Parsed(ts) => f.write_str(&format_timestamp(ts)),
            RecordTime::Raw(raw) => f.write_str(raw),
        }
    }
}

/// Canonical per-endpoint history record, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthRecord {
    pub url: String,
    pub status: Status,
    pub code: u32,
    pub response_time: u64,
    pub last_updated: DateTime<Utc>,
    pub start_time: RecordTime,
    pub generator: String,
}

impl HealthRecord {
    /// Serialize in the fixed seven-field order.
    pub fn to_text(&self) -> String {
        format!(
            "url: {}\nstatus: {}\ncode: {}\nresponseTime: {}\nlastUpdated: {}\nstartTime: {}\ngenerator: {}\n",
            self.url,
            self.status,
            self.code,
            self.response_time,
            format_timestamp(&self.last_updated),
            self.start_time,
            self.generator,
        )
    }

    /// Replace the record at `path` in one step (write to a sibling, then rename).
    pub fn write(&self, path: &Path) -> HistoryResult<()> {
        write_replacing(path, &self.to_text())
    }
}

/// A history record as read back from disk. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySample {
    pub url: Option<String>,
    pub status: Option<Status>,
    pub code: Option<u32>,
    pub response_time: Option<u64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub start_time: Option<RecordTime>,
    pub generator: Option<String>,
}

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\w+):\s*(.*)$").expect("static pattern"))
}

impl HistorySample {
    /// Parse record text. Never fails.
    pub fn parse(text: &str) -> Self {
        let mut fields: HashMap<&str, &str> = HashMap::new();
        for line in text.lines() {
            if let Some(caps) = line_pattern().captures(line) {
                if let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) {
                    fields.insert(key.as_str(), value.as_str().trim());
                }
            }
        }

        let get = |key: &str| fields.get(key).copied().filter(|v| !v.is_empty());

        Self {
            url: get("url").map(str::to_string),
            status: get("status").and_then(|v| v.parse().ok()),
            code: get("code").and_then(|v| v.parse().ok()),
            response_time: get("responseTime").and_then(|v| v.parse().ok()),
            last_updated: get("lastUpdated").and_then(parse_timestamp),
            start_time: get("startTime").map(RecordTime::parse),
            generator: get("generator").map(str::to_string),
        }
    }

    pub fn is_down(&self) -> bool {
        self.status == Some(Status::Down)
    }

    pub fn is_up(&self) -> bool {
        self.status == Some(Status::Up)
    }
}

impl From<&HealthRecord> for HistorySample {
    fn from(record: &HealthRecord) -> Self {
        Self {
            url: Some(record.url.clone()),
            status: Some(record.status),
            code: Some(record.code),
            response_time: Some(record.response_time),
            last_updated: Some(record.last_updated),
            start_time: Some(record.start_time.clone()),
            generator: Some(record.generator.clone()),
        }
    }
}

/// Read a record. A missing file is `Ok(None)`.
pub fn read_sample(path: &Path) -> HistoryResult<Option<HistorySample>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(HistorySample::parse(&text))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(HistoryError::io(path, e)),
    }
}

pub(crate) fn write_replacing(path: &Path, contents: &str) -> HistoryResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| HistoryError::io(parent, e))?;
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = Path::new(&staging);

    fs::write(staging, contents).map_err(|e| HistoryError::io(staging, e))?;
    fs::rename(staging, path).map_err(|e| {
        let _ = fs::remove_file(staging);
        HistoryError::io(path, e)
    })
}
