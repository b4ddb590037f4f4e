//! Transient result slot handed from the probe step to the history step.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::history::error::{HistoryError, HistoryResult};
use crate::history::record::{write_replacing, Status};
use crate::probe::ProbeOutcome;

/// Code recorded for a passing probe, as the status page expects.
pub const PASS_CODE: u32 = 200;

/// `{"status": "up", "responseTime": 123, "code": 200}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSlot {
    pub status: Status,
    pub response_time: u64,
    pub code: u32,
}

impl Default for ResultSlot {
    /// Conservative outcome used when no probe result is available.
    fn default() -> Self {
        Self {
            status: Status::Down,
            response_time: 0,
            code: 0,
        }
    }
}

impl ResultSlot {
    pub fn from_outcome(outcome: &ProbeOutcome) -> Self {
        if outcome.passed {
            Self {
                status: Status::Up,
                response_time: outcome.response_time_ms,
                code: PASS_CODE,
            }
        } else {
            Self {
                status: Status::Down,
                response_time: outcome.response_time_ms,
                code: u32::from(outcome.terminal_code),
            }
        }
    }

    pub fn write(&self, path: &Path) -> HistoryResult<()> {
        let json = serde_json::to_string(self).map_err(|source| HistoryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        write_replacing(path, &json)
    }

    /// Strict read: missing file is `Ok(None)`, malformed content is an error.
    pub fn try_read(path: &Path) -> HistoryResult<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(HistoryError::io(path, e)),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| HistoryError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Lenient read: anything unreadable is logged and treated as absent.
    pub fn read(path: &Path) -> Option<Self> {
        match Self::try_read(path) {
            Ok(Some(slot)) => Some(slot),
            Ok(None) => {
                tracing::info!(path = %path.display(), "No result file, assuming no outcome");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read result file");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeError;
    use std::time::Duration;

    #[test]
    fn test_from_outcome() {
        let pass = ProbeOutcome::success("ok", Duration::from_millis(88));
        assert_eq!(
            ResultSlot::from_outcome(&pass),
            ResultSlot { status: Status::Up, response_time: 88, code: 200 }
        );

        let closed = ProbeError::PrematureClose { code: 1011, reason: String::new() };
        let fail = ProbeOutcome::failure(&closed, Duration::from_millis(5));
        assert_eq!(
            ResultSlot::from_outcome(&fail),
            ResultSlot { status: Status::Down, response_time: 5, code: 1011 }
        );
    }

    #[test]
    fn test_wire_format() {
        let slot = ResultSlot { status: Status::Up, response_time: 12, code: 200 };
        let json = serde_json::to_value(slot).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "up", "responseTime": 12, "code": 200 }));
    }

    #[test]
    fn test_read_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("websocket-result.json");
        assert_eq!(ResultSlot::read(&path), None);

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(ResultSlot::try_read(&path), Err(HistoryError::Parse { .. })));
        assert_eq!(ResultSlot::read(&path), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("websocket-result.json");
        let slot = ResultSlot { status: Status::Down, response_time: 15_000, code: 0 };
        slot.write(&path).unwrap();
        assert_eq!(ResultSlot::read(&path), Some(slot));
    }
}
