//! Two-run reconciliation.
//!
//! An endpoint is reported down only when two independent, time-separated
//! runs both saw it down. A single failed run is treated as a blip.
//!
//! # Field fallback order
//! ```text
//! status        down iff first.down && second.down, else up
//! code          down: second → 0      up: up-sample → 200
//! responseTime  down: second → 0      up: up-sample → 0
//! lastUpdated   down: second → now    up: up-sample → now
//! startTime     second → first → lastUpdated (computed above), text kept as read
//! url           second → first → ""
//! generator     second → DEFAULT_GENERATOR
//!
//! up-sample     first if second is down and first is up, else second
//! ```

use chrono::{DateTime, Utc};

use crate::history::record::{HealthRecord, HistorySample, RecordTime, Status};
use crate::history::DEFAULT_GENERATOR;

/// Merge the first and second run for one endpoint. Pure.
pub fn merge(
    first_run: Option<&HistorySample>,
    second_run: &HistorySample,
    now: DateTime<Utc>,
) -> HealthRecord {
    let first_down = first_run.is_some_and(HistorySample::is_down);
    let second_down = second_run.is_down();

    let (status, code, response_time, last_updated) = if first_down && second_down {
        (
            Status::Down,
            second_run.code.unwrap_or(0),
            second_run.response_time.unwrap_or(0),
            second_run.last_updated.unwrap_or(now),
        )
    } else {
        // When the second run is down but the first was up, the first run's
        // figures (latency, timestamp) are reported as-is. A second run with an
        // unrecognised status keeps its own figures, even if the first was up.
        let up_run = match first_run {
            Some(first) if second_down && first.is_up() => first,
            _ => second_run,
        };
        (
            Status::Up,
            up_run.code.unwrap_or(200),
            up_run.response_time.unwrap_or(0),
            up_run.last_updated.unwrap_or(now),
        )
    };

    let start_time = second_run
        .start_time
        .clone()
        .or_else(|| first_run.and_then(|f| f.start_time.clone()))
        .unwrap_or_else(|| RecordTime::from(last_updated));

    let url = second_run
        .url
        .clone()
        .or_else(|| first_run.and_then(|f| f.url.clone()))
        .unwrap_or_default();

    let generator = second_run
        .generator
        .clone()
        .unwrap_or_else(|| DEFAULT_GENERATOR.to_string());

    HealthRecord {
        url,
        status,
        code,
        response_time,
        last_updated,
        start_time,
        generator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    fn sample(status: Status, code: u32, response_time: u64, updated: u32) -> HistorySample {
        HistorySample {
            url: Some("https://ws.prixe.io/ws".into()),
            status: Some(status),
            code: Some(code),
            response_time: Some(response_time),
            last_updated: Some(ts(updated)),
            start_time: Some(ts(0).into()),
            generator: Some("gen".into()),
        }
    }

    #[test]
    fn test_both_down_is_down() {
        let first = sample(Status::Down, 0, 0, 1);
        let second = sample(Status::Down, 1011, 15_000, 2);
        let merged = merge(Some(&first), &second, ts(3));
        assert_eq!(merged.status, Status::Down);
        assert_eq!(merged.code, 1011);
        assert_eq!(merged.response_time, 15_000);
        assert_eq!(merged.last_updated, ts(2));
    }

    #[test]
    fn test_single_down_is_up() {
        let up = sample(Status::Up, 200, 300, 1);
        let down = sample(Status::Down, 0, 0, 2);

        assert_eq!(merge(Some(&up), &down, ts(3)).status, Status::Up);
        assert_eq!(merge(Some(&down), &up, ts(3)).status, Status::Up);
        assert_eq!(merge(None, &down, ts(3)).status, Status::Up);
    }

    #[test]
    fn test_recovery_on_retry_reports_second_run() {
        let mut first = sample(Status::Down, 0, 0, 1);
        first.start_time = Some(ts(0).into());
        let mut second = sample(Status::Up, 200, 250, 2);
        second.start_time = Some(ts(1).into());

        let merged = merge(Some(&first), &second, ts(3));
        assert_eq!(merged.status, Status::Up);
        assert_eq!(merged.code, 200);
        assert_eq!(merged.response_time, 250);
        assert_eq!(merged.start_time, ts(1));

        second.start_time = None;
        assert_eq!(merge(Some(&first), &second, ts(3)).start_time, ts(0));
    }

    #[test]
    fn test_second_down_first_up_reuses_first_figures() {
        let first = sample(Status::Up, 200, 410, 1);
        let second = sample(Status::Down, 0, 15_000, 2);
        let merged = merge(Some(&first), &second, ts(3));
        assert_eq!(merged.status, Status::Up);
        assert_eq!(merged.code, 200);
        assert_eq!(merged.response_time, 410);
        assert_eq!(merged.last_updated, ts(1));
    }

    #[test]
    fn test_absent_first_with_down_second_keeps_second_figures() {
        let second = sample(Status::Down, 0, 15_000, 2);
        let merged = merge(None, &second, ts(3));
        assert_eq!(merged.status, Status::Up);
        assert_eq!(merged.code, 0);
        assert_eq!(merged.response_time, 15_000);
    }

    #[test]
    fn test_defaults_for_empty_samples() {
        let empty = HistorySample::default();
        let merged = merge(None, &empty, ts(4));
        assert_eq!(merged.status, Status::Up);
        assert_eq!(merged.code, 200);
        assert_eq!(merged.response_time, 0);
        assert_eq!(merged.last_updated, ts(4));
        assert_eq!(merged.start_time, ts(4));
        assert_eq!(merged.url, "");
        assert_eq!(merged.generator, DEFAULT_GENERATOR);

        let down = HistorySample { status: Some(Status::Down), ..HistorySample::default() };
        let merged = merge(Some(&down), &down, ts(4));
        assert_eq!(merged.status, Status::Down);
        assert_eq!(merged.code, 0);
        assert_eq!(merged.start_time, ts(4));
    }

    #[test]
    fn test_url_falls_back_to_first_run() {
        let first = sample(Status::Up, 200, 1, 1);
        let second = HistorySample { status: Some(Status::Up), ..HistorySample::default() };
        assert_eq!(merge(Some(&first), &second, ts(2)).url, "https://ws.prixe.io/ws");
    }

    #[test]
    fn test_start_time_survives_repeated_merges() {
        let t0 = ts(0);
        let mut current = HistorySample {
            start_time: Some(t0.into()),
            ..sample(Status::Up, 200, 100, 1)
        };

        for (i, status) in [Status::Down, Status::Down, Status::Up, Status::Down, Status::Up]
            .into_iter()
            .enumerate()
        {
            let mut next = sample(status, 0, 10, 2 + i as u32);
            next.start_time = current.start_time.clone();
            let merged = merge(Some(&current), &next, ts(10));
            assert_eq!(merged.start_time, t0);
            current = HistorySample::from(&merged);
        }
    }

    #[test]
    fn test_unrecognised_second_status_keeps_second_figures() {
        let first = sample(Status::Up, 200, 410, 1);
        let second = HistorySample {
            status: None,
            ..sample(Status::Up, 503, 900, 2)
        };
        let merged = merge(Some(&first), &second, ts(3));
        assert_eq!(merged.status, Status::Up);
        assert_eq!(merged.code, 503);
        assert_eq!(merged.response_time, 900);
    }

    #[test]
    fn test_raw_start_time_passes_through() {
        let raw = RecordTime::Raw("2021-03-04T05:06:07".into());
        let first = HistorySample {
            start_time: Some(raw.clone()),
            ..sample(Status::Down, 0, 0, 1)
        };
        let mut second = HistorySample {
            start_time: Some(raw.clone()),
            ..sample(Status::Down, 0, 0, 2)
        };
        assert_eq!(merge(Some(&first), &second, ts(3)).start_time, raw);

        second.start_time = None;
        assert_eq!(merge(Some(&first), &second, ts(3)).start_time, raw);
    }
}
