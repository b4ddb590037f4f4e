//! Retry coordination for probe attempts.
//!
//! # Responsibilities
//! - Run attempts sequentially up to a fixed budget
//! - Wait a fixed delay after each failed attempt before the next
//! - Return the first success, or the last failure once the budget is spent
//!
//! # Design Decisions
//! - Fixed delay, no backoff: one probe per scheduled run, the budget is small
//! - Earlier failures are logged, never returned
//! - A zero budget still runs one attempt; validation rejects it earlier

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::config::RetryConfig;
use crate::probe::ProbeOutcome;

/// Attempt budget and inter-attempt delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_millis(config.delay_ms),
        }
    }
}

/// Final outcome of a retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryReport {
    pub outcome: ProbeOutcome,
    /// Number of attempts actually made.
    pub attempts: u32,
}

/// Run `attempt` until it passes or the budget is exhausted.
///
/// `attempt` receives the 1-based attempt number.
pub async fn run_with_retries<F, Fut>(policy: &RetryPolicy, mut attempt: F) -> RetryReport
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ProbeOutcome>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut number = 1;

    loop {
        tracing::info!(attempt = number, max_attempts, "Starting probe attempt");
        let outcome = attempt(number).await;

        if outcome.passed {
            tracing::info!(
                attempt = number,
                response_time_ms = outcome.response_time_ms,
                message = %outcome.message,
                "Probe attempt passed"
            );
            return RetryReport { outcome, attempts: number };
        }

        if number >= max_attempts {
            tracing::error!(
                attempts = number,
                error = %outcome.message,
                "Probe failed after all attempts"
            );
            return RetryReport { outcome, attempts: number };
        }

        tracing::warn!(
            attempt = number,
            error = %outcome.message,
            retry_in_ms = policy.delay.as_millis() as u64,
            "Probe attempt failed, retrying"
        );
        sleep(policy.delay).await;
        number += 1;
    }
}
