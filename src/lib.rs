//! Streaming endpoint uptime monitor library.

pub mod config;
pub mod history;
pub mod observability;
pub mod probe;
pub mod resilience;

pub use config::MonitorConfig;
pub use history::{HealthRecord, HistoryWriter, ResultSlot};
pub use probe::{ProbeOutcome, ProbeSession};
pub use resilience::{run_with_retries, RetryPolicy};

use crate::config::validation::ValidationError;
use crate::probe::Connector;
use crate::resilience::RetryReport;

/// Run the full retry cycle against the configured endpoint.
pub async fn run_health_check<C: Connector>(
    connector: &C,
    config: &MonitorConfig,
) -> Result<RetryReport, ValidationError> {
    let url = config.endpoint.connect_url()?;
    let session = ProbeSession::new(
        connector,
        url.as_str(),
        config.endpoint.ticker.as_str(),
        config.probe.timeout(),
    );
    let policy = RetryPolicy::from(&config.retries);

    Ok(run_with_retries(&policy, |_| session.run()).await)
}
