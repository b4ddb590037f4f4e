//! Streaming endpoint uptime monitor.
//!
//! # Architecture Overview
//!
//! ```text
//!   scheduled run #1                         scheduled run #2
//!   ────────────────                         ────────────────
//!   probe ──▶ websocket-result.json          probe ──▶ websocket-result.json
//!     │                                        │
//!     ▼                                        ▼
//!   update-history ──▶ history/*.yml         update-history ──▶ history/*.yml
//!     │                                        │
//!     └──▶ (workflow copies to                 ▼
//!           history_first_run/)              merge: down only if both runs were down
//!                                              │
//!                                              ▼
//!                                            history/*.yml ──▶ status page
//! ```
//!
//! # Exit codes
//! - 0: success, or a deliberate no-op (no first-run snapshot to merge)
//! - 1: probe failed after all attempts (a down result is written first),
//!   or a history/result file could not be written
//! - 2: invalid configuration

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};

use stream_uptime::config::validation::require_api_key;
use stream_uptime::config::{load_config, MonitorConfig};
use stream_uptime::history::{merge_history_dirs, HistoryWriter, MergeSummary, ResultSlot};
use stream_uptime::observability::init_logging;
use stream_uptime::probe::WsConnector;
use stream_uptime::run_health_check;

#[derive(Parser)]
#[command(name = "stream-uptime")]
#[command(about = "Uptime probe and history reconciler for a streaming endpoint", long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, env = "STREAM_UPTIME_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the endpoint with retries and write the result file
    Probe,
    /// Apply the result file to the endpoint's history record
    UpdateHistory,
    /// Reconcile the first-run snapshot with the current history
    Merge,
    /// Probe, then update history, in one invocation
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    init_logging(&config.observability);
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        tracing::debug!("TLS crypto provider already installed");
    }

    tracing::info!(
        endpoint = %config.endpoint.status_url,
        ticker = %config.endpoint.ticker,
        timeout_ms = config.probe.timeout_ms,
        max_attempts = config.retries.max_attempts,
        "stream-uptime v0.1.0 starting"
    );

    let result = match cli.command {
        Commands::Probe => probe(&config).await,
        Commands::UpdateHistory => update_history(&config),
        Commands::Merge => merge(&config),
        Commands::Check => {
            let probed = probe(&config).await;
            let updated = update_history(&config);
            probed.and(updated)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

async fn probe(config: &MonitorConfig) -> Result<(), ExitCode> {
    if let Err(e) = require_api_key(config) {
        tracing::error!(error = %e, "Cannot probe without a credential");
        return Err(ExitCode::from(2));
    }

    let report = match run_health_check(&WsConnector, config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Invalid endpoint configuration");
            return Err(ExitCode::from(2));
        }
    };

    let slot = ResultSlot::from_outcome(&report.outcome);
    if let Err(e) = slot.write(&config.paths.result_file) {
        tracing::error!(error = %e, "Failed to write result file");
        return Err(ExitCode::FAILURE);
    }

    if report.outcome.passed {
        tracing::info!(
            attempts = report.attempts,
            response_time_ms = report.outcome.response_time_ms,
            "SUCCESS: {}",
            report.outcome.message
        );
        Ok(())
    } else {
        tracing::error!(
            attempts = report.attempts,
            "FAILED: {}",
            report.outcome.message
        );
        Err(ExitCode::FAILURE)
    }
}

fn update_history(config: &MonitorConfig) -> Result<(), ExitCode> {
    let outcome = ResultSlot::read(&config.paths.result_file);
    let writer = HistoryWriter::from_config(config);

    match writer.apply_outcome(&config.endpoint.key, outcome.as_ref(), Utc::now()) {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update history");
            Err(ExitCode::FAILURE)
        }
    }
}

fn merge(config: &MonitorConfig) -> Result<(), ExitCode> {
    match merge_history_dirs(
        &config.paths.first_run_dir,
        &config.paths.history_dir,
        Utc::now(),
    ) {
        Ok(MergeSummary::Skipped) | Ok(MergeSummary::Merged(_)) => Ok(()),
        Err(e) => {
            tracing::error!(error = %e, "History merge failed");
            Err(ExitCode::FAILURE)
        }
    }
}
