//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::validation::ValidationError;

/// Placeholder substituted with the credential in the endpoint URL template.
pub const API_KEY_PLACEHOLDER: &str = "{api_key}";

/// Root configuration for the uptime monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Streaming endpoint under test.
    pub endpoint: EndpointConfig,

    /// Single-attempt probe settings.
    pub probe: ProbeConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Result slot and history locations.
    pub paths: PathsConfig,

    /// History record settings.
    pub history: HistoryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Streaming endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Connection URL with an `{api_key}` placeholder.
    pub url_template: String,

    /// Credential for the endpoint. Only ever read from the environment.
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Ticker sent in the subscribe request.
    pub ticker: String,

    /// Public URL written into the history record (never contains the credential).
    pub status_url: String,

    /// History file stem, e.g. `web-socket-server` for `history/web-socket-server.yml`.
    pub key: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url_template: format!("wss://ws.prixe.io/ws?api_key={}", API_KEY_PLACEHOLDER),
            api_key: String::new(),
            ticker: "TSLA".to_string(),
            status_url: "https://ws.prixe.io/ws".to_string(),
            key: "web-socket-server".to_string(),
        }
    }
}

impl EndpointConfig {
    /// Build the connection URL with the credential substituted.
    pub fn connect_url(&self) -> Result<Url, ValidationError> {
        let raw = self.url_template.replace(API_KEY_PLACEHOLDER, &self.api_key);
        Url::parse(&raw).map_err(|e| ValidationError::InvalidUrl(e.to_string()))
    }
}

/// Probe session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Deadline for one session, measured from session start.
    pub timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { timeout_ms: 15_000 }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,

    /// Fixed delay between a failed attempt and the next one, in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 5_000,
        }
    }
}

/// File locations shared between the probe, update and merge steps.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Transient result slot written by `probe` and read by `update-history`.
    pub result_file: PathBuf,

    /// Directory holding the authoritative per-endpoint history records.
    pub history_dir: PathBuf,

    /// Snapshot of the history directory taken after the first run.
    pub first_run_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            result_file: PathBuf::from("websocket-result.json"),
            history_dir: PathBuf::from("history"),
            first_run_dir: PathBuf::from("history_first_run"),
        }
    }
}

/// History record configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Generator label expected by the status-page renderer.
    pub generator: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            generator: crate::history::DEFAULT_GENERATOR.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.probe.timeout_ms, 15_000);
        assert_eq!(config.retries.max_attempts, 3);
        assert_eq!(config.endpoint.ticker, "TSLA");
        assert_eq!(config.endpoint.key, "web-socket-server");
        assert_eq!(config.paths.history_dir, PathBuf::from("history"));
    }

    #[test]
    fn test_connect_url_substitutes_key() {
        let endpoint = EndpointConfig {
            api_key: "secret".into(),
            ..EndpointConfig::default()
        };
        let url = endpoint.connect_url().unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.query(), Some("api_key=secret"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = MonitorConfig::default();
        config.endpoint.api_key = "secret".into();
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("secret"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: MonitorConfig = toml::from_str(
            r#"
            [retries]
            max_attempts = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.retries.max_attempts, 5);
        assert_eq!(config.retries.delay_ms, 5_000);
        assert_eq!(config.probe.timeout_ms, 15_000);
    }
}
