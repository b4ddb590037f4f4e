//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeout > 0, at least one attempt)
//! - Check the endpoint template yields a usable WebSocket URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - The credential is checked separately; only the probe step needs it

use thiserror::Error;

use crate::config::schema::{MonitorConfig, API_KEY_PLACEHOLDER};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("probe.timeout_ms must be greater than 0")]
    ZeroTimeout,

    #[error("retries.max_attempts must be at least 1")]
    NoAttempts,

    #[error("endpoint.ticker must not be empty")]
    EmptyTicker,

    #[error("endpoint.key must not be empty")]
    EmptyKey,

    #[error("endpoint.url_template must contain {placeholder}")]
    MissingPlaceholder { placeholder: &'static str },

    #[error("endpoint URL is invalid: {0}")]
    InvalidUrl(String),

    #[error("endpoint URL scheme must be ws or wss, got {0}")]
    UnsupportedScheme(String),

    #[error("PRIXE_API_KEY is not set")]
    MissingApiKey,
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.probe.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::NoAttempts);
    }
    if config.endpoint.ticker.trim().is_empty() {
        errors.push(ValidationError::EmptyTicker);
    }
    if config.endpoint.key.trim().is_empty() {
        errors.push(ValidationError::EmptyKey);
    }

    if !config.endpoint.url_template.contains(API_KEY_PLACEHOLDER) {
        errors.push(ValidationError::MissingPlaceholder {
            placeholder: API_KEY_PLACEHOLDER,
        });
    }
    match config.endpoint.connect_url() {
        Ok(url) if url.scheme() != "ws" && url.scheme() != "wss" => {
            errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
        }
        Ok(_) => {}
        Err(e) => errors.push(e),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that a credential is available for the probe step.
pub fn require_api_key(config: &MonitorConfig) -> Result<(), ValidationError> {
    if config.endpoint.api_key.trim().is_empty() {
        return Err(ValidationError::MissingApiKey);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&MonitorConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = MonitorConfig::default();
        config.probe.timeout_ms = 0;
        config.retries.max_attempts = 0;
        config.endpoint.ticker = " ".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert!(errors.contains(&ValidationError::NoAttempts));
        assert!(errors.contains(&ValidationError::EmptyTicker));
    }

    #[test]
    fn test_rejects_http_scheme() {
        let mut config = MonitorConfig::default();
        config.endpoint.url_template = "https://example.com/ws?key={api_key}".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::UnsupportedScheme("https".into())]);
    }

    #[test]
    fn test_missing_placeholder() {
        let mut config = MonitorConfig::default();
        config.endpoint.url_template = "wss://example.com/ws".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::MissingPlaceholder { .. }));
    }

    #[test]
    fn test_require_api_key() {
        let mut config = MonitorConfig::default();
        assert_eq!(require_api_key(&config), Err(ValidationError::MissingApiKey));
        config.endpoint.api_key = "k".into();
        assert!(require_api_key(&config).is_ok());
    }
}
