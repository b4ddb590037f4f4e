//! Probe outcome and error definitions.

use std::time::Duration;

use thiserror::Error;

/// WebSocket close code for a normal closure.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Errors that end a single probe attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Connection-level failure (connect, send or read).
    #[error("WebSocket error: {0}")]
    Transport(String),

    /// No qualifying message arrived before the deadline.
    #[error("WebSocket test timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The peer closed the connection before a qualifying message.
    #[error("WebSocket closed unexpectedly: {code} {reason}")]
    PrematureClose { code: u16, reason: String },
}

impl ProbeError {
    /// Close code associated with the failure, 0 when none was observed.
    pub fn terminal_code(&self) -> u16 {
        match self {
            ProbeError::PrematureClose { code, .. } => *code,
            ProbeError::Transport(_) | ProbeError::Timeout(_) => 0,
        }
    }
}

/// Result of one probe attempt sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Whether the endpoint answered with a qualifying message.
    pub passed: bool,
    /// Human-readable summary.
    pub message: String,
    /// Time from session start to resolution.
    pub response_time_ms: u64,
    /// Close code that ended the session (1000 after success).
    pub terminal_code: u16,
}

impl ProbeOutcome {
    pub fn success(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            passed: true,
            message: message.into(),
            response_time_ms: duration_ms(elapsed),
            terminal_code: NORMAL_CLOSURE,
        }
    }

    pub fn failure(error: &ProbeError, elapsed: Duration) -> Self {
        Self {
            passed: false,
            message: error.to_string(),
            response_time_ms: duration_ms(elapsed),
            terminal_code: error.terminal_code(),
        }
    }
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
