//! Probe session state machine and driver.
//!
//! # States
//! ```text
//! Connecting ──Opened──▶ Open ──SubscribeSent──▶ Subscribed
//!      │                  │                          │
//!      │                  └──── qualifying message ──┴──▶ Done(success)
//!      │
//!      └── TimedOut / Error / Closed (from any non-terminal state) ──▶ Done(failure)
//! ```
//!
//! # Design Decisions
//! - `SessionMachine` is synchronous and owns every decision; the driver only
//!   performs the actions it returns
//! - `Done` is a one-shot latch: the first resolution wins and every later
//!   event (a late timeout, a trailing close frame) is discarded
//! - Elapsed time is measured from session start, before the connect
//! - The final close gets `CLOSE_GRACE` at most; a stalled peer cannot hold
//!   the session past its budget

use std::time::Duration;

use serde_json::json;
use tokio::time::{sleep, timeout, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::probe::transport::{Connection, Connector, TransportEvent};
use crate::probe::types::{ProbeError, ProbeOutcome, NORMAL_CLOSURE};
use crate::probe::validator::{classify, ValidationResult};

/// Upper bound on the closing handshake once the session is resolved.
pub const CLOSE_GRACE: Duration = Duration::from_millis(1_000);

/// Lifecycle state of one probe session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport is being opened.
    Connecting,
    /// Transport is open; the subscribe request is being sent.
    Open,
    /// Subscribe request sent; waiting for a confirmation or sample.
    Subscribed,
    /// Resolved. Terminal.
    Done,
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Opened,
    SubscribeSent,
    Message(String),
    Error(ProbeError),
    Closed { code: u16, reason: String },
    TimedOut,
}

impl From<TransportEvent> for SessionEvent {
    fn from(event: TransportEvent) -> Self {
        match event {
            TransportEvent::Message(text) => SessionEvent::Message(text),
            TransportEvent::Closed { code, reason } => SessionEvent::Closed { code, reason },
            TransportEvent::Error(detail) => SessionEvent::Error(ProbeError::Transport(detail)),
        }
    }
}

/// Side effect the driver must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send(String),
    Close(u16),
}

/// Result of feeding one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub action: Option<Action>,
    pub outcome: Option<ProbeOutcome>,
}

/// Build the subscribe request for `ticker`.
pub fn subscribe_request(ticker: &str) -> String {
    json!({ "event": "subscribe", "data": { "ticker": ticker } }).to_string()
}

/// Health-check protocol for a single attempt.
#[derive(Debug)]
pub struct SessionMachine {
    state: SessionState,
    ticker: String,
    timeout: Duration,
}

impl SessionMachine {
    pub fn new(ticker: impl Into<String>, timeout: Duration) -> Self {
        Self {
            state: SessionState::Connecting,
            ticker: ticker.into(),
            timeout,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == SessionState::Done
    }

    /// Advance the machine by one event observed `elapsed` after session start.
    pub fn feed(&mut self, event: SessionEvent, elapsed: Duration) -> Transition {
        if self.is_done() {
            tracing::trace!(?event, "Session already resolved, ignoring event");
            return self.stay();
        }

        match (self.state, event) {
            (SessionState::Connecting, SessionEvent::Opened) => {
                self.state = SessionState::Open;
                Transition {
                    state: self.state,
                    action: Some(Action::Send(subscribe_request(&self.ticker))),
                    outcome: None,
                }
            }
            (SessionState::Open, SessionEvent::SubscribeSent) => {
                self.state = SessionState::Subscribed;
                self.stay()
            }
            (SessionState::Open | SessionState::Subscribed, SessionEvent::Message(raw)) => {
                match classify(&raw) {
                    ValidationResult::Confirmed { ticker } => self.succeed(
                        format!("WebSocket test passed - subscription confirmed for {}", ticker),
                        elapsed,
                    ),
                    ValidationResult::DataSample(sample) => {
                        let ticker = sample.ticker.unwrap_or_else(|| self.ticker.clone());
                        self.succeed(
                            format!("WebSocket test passed - received price update for {}", ticker),
                            elapsed,
                        )
                    }
                    ValidationResult::NotMatched => {
                        tracing::debug!(message = %raw, "Ignoring non-qualifying message");
                        self.stay()
                    }
                }
            }
            (_, SessionEvent::Error(error)) => self.fail(error, None, elapsed),
            (_, SessionEvent::Closed { code, reason }) => {
                self.fail(ProbeError::PrematureClose { code, reason }, None, elapsed)
            }
            (_, SessionEvent::TimedOut) => self.fail(
                ProbeError::Timeout(self.timeout),
                Some(Action::Close(NORMAL_CLOSURE)),
                elapsed,
            ),
            (state, event) => {
                tracing::debug!(?state, ?event, "Event not expected in this state, ignoring");
                self.stay()
            }
        }
    }

    fn stay(&self) -> Transition {
        Transition {
            state: self.state,
            action: None,
            outcome: None,
        }
    }

    fn succeed(&mut self, message: String, elapsed: Duration) -> Transition {
        self.state = SessionState::Done;
        Transition {
            state: self.state,
            action: Some(Action::Close(NORMAL_CLOSURE)),
            outcome: Some(ProbeOutcome::success(message, elapsed)),
        }
    }

    fn fail(&mut self, error: ProbeError, action: Option<Action>, elapsed: Duration) -> Transition {
        self.state = SessionState::Done;
        Transition {
            state: self.state,
            action,
            outcome: Some(ProbeOutcome::failure(&error, elapsed)),
        }
    }
}

/// Drives one `SessionMachine` over a real transport.
pub struct ProbeSession<'a, C> {
    connector: &'a C,
    url: String,
    ticker: String,
    timeout: Duration,
}

impl<'a, C: Connector> ProbeSession<'a, C> {
    pub fn new(
        connector: &'a C,
        url: impl Into<String>,
        ticker: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            connector,
            url: url.into(),
            ticker: ticker.into(),
            timeout,
        }
    }

    /// Run a single attempt to resolution.
    pub async fn run(&self) -> ProbeOutcome {
        let session_id = Uuid::new_v4();
        let span = tracing::info_span!("probe_session", %session_id, ticker = %self.ticker);
        self.drive().instrument(span).await
    }

    async fn drive(&self) -> ProbeOutcome {
        let started = Instant::now();
        let deadline = sleep(self.timeout);
        tokio::pin!(deadline);

        let mut machine = SessionMachine::new(self.ticker.clone(), self.timeout);
        let mut conn: Option<C::Conn> = None;
        let mut pending: Option<SessionEvent> = None;

        tracing::info!("Connecting to WebSocket...");

        loop {
            let event = match pending.take() {
                Some(event) => event,
                None => {
                    if let Some(open) = conn.as_mut() {
                        tokio::select! {
                            biased;
                            event = open.next_event() => SessionEvent::from(event),
                            _ = &mut deadline => SessionEvent::TimedOut,
                        }
                    } else {
                        tokio::select! {
                            biased;
                            result = self.connector.connect(&self.url) => match result {
                                Ok(open) => {
                                    conn = Some(open);
                                    SessionEvent::Opened
                                }
                                Err(error) => SessionEvent::Error(error),
                            },
                            _ = &mut deadline => SessionEvent::TimedOut,
                        }
                    }
                }
            };

            if let SessionEvent::Message(raw) = &event {
                tracing::debug!(message = %raw, "Received");
            }

            let transition = machine.feed(event, started.elapsed());

            match (transition.action, conn.as_mut()) {
                (Some(Action::Send(text)), Some(open)) => {
                    tracing::info!("Connected! Sending subscribe message...");
                    pending = Some(tokio::select! {
                        biased;
                        result = open.send(text.clone()) => match result {
                            Ok(()) => {
                                tracing::debug!(message = %text, "Sent");
                                SessionEvent::SubscribeSent
                            }
                            Err(error) => SessionEvent::Error(error),
                        },
                        _ = &mut deadline => SessionEvent::TimedOut,
                    });
                }
                (Some(Action::Close(code)), Some(open)) => {
                    if timeout(CLOSE_GRACE, open.close(code)).await.is_err() {
                        tracing::debug!(code, "Close handshake timed out, dropping connection");
                    }
                }
                _ => {}
            }

            if let Some(outcome) = transition.outcome {
                return outcome;
            }
        }
    }
}
