//! Streaming health probe subsystem.
//!
//! # Data Flow
//! ```text
//! ProbeSession::run
//!     → transport.rs (connect, send subscribe, receive frames)
//!     → session.rs (SessionMachine: one event in, one transition out)
//!     → validator.rs (classify each inbound message)
//!     → ProbeOutcome (passed, message, latency, close code)
//! ```
//!
//! # Design Decisions
//! - One session is one attempt; retries live in `resilience::retries`
//! - The deadline covers the whole session, connect included
//! - Success and timeout race; the state machine latch picks exactly one

pub mod session;
pub mod transport;
pub mod types;
pub mod validator;

pub use session::{ProbeSession, SessionMachine};
pub use transport::{Connection, Connector, WsConnector};
pub use types::{ProbeError, ProbeOutcome};
