//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → probe spans carry a per-session UUID
//!
//! Consumers:
//!     → CI job log (stdout/stderr)
//! ```
//!
//! # Design Decisions
//! - Structured fields (attempt, elapsed, close code), not formatted strings
//! - One subscriber per process, installed by the binary

pub mod logging;

pub use logging::init_logging;
