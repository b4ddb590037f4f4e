//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Health-check cycle:
//!     → retries.rs (attempt budget, fixed delay)
//!     → probe::ProbeSession (one attempt, own deadline)
//!     → RetryReport (first success or last failure)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every session has a deadline
//! - Attempts are sequential, never parallel
//! - Transient failures are absorbed here; only the final verdict leaves

pub mod retries;

pub use retries::{run_with_retries, RetryPolicy, RetryReport};
