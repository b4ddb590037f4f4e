//! History subsystem.
//!
//! # Data Flow
//! ```text
//! probe step:
//!     ProbeOutcome → result_slot.rs (websocket-result.json)
//!
//! update step:
//!     result slot + prior record → writer.rs (apply_outcome)
//!     → history/<key>.yml (startTime kept)
//!
//! merge step (two scheduled runs):
//!     history_first_run/*.yml + history/*.yml
//!     → reconcile.rs (down only if both runs were down)
//!     → history/*.yml
//! ```
//!
//! # Design Decisions
//! - Records are always replaced whole, never patched in place
//! - A missing or corrupt file degrades to defaults; it never aborts the run
//! - The reconciler is pure; all file access lives in writer.rs

pub mod error;
pub mod reconcile;
pub mod record;
pub mod result_slot;
pub mod writer;

/// Generator label written when a record does not carry one.
pub const DEFAULT_GENERATOR: &str = "Upptime <https://github.com/upptime/upptime>";

pub use error::HistoryError;
pub use reconcile::merge;
pub use record::{HealthRecord, HistorySample, RecordTime, Status};
pub use result_slot::ResultSlot;
pub use writer::{merge_history_dirs, HistoryWriter, MergeCounts, MergeSummary};
