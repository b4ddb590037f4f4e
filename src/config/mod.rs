//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: credential, result file, first-run dir)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable)
//!     → passed by reference to each step
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; the monitor runs with no config file at all
//! - The credential never comes from the file and is never serialized
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::MonitorConfig;
pub use schema::{EndpointConfig, PathsConfig, ProbeConfig, RetryConfig};
