//! Parsing and validation of `kairos.toml` timing configuration files.
//!
//! The configuration selects the target clock frequency, the automatic
//! frequency adaptation used by iterative slack redistribution, report
//! formatting, and user-specified budget overrides on individual connections.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{resolve_timing, ResolvedTiming};
pub use types::*;
