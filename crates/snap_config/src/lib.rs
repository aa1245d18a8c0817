//! Parsing and validation of `snapshots.toml` workspace configuration files.
//!
//! This crate reads the optional configuration file at the workspace root and
//! produces a strongly-typed [`SnapshotsConfig`]. Command-line flags are layered
//! on top by the CLI; every field has a usable default.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_config, load_config_file, load_config_from_str, load_config_or_default, validate_config,
    CONFIG_FILE,
};
pub use types::*;
