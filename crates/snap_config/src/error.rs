//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating a `snapshots.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML content could not be parsed into a configuration.
    #[error("invalid configuration: {source}")]
    Parse {
        /// The TOML error, with line and column.
        #[from]
        source: toml::de::Error,
    },

    /// A setting that must have a value is empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Dotted name of the setting, e.g. `bazel.output_group`.
        field: &'static str,
    },

    /// A setting has an unusable value.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Dotted name of the setting.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Returns `true` if the configuration file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
