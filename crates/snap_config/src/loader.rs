//! Configuration file loading and validation.

use std::path::Path;

use crate::error::ConfigError;
use crate::types::SnapshotsConfig;

/// Name of the configuration file at the workspace root.
pub const CONFIG_FILE: &str = "snapshots.toml";

/// Loads and validates `snapshots.toml` from a workspace directory.
pub fn load_config(workspace_dir: &Path) -> Result<SnapshotsConfig, ConfigError> {
    load_config_file(&workspace_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<SnapshotsConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Loads `snapshots.toml` if present, otherwise returns the defaults.
///
/// A file that exists but cannot be read or parsed is still an error.
pub fn load_config_or_default(workspace_dir: &Path) -> Result<SnapshotsConfig, ConfigError> {
    match load_config(workspace_dir) {
        Err(e) if e.is_not_found() => Ok(SnapshotsConfig::default()),
        other => other,
    }
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<SnapshotsConfig, ConfigError> {
    let config: SnapshotsConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks that values the collector depends on are usable.
pub fn validate_config(config: &SnapshotsConfig) -> Result<(), ConfigError> {
    if config.bazel.expression.trim().is_empty() {
        return Err(ConfigError::Empty {
            field: "bazel.expression",
        });
    }
    if config.bazel.output_group.trim().is_empty() {
        return Err(ConfigError::Empty {
            field: "bazel.output_group",
        });
    }
    if config.cache.concurrency == 0 {
        return Err(ConfigError::Invalid {
            field: "cache.concurrency",
            reason: "must be at least 1".to_string(),
        });
    }
    if let Some(bad) = config.cache.metadata.iter().find(|m| !m.contains('=')) {
        return Err(ConfigError::Invalid {
            field: "cache.metadata",
            reason: format!("entry '{bad}' is not of the form key=value"),
        });
    }
    Ok(())
}
