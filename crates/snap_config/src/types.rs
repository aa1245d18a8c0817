//! Configuration types deserialized from `snapshots.toml`.

use serde::Deserialize;

/// Default build expression collected when none is configured.
pub const DEFAULT_EXPRESSION: &str = "//...";

/// Default output group holding each target's tracker file.
pub const DEFAULT_OUTPUT_GROUP: &str = "change_track_files";

/// The top-level configuration parsed from `snapshots.toml`.
///
/// Every section is optional; an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotsConfig {
    /// Where published snapshots and tags live.
    #[serde(default)]
    pub storage: StorageConfig,
    /// How the build tool is invoked during collection.
    #[serde(default)]
    pub bazel: BazelConfig,
    /// How tracker files are fetched from the build cache.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Storage location for pushed snapshots and tags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Storage URL, e.g. `file:///var/snapshots`. Only `file://` storage is
    /// supported; other schemes are rejected when the store is opened.
    pub url: Option<String>,
    /// Optional prefix under which this workspace's snapshots are stored.
    pub workspace_name: Option<String>,
}

/// Build tool invocation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BazelConfig {
    /// Path to the `bazel` executable. Looked up on `PATH` when unset.
    pub path: Option<String>,
    /// Extra bazelrc file passed as `--bazelrc=<file>`.
    pub bazelrc: Option<String>,
    /// Target expression to build and collect.
    #[serde(default = "default_expression")]
    pub expression: String,
    /// Name of the output group carrying tracker files.
    #[serde(default = "default_output_group")]
    pub output_group: String,
    /// Forward the build tool's stderr instead of discarding it.
    #[serde(default)]
    pub stderr: bool,
}

impl Default for BazelConfig {
    fn default() -> Self {
        Self {
            path: None,
            bazelrc: None,
            expression: default_expression(),
            output_group: default_output_group(),
            stderr: false,
        }
    }
}

/// Remote cache access settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Use TLS for byte-stream connections.
    #[serde(default)]
    pub tls: bool,
    /// Request metadata entries in `key=value` form attached to every read.
    #[serde(default)]
    pub metadata: Vec<String>,
    /// Maximum number of tracker reads in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-read deadline in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            tls: false,
            metadata: Vec::new(),
            concurrency: default_concurrency(),
            timeout_secs: None,
        }
    }
}

fn default_expression() -> String {
    DEFAULT_EXPRESSION.to_string()
}

fn default_output_group() -> String {
    DEFAULT_OUTPUT_GROUP.to_string()
}

fn default_concurrency() -> usize {
    1
}
