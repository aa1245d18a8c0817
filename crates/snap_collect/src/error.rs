//! Error types for snapshot collection.

use std::path::PathBuf;

use snap_bazel::{BazelError, EventError};
use snap_cache::CacheError;

/// Errors that abort a collection. No partial snapshot is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// Running the build tool failed.
    #[error("build failed: {0}")]
    Bazel(#[from] BazelError),

    /// A live collection was requested without a build tool client.
    #[error("no build tool configured for collecting from a build expression")]
    NoBuildTool,

    /// The build event file could not be opened.
    #[error("failed to open build event file {path}: {source}")]
    OpenEvents {
        /// The event file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The build event stream was malformed or unreadable.
    #[error("error reading build event: {0}")]
    Events(#[from] EventError),

    /// The background task parsing build events panicked or was cancelled.
    #[error("build event parsing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// A tracker file could not be read from the cache.
    #[error("failed to get item {uri} for label {label} from cache: {source}")]
    Cache {
        /// The target label.
        label: String,
        /// The tracker file URI.
        uri: String,
        /// The cache error.
        source: CacheError,
    },

    /// A tracker file was read but is not a valid tracker.
    #[error("invalid tracker content at {uri} for label {label}: {source}")]
    InvalidTracker {
        /// The target label.
        label: String,
        /// The tracker file URI.
        uri: String,
        /// The JSON error.
        source: serde_json::Error,
    },
}
