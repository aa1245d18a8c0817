//! Error types for snapshot storage.

use std::path::PathBuf;

use snap_common::SnapshotError;

/// Errors that can occur while talking to storage or resolving snapshots.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The object does not exist.
    #[error("object {path} does not exist")]
    NotExist {
        /// The object key.
        path: String,
    },

    /// An I/O error occurred in the filesystem backend.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        /// The file path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An object key would escape the storage root.
    #[error("invalid object path '{path}': {reason}")]
    InvalidPath {
        /// The offending key.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The storage URL could not be parsed.
    #[error("invalid storage URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL as given.
        url: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// The storage URL names a backend this build does not include.
    #[error("storage scheme '{scheme}' is not supported; use a file:// URL")]
    UnsupportedScheme {
        /// The normalized URL scheme.
        scheme: String,
    },

    /// A stored snapshot could not be encoded or decoded.
    #[error("snapshot at {path}: {source}")]
    Snapshot {
        /// The object key.
        path: String,
        /// The underlying snapshot error.
        #[source]
        source: SnapshotError,
    },

    /// More than one stored snapshot matches a name prefix.
    #[error("ambiguous snapshot name '{name}': matches {}", .matches.join(", "))]
    Ambiguous {
        /// The name or prefix that was looked up.
        name: String,
        /// Names of the matching snapshots.
        matches: Vec<String>,
    },

    /// No tag or snapshot matches the name.
    #[error("snapshot '{name}' not found")]
    NotFound {
        /// The name that was looked up.
        name: String,
    },
}

impl StorageError {
    /// Returns `true` if the error means the object is absent.
    pub fn is_not_exist(&self) -> bool {
        matches!(self, StorageError::NotExist { .. })
    }
}
