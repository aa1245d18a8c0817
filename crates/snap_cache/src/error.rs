//! Error types for cache reads.

use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur when reading an artifact from a cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The URI is unparsable or its scheme has no backend.
    #[error("unknown or invalid scheme for {uri}")]
    UnknownScheme {
        /// The offending URI.
        uri: String,
    },

    /// The URI parsed but cannot be used by its backend.
    #[error("invalid cache uri {uri}: {reason}")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The artifact is not present in the cache.
    #[error("item {uri} is not available in cache: {reason}")]
    Unavailable {
        /// The artifact URI.
        uri: String,
        /// Backend-specific detail.
        reason: String,
    },

    /// A local artifact exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The remote cache answered with a gRPC error other than `NotFound`.
    #[error("failed reading cache response for {uri}: {source}")]
    Transport {
        /// The artifact URI.
        uri: String,
        /// The gRPC status returned by the server.
        #[source]
        source: tonic::Status,
    },

    /// A channel to a remote cache could not be configured.
    #[error("failed to dial host {authority}: {source}")]
    Connect {
        /// The `host[:port]` being dialed.
        authority: String,
        /// The underlying transport error.
        source: tonic::transport::Error,
    },

    /// A remote read did not finish within the configured deadline.
    #[error("reading {uri} timed out after {timeout:?}")]
    Timeout {
        /// The artifact URI.
        uri: String,
        /// The deadline that expired.
        timeout: Duration,
    },

    /// A request metadata entry is not a valid ASCII `key=value` pair.
    #[error("invalid request metadata entry '{entry}': {reason}")]
    InvalidMetadata {
        /// The entry as given.
        entry: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl CacheError {
    /// True when the artifact is simply absent, as opposed to a failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CacheError::Unavailable { .. })
    }
}
