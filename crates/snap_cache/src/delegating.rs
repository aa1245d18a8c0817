//! Scheme-based dispatch over the fixed set of cache backends.

use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::bytestream::{ByteStreamConnector, GrpcConnector};
use crate::error::CacheError;
use crate::local::LocalCache;
use crate::metadata::RequestMetadata;
use crate::remote::RemoteCache;

/// Something that can fetch the bytes behind an artifact URI.
pub trait CacheReader: Send + Sync {
    /// Reads the whole artifact at `uri`, attaching `metadata` where the
    /// backend supports it.
    fn read(
        &self,
        uri: &str,
        metadata: &RequestMetadata,
    ) -> impl Future<Output = Result<Vec<u8>, CacheError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Local,
    ByteStream,
}

impl Backend {
    fn for_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "file" => Some(Backend::Local),
            "bytestream" => Some(Backend::ByteStream),
            _ => None,
        }
    }
}

/// Routes each read to the backend registered for the URI's scheme.
pub struct DelegatingCache<C: ByteStreamConnector = GrpcConnector> {
    local: LocalCache,
    remote: RemoteCache<C>,
}

impl DelegatingCache<GrpcConnector> {
    /// Creates a cache whose remote backend dials real gRPC channels.
    pub fn new(tls: bool) -> Self {
        Self::with_connector(GrpcConnector::new(tls))
    }
}

impl<C: ByteStreamConnector> DelegatingCache<C> {
    /// Creates a cache using `connector` for `bytestream://` hosts.
    pub fn with_connector(connector: C) -> Self {
        Self {
            local: LocalCache,
            remote: RemoteCache::new(connector),
        }
    }

    /// Sets a deadline for remote reads.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.remote = self.remote.with_timeout(timeout);
        self
    }

    /// The remote backend.
    pub fn remote(&self) -> &RemoteCache<C> {
        &self.remote
    }

    /// Reads `uri` through the backend for its scheme.
    pub async fn read(&self, uri: &str, metadata: &RequestMetadata) -> Result<Vec<u8>, CacheError> {
        let unknown = || CacheError::UnknownScheme {
            uri: uri.to_string(),
        };
        let parsed = Url::parse(uri).map_err(|_| unknown())?;

        match Backend::for_scheme(parsed.scheme()).ok_or_else(unknown)? {
            Backend::Local => self.local.read(&parsed).await,
            Backend::ByteStream => self.remote.read(&parsed, metadata).await,
        }
    }
}

impl<C: ByteStreamConnector> CacheReader for DelegatingCache<C> {
    fn read(
        &self,
        uri: &str,
        metadata: &RequestMetadata,
    ) -> impl Future<Output = Result<Vec<u8>, CacheError>> + Send {
        DelegatingCache::read(self, uri, metadata)
    }
}
