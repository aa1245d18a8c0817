//! Backend for `bytestream://` artifact URIs.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use tonic::metadata::AsciiMetadataValue;
use tonic::{Code, Request, Status};
use url::Url;

use crate::bytestream::{ByteStreamClient, ByteStreamConnector, GrpcConnector, ReadRequest};
use crate::error::CacheError;
use crate::metadata::RequestMetadata;

/// Reads artifacts from a remote cache over the byte-stream API.
///
/// Holds one client per `host[:port]`, created on first use and kept for the
/// life of the cache. A broken channel is not replaced; its failure surfaces
/// on the next read against that host.
pub struct RemoteCache<C: ByteStreamConnector = GrpcConnector> {
    connector: C,
    clients: Mutex<HashMap<String, C::Client>>,
    timeout: Option<Duration>,
}

impl<C: ByteStreamConnector> RemoteCache<C> {
    /// Creates a cache that opens clients with `connector`.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            clients: Mutex::new(HashMap::new()),
            timeout: None,
        }
    }

    /// Bounds every read, including streaming the whole response.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of hosts a client has been opened for.
    pub fn client_count(&self) -> usize {
        self.lock_clients().len()
    }

    /// Reads the whole resource named by a `bytestream://` URI.
    ///
    /// `metadata` is attached to this request only. User info in the URI is
    /// sent as the `authorization` header.
    pub async fn read(&self, uri: &Url, metadata: &RequestMetadata) -> Result<Vec<u8>, CacheError> {
        let authority = authority(uri).ok_or_else(|| CacheError::InvalidUri {
            uri: uri.to_string(),
            reason: "missing host".to_string(),
        })?;
        let client = self.client_for(&authority)?;
        let request = self.build_request(uri, metadata)?;

        tracing::debug!(%uri, "reading from remote cache");
        let fetch = fetch(&client, request, uri);
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, fetch)
                .await
                .map_err(|_| CacheError::Timeout {
                    uri: uri.to_string(),
                    timeout,
                })?,
            None => fetch.await,
        }
    }

    fn lock_clients(&self) -> std::sync::MutexGuard<'_, HashMap<String, C::Client>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn client_for(&self, authority: &str) -> Result<C::Client, CacheError> {
        let mut clients = self.lock_clients();
        if let Some(client) = clients.get(authority) {
            return Ok(client.clone());
        }
        let client = self.connector.connect(authority)?;
        clients.insert(authority.to_string(), client.clone());
        Ok(client)
    }

    fn build_request(
        &self,
        uri: &Url,
        metadata: &RequestMetadata,
    ) -> Result<Request<ReadRequest>, CacheError> {
        let mut request = Request::new(ReadRequest {
            resource_name: resource_name(uri),
            read_offset: 0,
            read_limit: 0,
        });
        metadata.apply_to(&mut request);

        if let Some(auth) = userinfo(uri) {
            let value = AsciiMetadataValue::try_from(auth.as_str()).map_err(|e| {
                CacheError::InvalidUri {
                    uri: uri.to_string(),
                    reason: format!("user info is not a valid header value: {e}"),
                }
            })?;
            request.metadata_mut().insert("authorization", value);
        }
        if let Some(timeout) = self.timeout {
            request.set_timeout(timeout);
        }
        Ok(request)
    }
}

async fn fetch<B: ByteStreamClient>(
    client: &B,
    request: Request<ReadRequest>,
    uri: &Url,
) -> Result<Vec<u8>, CacheError> {
    let mut stream = client
        .read(request)
        .await
        .map_err(|s| status_error(uri, s))?;

    let mut blob = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|s| status_error(uri, s))?;
        blob.extend_from_slice(&chunk.data);
    }
    Ok(blob)
}

fn status_error(uri: &Url, status: Status) -> CacheError {
    if status.code() == Code::NotFound {
        CacheError::Unavailable {
            uri: uri.to_string(),
            reason: status.message().to_string(),
        }
    } else {
        CacheError::Transport {
            uri: uri.to_string(),
            source: status,
        }
    }
}

/// `host[:port]` of the URI, the key for client reuse.
fn authority(uri: &Url) -> Option<String> {
    let host = uri.host_str().filter(|h| !h.is_empty())?;
    Some(match uri.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Path and query of the URI without the leading slash.
fn resource_name(uri: &Url) -> String {
    let path = uri.path();
    let path = path.strip_prefix('/').unwrap_or(path);
    match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    }
}

/// `user[:password]` from the URI, still percent-encoded.
fn userinfo(uri: &Url) -> Option<String> {
    match (uri.username(), uri.password()) {
        ("", None) => None,
        (user, None) => Some(user.to_string()),
        (user, Some(password)) => Some(format!("{user}:{password}")),
    }
}
