//! Minimal client for the `google.bytestream.ByteStream/Read` RPC.
//!
//! Only `Read` is needed, so the two messages are declared by hand with prost
//! derives and the call goes through [`tonic::client::Grpc`] directly,
//! without generated service stubs.

use std::future::Future;
use std::time::Duration;

use futures::stream::BoxStream;
use futures::StreamExt;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::{Request, Status};

use crate::error::CacheError;

const READ_PATH: &str = "/google.bytestream.ByteStream/Read";

/// Interval between HTTP/2 keep-alive pings.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// How long to wait for a keep-alive ack before closing the connection.
pub const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(20);

/// Largest response message accepted from the cache.
pub const MAX_DECODING_MESSAGE_SIZE: usize = i32::MAX as usize;

/// `google.bytestream.ReadRequest`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ReadRequest {
    /// Name of the resource to read.
    #[prost(string, tag = "1")]
    pub resource_name: String,
    /// Offset of the first byte to return.
    #[prost(int64, tag = "2")]
    pub read_offset: i64,
    /// Maximum number of bytes to return; zero means no limit.
    #[prost(int64, tag = "3")]
    pub read_limit: i64,
}

/// `google.bytestream.ReadResponse`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ReadResponse {
    /// The next chunk of the resource.
    #[prost(bytes = "vec", tag = "10")]
    pub data: Vec<u8>,
}

/// Stream of response chunks for one read.
pub type ReadStream = BoxStream<'static, Result<ReadResponse, Status>>;

/// A handle able to issue byte-stream reads against one remote host.
///
/// Handles are cloned out of the per-host cache for every read, so cloning
/// must be cheap.
pub trait ByteStreamClient: Clone + Send + Sync + 'static {
    /// Starts a server-streaming `Read` call.
    fn read(
        &self,
        request: Request<ReadRequest>,
    ) -> impl Future<Output = Result<ReadStream, Status>> + Send;
}

/// Creates [`ByteStreamClient`]s for `host[:port]` authorities.
pub trait ByteStreamConnector: Send + Sync {
    /// The client type produced.
    type Client: ByteStreamClient;

    /// Creates a client for `authority`.
    ///
    /// Called once per distinct authority; implementations should not block
    /// on network I/O here.
    fn connect(&self, authority: &str) -> Result<Self::Client, CacheError>;
}

/// Byte-stream client over a tonic [`Channel`].
#[derive(Debug, Clone)]
pub struct GrpcByteStreamClient {
    inner: tonic::client::Grpc<Channel>,
}

impl GrpcByteStreamClient {
    /// Wraps an existing channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel)
                .max_decoding_message_size(MAX_DECODING_MESSAGE_SIZE),
        }
    }
}

impl ByteStreamClient for GrpcByteStreamClient {
    fn read(
        &self,
        request: Request<ReadRequest>,
    ) -> impl Future<Output = Result<ReadStream, Status>> + Send {
        let mut grpc = self.inner.clone();
        async move {
            grpc.ready()
                .await
                .map_err(|e| Status::unknown(format!("service was not ready: {e}")))?;
            let codec = ProstCodec::default();
            let path = PathAndQuery::from_static(READ_PATH);
            let response = grpc.server_streaming(request, path, codec).await?;
            Ok(response.into_inner().boxed())
        }
    }
}

/// Opens lazily-connected tonic channels with keep-alive, optionally over TLS.
#[derive(Debug, Clone, Default)]
pub struct GrpcConnector {
    tls: bool,
}

impl GrpcConnector {
    /// Creates a connector; `tls` selects `https` with the platform's roots.
    pub fn new(tls: bool) -> Self {
        Self { tls }
    }

    fn endpoint(&self, authority: &str) -> Result<Endpoint, tonic::transport::Error> {
        let scheme = if self.tls { "https" } else { "http" };
        let endpoint = Endpoint::from_shared(format!("{scheme}://{authority}"))?
            .http2_keep_alive_interval(KEEPALIVE_INTERVAL)
            .keep_alive_timeout(KEEPALIVE_TIMEOUT)
            .keep_alive_while_idle(true);
        if self.tls {
            endpoint.tls_config(ClientTlsConfig::new().with_native_roots())
        } else {
            Ok(endpoint)
        }
    }
}

impl ByteStreamConnector for GrpcConnector {
    type Client = GrpcByteStreamClient;

    fn connect(&self, authority: &str) -> Result<Self::Client, CacheError> {
        let endpoint = self.endpoint(authority).map_err(|e| CacheError::Connect {
            authority: authority.to_string(),
            source: e,
        })?;
        tracing::debug!(authority, tls = self.tls, "opening byte-stream channel");
        Ok(GrpcByteStreamClient::new(endpoint.connect_lazy()))
    }
}
