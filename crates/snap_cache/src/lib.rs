//! Reading build artifacts from Bazel's caches by URI.
//!
//! Bazel may leave an output only in a remote content store rather than on
//! local disk, so artifacts are addressed by the URI reported in the build
//! event stream. [`DelegatingCache`] picks a backend by exact scheme match:
//!
//! - `file://<absolute-path>` is read from the local filesystem ([`LocalCache`]).
//! - `bytestream://[userinfo@]host[:port]/<resource>` is read over the
//!   `google.bytestream.ByteStream/Read` gRPC call ([`RemoteCache`]).
//!
//! Any other scheme fails with [`CacheError::UnknownScheme`].

#![warn(missing_docs)]

pub mod bytestream;
pub mod delegating;
pub mod error;
pub mod local;
pub mod metadata;
pub mod remote;

#[cfg(test)]
mod testing;

pub use bytestream::{
    ByteStreamClient, ByteStreamConnector, GrpcByteStreamClient, GrpcConnector, ReadRequest,
    ReadResponse,
};
pub use delegating::{CacheReader, DelegatingCache};
pub use error::CacheError;
pub use local::LocalCache;
pub use metadata::RequestMetadata;
pub use remote::RemoteCache;
