//! Backend for `file://` artifact URIs.

use url::Url;

use crate::error::CacheError;

/// Reads artifacts that Bazel materialized on local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCache;

impl LocalCache {
    /// Reads the file named by a `file://` URI.
    ///
    /// A missing file is [`CacheError::Unavailable`]; any other failure is
    /// [`CacheError::Io`].
    pub async fn read(&self, uri: &Url) -> Result<Vec<u8>, CacheError> {
        let path = uri.to_file_path().map_err(|()| CacheError::InvalidUri {
            uri: uri.to_string(),
            reason: "not an absolute local file path".to_string(),
        })?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CacheError::Unavailable {
                uri: uri.to_string(),
                reason: format!("file {} does not exist", path.display()),
            }),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }
}
