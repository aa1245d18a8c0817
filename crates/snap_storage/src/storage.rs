//! The object-store boundary and its filesystem backend.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::error::StorageError;

/// Size and key of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// The object key.
    pub path: String,
    /// Content length in bytes.
    pub size: u64,
}

/// One entry yielded by [`Storage::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListObject {
    /// The object key.
    pub path: String,
}

/// Lazily yielded listing results.
pub type ListIter<'a> = Box<dyn Iterator<Item = Result<ListObject, StorageError>> + 'a>;

/// A flat key/value object store with `/`-separated keys.
pub trait Storage: Send + Sync {
    /// Reads a whole object. Fails with [`StorageError::NotExist`] if absent.
    fn read_all(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Creates or replaces an object.
    fn write_all(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Looks up an object's metadata. Fails with [`StorageError::NotExist`]
    /// if absent.
    fn stat(&self, path: &str) -> Result<ObjectMetadata, StorageError>;

    /// Lists objects whose key starts with `prefix`, in key order.
    ///
    /// The listing is not recursive: keys with a further `/` after the
    /// prefix's last `/` are not returned.
    fn list<'a>(&'a self, prefix: &str) -> ListIter<'a>;
}

/// Storage backed by a local directory.
///
/// Keys map to files below the root. Parent directories are created on
/// write and writes are atomic through a temporary file and rename.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Creates a store rooted at `root`. The directory need not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(StorageError::InvalidPath {
                    path: key.to_string(),
                    reason: "keys must not contain empty or relative segments".to_string(),
                });
            }
            path.push(segment);
        }
        Ok(path)
    }

    fn list_dir(&self, prefix: &str) -> Result<Vec<ListObject>, StorageError> {
        let (dir_key, name_prefix) = match prefix.rfind('/') {
            Some(i) => (&prefix[..i], &prefix[i + 1..]),
            None => ("", prefix),
        };
        let dir = if dir_key.is_empty() {
            self.root.clone()
        } else {
            self.object_path(dir_key)?
        };

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io { path: dir, source: e }),
        };

        let mut objects = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::Io {
                path: dir.clone(),
                source: e,
            })?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            // Hidden files are in-flight writes, not objects.
            if name.starts_with('.') || !name.starts_with(name_prefix) {
                continue;
            }
            let file_type = entry.file_type().map_err(|e| StorageError::Io {
                path: entry.path(),
                source: e,
            })?;
            if file_type.is_dir() {
                continue;
            }
            let path = if dir_key.is_empty() {
                name
            } else {
                format!("{dir_key}/{name}")
            };
            objects.push(ListObject { path });
        }
        objects.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(objects)
    }
}

impl Storage for FileStorage {
    fn read_all(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(key)?;
        std::fs::read(&path).map_err(|e| not_exist_or_io(key, path, e))
    }

    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        let dir = path.parent().unwrap_or(&self.root).to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| StorageError::Io {
                path: dir.clone(),
                source: e,
            })?;
        tmp.write_all(bytes).map_err(|e| StorageError::Io {
            path: tmp.path().to_path_buf(),
            source: e,
        })?;
        tmp.persist(&path).map_err(|e| StorageError::Io {
            path: path.clone(),
            source: e.error,
        })?;
        debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn stat(&self, key: &str) -> Result<ObjectMetadata, StorageError> {
        let path = self.object_path(key)?;
        let meta = std::fs::metadata(&path).map_err(|e| not_exist_or_io(key, path, e))?;
        if meta.is_dir() {
            return Err(StorageError::NotExist {
                path: key.to_string(),
            });
        }
        Ok(ObjectMetadata {
            path: key.to_string(),
            size: meta.len(),
        })
    }

    fn list<'a>(&'a self, prefix: &str) -> ListIter<'a> {
        match self.list_dir(prefix) {
            Ok(objects) => Box::new(objects.into_iter().map(Ok)),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }
}

fn not_exist_or_io(key: &str, path: PathBuf, err: std::io::Error) -> StorageError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotExist {
            path: key.to_string(),
        }
    } else {
        StorageError::Io { path, source: err }
    }
}

/// Rewrites the legacy `gcs://` scheme to `gs://`.
///
/// Anything that does not parse as a URL is returned unchanged.
pub fn normalize_storage_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.scheme() == "gcs" && parsed.set_scheme("gs").is_err() {
                return url.to_string();
            }
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

/// Opens the storage backend for a storage URL.
///
/// Only `file://` URLs have a backend; cloud schemes such as `gs://` and
/// `s3://` are recognized but rejected with [`StorageError::UnsupportedScheme`].
pub fn open_storage(url: &str) -> Result<Box<dyn Storage>, StorageError> {
    let parsed = Url::parse(&normalize_storage_url(url)).map_err(|e| StorageError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "file" => {
            let root = parsed
                .to_file_path()
                .map_err(|()| StorageError::InvalidUrl {
                    url: url.to_string(),
                    reason: "not an absolute local path".to_string(),
                })?;
            debug!("using file storage at {}", root.display());
            Ok(Box::new(FileStorage::new(root)))
        }
        scheme => Err(StorageError::UnsupportedScheme {
            scheme: scheme.to_string(),
        }),
    }
}
