//! Per-request gRPC metadata supplied as `key=value` strings.

use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue};
use tonic::Request;

use crate::error::CacheError;

/// Metadata attached to every outgoing byte-stream read.
///
/// Entries are validated once, up front, so a malformed header is reported
/// before any build or network work starts.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    entries: Vec<(AsciiMetadataKey, AsciiMetadataValue)>,
}

impl RequestMetadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses entries of the form `key=value`.
    ///
    /// The value may itself contain `=`; only the first one separates.
    /// Repeated keys are all sent.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, CacheError> {
        let mut metadata = Self::new();
        for entry in entries {
            let entry = entry.as_ref();
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| invalid(entry, "expected key=value"))?;
            metadata.append(key, value)?;
        }
        Ok(metadata)
    }

    /// Adds one entry.
    pub fn append(&mut self, key: &str, value: &str) -> Result<(), CacheError> {
        let entry = format!("{key}={value}");
        if key.is_empty() {
            return Err(invalid(&entry, "empty key"));
        }
        let key = AsciiMetadataKey::from_bytes(key.as_bytes())
            .map_err(|e| invalid(&entry, &e.to_string()))?;
        let value =
            AsciiMetadataValue::try_from(value).map_err(|e| invalid(&entry, &e.to_string()))?;
        self.entries.push((key, value));
        Ok(())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| Some((k.as_str(), v.to_str().ok()?)))
    }

    /// Copies every entry onto an outgoing request.
    pub fn apply_to<T>(&self, request: &mut Request<T>) {
        let map = request.metadata_mut();
        for (key, value) in &self.entries {
            map.append(key.clone(), value.clone());
        }
    }
}

fn invalid(entry: &str, reason: &str) -> CacheError {
    CacheError::InvalidMetadata {
        entry: entry.to_string(),
        reason: reason.to_string(),
    }
}
