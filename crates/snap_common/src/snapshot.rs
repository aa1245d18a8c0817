//! The label → tracker manifest.
//!
//! A [`Snapshot`] is built once (from a map or an iterator of label/tracker
//! pairs) and is read-only afterwards. It is serialized as
//! `{"labels": {"<label>": <tracker>, ...}}` with labels in sorted order so
//! that two equal snapshots always produce identical bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tracker::Tracker;

/// Errors that can occur when encoding or decoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The bytes could not be decoded as a snapshot manifest.
    #[error("snapshot format is invalid: {source}")]
    Decode {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot could not be encoded as JSON.
    #[error("failed to encode snapshot: {source}")]
    Encode {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// An immutable manifest mapping build target labels to their trackers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    labels: BTreeMap<String, Tracker>,
}

impl Snapshot {
    /// Creates a snapshot from an existing label map.
    pub fn new(labels: BTreeMap<String, Tracker>) -> Self {
        Self { labels }
    }

    /// Decodes a snapshot from its JSON manifest form.
    pub fn from_json(bytes: &[u8]) -> Result<Self, SnapshotError> {
        serde_json::from_slice(bytes).map_err(|source| SnapshotError::Decode { source })
    }

    /// Encodes the snapshot as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>, SnapshotError> {
        serde_json::to_vec_pretty(self).map_err(|source| SnapshotError::Encode { source })
    }

    /// Returns the tracker recorded for `label`, if any.
    pub fn get(&self, label: &str) -> Option<&Tracker> {
        self.labels.get(label)
    }

    /// Returns `true` if the snapshot has a tracker for `label`.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    /// Iterates over all labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Iterates over all `(label, tracker)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tracker)> {
        self.labels.iter().map(|(l, t)| (l.as_str(), t))
    }

    /// Number of labels in the snapshot.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the snapshot has no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<(String, Tracker)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, Tracker)>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, Tracker>> for Snapshot {
    fn from(labels: BTreeMap<String, Tracker>) -> Self {
        Self::new(labels)
    }
}
