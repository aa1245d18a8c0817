//! The per-label tracker record written by the build and read back by collection.

use serde::{Deserialize, Serialize};

/// Digest plus deployment metadata for a single build target.
///
/// Serialized as `{"digest": "...", "run": [...], "tags": [...]}`. The `run`
/// and `tags` lists are omitted when empty and default to empty when absent,
/// so a tracker without metadata round-trips to an equal value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    /// Hex-encoded content hash of the target's inputs. Opaque to everything
    /// except equality comparison.
    pub digest: String,

    /// Identifiers naming how to execute or deploy the target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub run: Vec<String>,

    /// Free-form labels attached by the target's build definition.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Tracker {
    /// Creates a tracker with the given digest and no metadata.
    pub fn new(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
            run: Vec::new(),
            tags: Vec::new(),
        }
    }
}
