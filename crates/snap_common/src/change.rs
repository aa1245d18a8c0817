//! Diff result rows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tracker::Tracker;

/// How a label differs between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Present in both snapshots with the same digest.
    Unchanged,
    /// Present only in the newer snapshot.
    Added,
    /// Present only in the older snapshot.
    Removed,
    /// Present in both snapshots with different digests.
    Changed,
}

impl ChangeType {
    /// Returns the lowercase name used in JSON and table output.
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::Unchanged => "unchanged",
            ChangeType::Added => "added",
            ChangeType::Removed => "removed",
            ChangeType::Changed => "changed",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a diff: a label, its classification, and the "to" side tracker.
///
/// For removed labels the embedded tracker is empty. Serialized flat, as
/// `{"digest", "run", "tags", "label", "change"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerChange {
    /// The tracker from the "to" snapshot, or an empty tracker if removed.
    #[serde(flatten)]
    pub tracker: Tracker,

    /// The build target label.
    pub label: String,

    /// The classification of this label.
    #[serde(rename = "change")]
    pub change_type: ChangeType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_type_names() {
        assert_eq!(ChangeType::Unchanged.to_string(), "unchanged");
        assert_eq!(ChangeType::Added.to_string(), "added");
        assert_eq!(ChangeType::Removed.to_string(), "removed");
        assert_eq!(ChangeType::Changed.to_string(), "changed");
    }

    #[test]
    fn change_serializes_flat() {
        let change = TrackerChange {
            tracker: Tracker {
                digest: "9".to_string(),
                run: vec![],
                tags: vec!["web".to_string()],
            },
            label: "//b".to_string(),
            change_type: ChangeType::Added,
        };
        let json = serde_json::to_string(&change).unwrap();
        assert_eq!(
            json,
            r#"{"digest":"9","tags":["web"],"label":"//b","change":"added"}"#
        );
    }

    #[test]
    fn removed_change_has_empty_digest() {
        let change = TrackerChange {
            tracker: Tracker::default(),
            label: "//gone".to_string(),
            change_type: ChangeType::Removed,
        };
        let value: serde_json::Value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["digest"], "");
        assert_eq!(value["change"], "removed");
    }

    #[test]
    fn change_roundtrip() {
        let change = TrackerChange {
            tracker: Tracker::new("1"),
            label: "//a".to_string(),
            change_type: ChangeType::Changed,
        };
        let json = serde_json::to_string(&change).unwrap();
        let back: TrackerChange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, change);
    }
}
