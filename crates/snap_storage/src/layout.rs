//! Object keys for snapshots and tags.

use crate::error::StorageError;

const SNAPSHOTS_DIR: &str = "snapshots";
const TAGS_DIR: &str = "tags";
const SNAPSHOT_EXT: &str = ".json";

/// Maps snapshot names and tags to object keys.
///
/// Snapshots live at `[<workspace>/]snapshots/<name>.json`; tags at
/// `[<workspace>/]tags/<tag>`, holding the tagged snapshot's name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    workspace: Option<String>,
}

impl Layout {
    /// Creates a layout, optionally scoped under a workspace name.
    ///
    /// Surrounding slashes are trimmed; an empty name means no scope.
    pub fn new(workspace_name: Option<&str>) -> Self {
        let workspace = workspace_name
            .map(|w| w.trim_matches('/'))
            .filter(|w| !w.is_empty())
            .map(str::to_string);
        Self { workspace }
    }

    /// The workspace scope, if any.
    pub fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    /// Checks that `name` can be used as a snapshot name or tag.
    ///
    /// Names map to a single object key segment, so they must be non-empty
    /// and free of `/`.
    pub fn check_name(&self, name: &str) -> Result<(), StorageError> {
        let reason = if name.is_empty() {
            "name is empty"
        } else if name.contains('/') {
            "name must not contain '/'"
        } else if name == "." || name == ".." {
            "name must not be a relative path segment"
        } else {
            return Ok(());
        };
        Err(StorageError::InvalidPath {
            path: name.to_string(),
            reason: reason.to_string(),
        })
    }

    /// Key of the snapshot called `name`.
    pub fn snapshot_path(&self, name: &str) -> String {
        format!("{}{name}{SNAPSHOT_EXT}", self.snapshot_prefix())
    }

    /// Key of the tag called `tag`.
    pub fn tag_path(&self, tag: &str) -> String {
        self.scoped(&format!("{TAGS_DIR}/{tag}"))
    }

    /// Listing prefix for snapshots whose name starts with `name`.
    pub fn snapshot_name_prefix(&self, name: &str) -> String {
        format!("{}{name}", self.snapshot_prefix())
    }

    /// Extracts the snapshot name from a snapshot key.
    pub fn snapshot_name<'a>(&self, path: &'a str) -> &'a str {
        let base = path.rsplit('/').next().unwrap_or(path);
        base.strip_suffix(SNAPSHOT_EXT).unwrap_or(base)
    }

    fn snapshot_prefix(&self) -> String {
        self.scoped(&format!("{SNAPSHOTS_DIR}/"))
    }

    fn scoped(&self, key: &str) -> String {
        match &self.workspace {
            Some(ws) => format!("{ws}/{key}"),
            None => key.to_string(),
        }
    }
}
