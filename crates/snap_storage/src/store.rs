//! A [`Storage`] paired with the snapshot [`Layout`].

use crate::error::StorageError;
use crate::layout::Layout;
use crate::storage::{open_storage, Storage};

/// Published snapshots and tags in one storage location.
///
/// Push, tag and get are implemented in their own modules.
pub struct SnapshotStore {
    pub(crate) storage: Box<dyn Storage>,
    pub(crate) layout: Layout,
}

impl SnapshotStore {
    /// Wraps an already opened storage backend.
    pub fn new(storage: Box<dyn Storage>, layout: Layout) -> Self {
        Self { storage, layout }
    }

    /// Opens the storage at `url`, scoped under `workspace_name` if given.
    pub fn open(url: &str, workspace_name: Option<&str>) -> Result<Self, StorageError> {
        Ok(Self::new(open_storage(url)?, Layout::new(workspace_name)))
    }

    /// The underlying storage backend.
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// The key layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
