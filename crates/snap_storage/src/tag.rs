//! Naming published snapshots.

use tracing::info;

use crate::error::StorageError;
use crate::storage::ObjectMetadata;
use crate::store::SnapshotStore;

impl SnapshotStore {
    /// Points `tag` at the stored snapshot `snapshot_name`.
    ///
    /// The snapshot must already exist. An existing tag is moved.
    pub fn tag(&self, snapshot_name: &str, tag: &str) -> Result<ObjectMetadata, StorageError> {
        self.layout.check_name(snapshot_name)?;
        self.layout.check_name(tag)?;
        let snapshot_path = self.layout.snapshot_path(snapshot_name);
        let snapshot = self.storage.stat(&snapshot_path).map_err(|e| {
            if e.is_not_exist() {
                StorageError::NotFound {
                    name: snapshot_name.to_string(),
                }
            } else {
                e
            }
        })?;

        let name = self.layout.snapshot_name(&snapshot.path);
        let tag_path = self.layout.tag_path(tag);
        self.storage.write_all(&tag_path, name.as_bytes())?;
        let meta = self.storage.stat(&tag_path)?;
        info!("tagged snapshot {name} as {tag}");
        Ok(meta)
    }
}
