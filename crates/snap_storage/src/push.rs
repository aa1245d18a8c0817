//! Publishing snapshots.

use snap_common::Snapshot;
use tracing::info;

use crate::error::StorageError;
use crate::storage::ObjectMetadata;
use crate::store::SnapshotStore;

impl SnapshotStore {
    /// Stores `snapshot` as pretty-printed JSON under `name`, replacing any
    /// snapshot of the same name.
    pub fn push(&self, name: &str, snapshot: &Snapshot) -> Result<ObjectMetadata, StorageError> {
        self.layout.check_name(name)?;
        let path = self.layout.snapshot_path(name);
        let bytes = snapshot
            .to_json_pretty()
            .map_err(|source| StorageError::Snapshot {
                path: path.clone(),
                source,
            })?;

        self.storage.write_all(&path, &bytes)?;
        let meta = self.storage.stat(&path)?;
        info!("pushed snapshot {name} to {} ({} bytes)", meta.path, meta.size);
        Ok(meta)
    }
}
