//! Retrieving published snapshots by tag or name.

use snap_common::Snapshot;
use tracing::debug;

use crate::error::StorageError;
use crate::store::SnapshotStore;

/// What to look up and where to look.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetArgs {
    /// A tag, a snapshot name, or a unique prefix of a snapshot name.
    pub name: String,
    /// Do not try `name` as a tag.
    pub skip_tags: bool,
    /// Do not try `name` as a snapshot name.
    pub skip_names: bool,
}

impl GetArgs {
    /// Looks `name` up as a tag first, then as a snapshot name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl SnapshotStore {
    /// Resolves a tag or name to the name of a stored snapshot.
    ///
    /// Tags win over names. A missing tag falls through to name lookup,
    /// where an exact name beats prefix matches and a prefix must match
    /// exactly one snapshot. Names that could never have been pushed or
    /// tagged are not found.
    pub fn resolve(&self, args: &GetArgs) -> Result<String, StorageError> {
        if self.layout.check_name(&args.name).is_err() {
            return Err(StorageError::NotFound {
                name: args.name.clone(),
            });
        }

        if !args.skip_tags {
            match self.storage.read_all(&self.layout.tag_path(&args.name)) {
                Ok(bytes) => {
                    let name = String::from_utf8_lossy(&bytes).trim().to_string();
                    if !name.is_empty() {
                        debug!("tag {} points at snapshot {name}", args.name);
                        return Ok(name);
                    }
                }
                Err(e) if e.is_not_exist() => {}
                Err(e) => return Err(e),
            }
        }

        if !args.skip_names {
            let prefix = self.layout.snapshot_name_prefix(&args.name);
            let mut matches = Vec::new();
            for object in self.storage.list(&prefix) {
                let object = object?;
                if !object.path.ends_with(".json") {
                    continue;
                }
                matches.push(self.layout.snapshot_name(&object.path).to_string());
            }

            if matches.iter().any(|m| *m == args.name) {
                return Ok(args.name.clone());
            }
            match matches.len() {
                0 => {}
                1 => return Ok(matches.remove(0)),
                _ => {
                    return Err(StorageError::Ambiguous {
                        name: args.name.clone(),
                        matches,
                    })
                }
            }
        }

        Err(StorageError::NotFound {
            name: args.name.clone(),
        })
    }

    /// Resolves `args` and reads the snapshot it names.
    pub fn get(&self, args: &GetArgs) -> Result<Snapshot, StorageError> {
        let name = self.resolve(args)?;
        let path = self.layout.snapshot_path(&name);
        let bytes = self.storage.read_all(&path).map_err(|e| {
            if e.is_not_exist() {
                StorageError::NotFound { name: name.clone() }
            } else {
                e
            }
        })?;
        debug!("read snapshot {name} from {path}");
        Snapshot::from_json(&bytes).map_err(|source| StorageError::Snapshot { path, source })
    }
}
