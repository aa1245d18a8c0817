//! Publishing, tagging and retrieving snapshots in blob storage.
//!
//! [`Storage`] is the minimal object-store boundary: whole-object reads and
//! writes, metadata lookups and prefix listing. [`SnapshotStore`] layers the
//! snapshot naming scheme on top of it (see [`Layout`]) and implements
//! push, tag and get.

#![warn(missing_docs)]

pub mod error;
pub mod get;
pub mod layout;
pub mod push;
pub mod storage;
pub mod store;
pub mod tag;

pub use error::StorageError;
pub use get::GetArgs;
pub use layout::Layout;
pub use storage::{normalize_storage_url, open_storage, FileStorage, ListObject, ObjectMetadata, Storage};
pub use store::SnapshotStore;
