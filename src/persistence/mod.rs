//! Whole-tree snapshots: the state record, its encodings and the file store.

mod codec;
mod error;
mod record;
mod snapshot;
mod store;

pub use codec::{DEFAULT_COMPRESSION_LEVEL, SnapshotFormat};
pub use store::SnapshotStore;
