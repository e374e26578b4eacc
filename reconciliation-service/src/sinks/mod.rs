pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotSink, SnapshotStore};
