mod criteria;
mod metadata;
mod store;

pub use criteria::SnapshotSelectionCriteria;
pub use metadata::{PersistenceId, SelectedSnapshot, SequenceNumber, SnapshotMetadata, SnapshotRow};
pub use store::SnapshotStore;
