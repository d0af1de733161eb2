use async_trait::async_trait;

use crate::error::Result;

use super::criteria::SnapshotSelectionCriteria;
use super::metadata::{PersistenceId, SelectedSnapshot, SnapshotMetadata};

/// Trait for snapshot persistence. Many snapshots per persistence id, keyed by
/// sequence number and timestamp.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    type Snapshot: Send;

    /// Load the most recent usable snapshot inside `criteria`.
    ///
    /// Returns `Ok(None)` both when nothing matches and when every candidate
    /// within the attempt budget failed to fetch or deserialize.
    async fn load(
        &self,
        persistence_id: &PersistenceId,
        criteria: SnapshotSelectionCriteria,
    ) -> Result<Option<SelectedSnapshot<Self::Snapshot>>>;

    /// Serialize and store a snapshot under the key derived from `metadata`.
    async fn save(&self, metadata: SnapshotMetadata, snapshot: Self::Snapshot) -> Result<()>;

    /// Delete one snapshot. A zero timestamp deletes every snapshot at the
    /// metadata's sequence number.
    async fn delete(&self, metadata: SnapshotMetadata) -> Result<()>;

    /// Delete every snapshot inside `criteria`.
    async fn delete_by_criteria(
        &self,
        persistence_id: &PersistenceId,
        criteria: SnapshotSelectionCriteria,
    ) -> Result<()>;
}
