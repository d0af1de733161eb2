use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotStoreError};

/// Stable identity of an event-sourced entity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersistenceId(String);

impl PersistenceId {
    /// Fails with `InvalidPersistenceId` when `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(SnapshotStoreError::InvalidPersistenceId(id));
        }
        Ok(PersistenceId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersistenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PersistenceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PersistenceId {
    type Error = SnapshotStoreError;

    fn try_from(value: String) -> Result<Self> {
        PersistenceId::new(value)
    }
}

impl TryFrom<&str> for PersistenceId {
    type Error = SnapshotStoreError;

    fn try_from(value: &str) -> Result<Self> {
        PersistenceId::new(value)
    }
}

impl From<PersistenceId> for String {
    fn from(id: PersistenceId) -> Self {
        id.0
    }
}

/// Position of a snapshot in an entity's history. Ordering defines recency.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    pub const MIN: SequenceNumber = SequenceNumber(0);
    pub const MAX: SequenceNumber = SequenceNumber(u64::MAX);

    pub const fn new(value: u64) -> Self {
        SequenceNumber(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for SequenceNumber {
    fn from(value: u64) -> Self {
        SequenceNumber(value)
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptor of a stored snapshot.
///
/// `timestamp` is epoch millis. A timestamp of `0` passed to
/// [`delete`](crate::SnapshotStore::delete) means "every snapshot at this
/// sequence number".
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub persistence_id: PersistenceId,
    pub sequence_number: SequenceNumber,
    pub timestamp: u64,
}

impl SnapshotMetadata {
    pub fn new(persistence_id: PersistenceId, sequence_number: u64, timestamp: u64) -> Self {
        SnapshotMetadata {
            persistence_id,
            sequence_number: SequenceNumber::new(sequence_number),
            timestamp,
        }
    }

    /// Key used to order candidates: sequence number first, then timestamp.
    pub fn recency(&self) -> (SequenceNumber, u64) {
        (self.sequence_number, self.timestamp)
    }
}

/// Raw fetched record, before the payload is handed to the serializer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotRow {
    pub persistence_id: PersistenceId,
    pub sequence_number: SequenceNumber,
    pub timestamp: u64,
    pub payload: Vec<u8>,
}

impl SnapshotRow {
    pub fn new(metadata: SnapshotMetadata, payload: Vec<u8>) -> Self {
        SnapshotRow {
            persistence_id: metadata.persistence_id,
            sequence_number: metadata.sequence_number,
            timestamp: metadata.timestamp,
            payload,
        }
    }

    pub fn metadata(&self) -> SnapshotMetadata {
        SnapshotMetadata {
            persistence_id: self.persistence_id.clone(),
            sequence_number: self.sequence_number,
            timestamp: self.timestamp,
        }
    }
}

/// A loaded snapshot together with the metadata it was stored under.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedSnapshot<T> {
    pub metadata: SnapshotMetadata,
    pub snapshot: T,
}
