//! Error types for the snapshot store.

use thiserror::Error;

/// Failure reported by an [`ObjectStore`](crate::ObjectStore) client before it
/// could produce a status code (connection refused, unknown bucket, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectStoreError {
    #[error("no such bucket: {0}")]
    NoSuchBucket(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("object store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

/// Main error type for snapshot store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotStoreError {
    /// The object store answered with a non-success status.
    #[error("object store {op} failed with status {status_code}")]
    StoreOperation { op: &'static str, status_code: u16 },

    #[error("object store {op} failed: {source}")]
    ObjectStore {
        op: &'static str,
        #[source]
        source: ObjectStoreError,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// A listed key does not decode. Never surfaced by the engine; such
    /// objects are dropped from the candidate set.
    #[error("malformed key {key:?}: {reason}")]
    MalformedKey { key: String, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid persistence id: {0:?}")]
    InvalidPersistenceId(String),

    #[error("delete task failed: {0}")]
    DeleteTask(String),
}

impl SnapshotStoreError {
    pub(crate) fn object_store(op: &'static str, source: ObjectStoreError) -> Self {
        SnapshotStoreError::ObjectStore { op, source }
    }

    pub(crate) fn malformed_key(key: &str, reason: impl Into<String>) -> Self {
        SnapshotStoreError::MalformedKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Status code attached to a store operation failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SnapshotStoreError::StoreOperation { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Result type for snapshot store operations.
pub type Result<T> = std::result::Result<T, SnapshotStoreError>;
