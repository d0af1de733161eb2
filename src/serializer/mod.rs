//! Snapshot payload codecs.
//!
//! The engine treats the codec as an opaque collaborator: it hands over
//! `(metadata, snapshot)` on save and a fetched [`SnapshotRow`] on load.

use std::fmt;
use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Result, SnapshotStoreError};
use crate::snapshot::{SnapshotMetadata, SnapshotRow};

/// Encodes snapshot values to bytes and back.
pub trait Serializer: Send + Sync + 'static {
    type Snapshot: Send + 'static;

    /// Fails with `Serialization`.
    fn serialize(&self, metadata: &SnapshotMetadata, snapshot: &Self::Snapshot) -> Result<Vec<u8>>;

    /// Fails with `Deserialization`.
    fn deserialize(&self, row: SnapshotRow) -> Result<(SnapshotMetadata, Self::Snapshot)>;
}

/// `bitcode` codec, the compact binary format aggregates snapshot with.
#[cfg(feature = "bitcode")]
pub struct BitcodeSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

#[cfg(feature = "bitcode")]
impl<T> BitcodeSerializer<T> {
    pub fn new() -> Self {
        BitcodeSerializer {
            _marker: PhantomData,
        }
    }
}

#[cfg(feature = "bitcode")]
impl<T> Default for BitcodeSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "bitcode")]
impl<T> fmt::Debug for BitcodeSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BitcodeSerializer")
    }
}

#[cfg(feature = "bitcode")]
impl<T> Serializer for BitcodeSerializer<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    type Snapshot = T;

    fn serialize(&self, _metadata: &SnapshotMetadata, snapshot: &T) -> Result<Vec<u8>> {
        bitcode::serialize(snapshot)
            .map_err(|e| SnapshotStoreError::Serialization(format!("snapshot serialize: {e}")))
    }

    fn deserialize(&self, row: SnapshotRow) -> Result<(SnapshotMetadata, T)> {
        let snapshot: T = bitcode::deserialize(&row.payload)
            .map_err(|e| SnapshotStoreError::Deserialization(format!("snapshot deserialize: {e}")))?;
        Ok((row.metadata(), snapshot))
    }
}

/// JSON codec. Larger than bitcode but readable straight out of the bucket.
pub struct JsonSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    pub fn new() -> Self {
        JsonSerializer {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonSerializer")
    }
}

impl<T> Serializer for JsonSerializer<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    type Snapshot = T;

    fn serialize(&self, _metadata: &SnapshotMetadata, snapshot: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(snapshot)
            .map_err(|e| SnapshotStoreError::Serialization(format!("snapshot serialize: {e}")))
    }

    fn deserialize(&self, row: SnapshotRow) -> Result<(SnapshotMetadata, T)> {
        let snapshot: T = serde_json::from_slice(&row.payload)
            .map_err(|e| SnapshotStoreError::Deserialization(format!("snapshot deserialize: {e}")))?;
        Ok((row.metadata(), snapshot))
    }
}
