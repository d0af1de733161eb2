use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Result, SnapshotStoreError};
use crate::snapshot::{PersistenceId, SequenceNumber, SnapshotMetadata};

/// Bidirectional mapping between snapshot metadata and an object key.
///
/// `convert_from(convert_to(m, ext), ext)` must return `m` for every metadata
/// this store writes. Keys are relative to the resolved path prefix; the
/// engine adds and strips the prefix itself.
pub trait KeyConverter: Send + Sync {
    fn convert_to(&self, metadata: &SnapshotMetadata, extension: &str) -> String;

    /// Fails with `MalformedKey` when `key` was not produced by `convert_to`.
    fn convert_from(&self, key: &str, extension: &str) -> Result<SnapshotMetadata>;

    /// Common prefix of every key written for `persistence_id`, used to
    /// narrow listings.
    fn list_prefix(&self, persistence_id: &PersistenceId) -> String;
}

/// Key layout `{persistence_id}/{sequence_number}.{timestamp}.{extension}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultKeyConverter;

impl KeyConverter for DefaultKeyConverter {
    fn convert_to(&self, metadata: &SnapshotMetadata, extension: &str) -> String {
        format!(
            "{}/{}.{}.{}",
            metadata.persistence_id, metadata.sequence_number, metadata.timestamp, extension
        )
    }

    fn convert_from(&self, key: &str, extension: &str) -> Result<SnapshotMetadata> {
        let (persistence_id, file) = key
            .rsplit_once('/')
            .ok_or_else(|| SnapshotStoreError::malformed_key(key, "missing '/' separator"))?;

        let mut parts = file.splitn(3, '.');
        let (Some(sequence), Some(timestamp), Some(ext)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(SnapshotStoreError::malformed_key(
                key,
                "expected <sequence>.<timestamp>.<extension>",
            ));
        };

        if ext != extension {
            return Err(SnapshotStoreError::malformed_key(
                key,
                format!("extension {ext:?} does not match {extension:?}"),
            ));
        }

        let sequence_number = parse_number(key, "sequence number", sequence)?;
        let timestamp = parse_number(key, "timestamp", timestamp)?;
        let persistence_id = PersistenceId::new(persistence_id)
            .map_err(|_| SnapshotStoreError::malformed_key(key, "empty persistence id"))?;

        Ok(SnapshotMetadata {
            persistence_id,
            sequence_number: SequenceNumber::new(sequence_number),
            timestamp,
        })
    }

    fn list_prefix(&self, persistence_id: &PersistenceId) -> String {
        format!("{}/", persistence_id)
    }
}

// u64::from_str accepts a leading '+', which convert_to never writes.
fn parse_number(key: &str, what: &str, raw: &str) -> Result<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SnapshotStoreError::malformed_key(
            key,
            format!("{what} {raw:?} is not a decimal number"),
        ));
    }
    raw.parse::<u64>()
        .map_err(|e| SnapshotStoreError::malformed_key(key, format!("{what}: {e}")))
}

/// Registry of built-in key converters, selectable by identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyConverterKind {
    #[default]
    Default,
}

impl KeyConverterKind {
    pub fn build(self) -> Arc<dyn KeyConverter> {
        match self {
            KeyConverterKind::Default => Arc::new(DefaultKeyConverter),
        }
    }
}

impl FromStr for KeyConverterKind {
    type Err = SnapshotStoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(KeyConverterKind::Default),
            other => Err(SnapshotStoreError::Configuration(format!(
                "unknown key converter: {other}"
            ))),
        }
    }
}

impl fmt::Display for KeyConverterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyConverterKind::Default => f.write_str("default"),
        }
    }
}
