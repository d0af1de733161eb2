use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::SnapshotStoreConfig;
use crate::error::{Result, SnapshotStoreError};
use crate::snapshot::PersistenceId;

/// Maps an entity identity to the bucket its snapshots live in.
///
/// Must be deterministic and free of fallible I/O. A configured static bucket
/// name takes precedence over whatever this returns.
pub trait BucketNameResolver: Send + Sync {
    fn resolve(&self, persistence_id: &PersistenceId) -> String;
}

/// Always the same bucket.
#[derive(Clone, Debug)]
pub struct StaticBucketNameResolver {
    bucket_name: String,
}

impl StaticBucketNameResolver {
    pub fn new(bucket_name: impl Into<String>) -> Self {
        StaticBucketNameResolver {
            bucket_name: bucket_name.into(),
        }
    }
}

impl BucketNameResolver for StaticBucketNameResolver {
    fn resolve(&self, _persistence_id: &PersistenceId) -> String {
        self.bucket_name.clone()
    }
}

/// One bucket per persistence id, named after the id.
///
/// The id is lower-cased and anything outside `[a-z0-9.-]` becomes `-`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PersistenceIdBucketNameResolver;

impl BucketNameResolver for PersistenceIdBucketNameResolver {
    fn resolve(&self, persistence_id: &PersistenceId) -> String {
        persistence_id
            .as_str()
            .chars()
            .map(|c| {
                let c = c.to_ascii_lowercase();
                if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-' {
                    c
                } else {
                    '-'
                }
            })
            .collect()
    }
}

/// Spreads persistence ids over `shards` buckets named `{base}-{n}`.
#[derive(Clone, Debug)]
pub struct ShardedBucketNameResolver {
    base: String,
    shards: u32,
}

impl ShardedBucketNameResolver {
    /// Fails with `Configuration` when `shards` is zero.
    pub fn new(base: impl Into<String>, shards: u32) -> Result<Self> {
        if shards == 0 {
            return Err(SnapshotStoreError::Configuration(
                "bucket_shards must be at least 1".into(),
            ));
        }
        Ok(ShardedBucketNameResolver {
            base: base.into(),
            shards,
        })
    }

    pub fn shard_of(&self, persistence_id: &PersistenceId) -> u32 {
        crc32fast::hash(persistence_id.as_str().as_bytes()) % self.shards
    }
}

impl BucketNameResolver for ShardedBucketNameResolver {
    fn resolve(&self, persistence_id: &PersistenceId) -> String {
        format!("{}-{}", self.base, self.shard_of(persistence_id))
    }
}

/// Registry of built-in bucket name resolvers, selectable by identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BucketNameResolverKind {
    #[default]
    PersistenceId,
    Sharded,
}

impl BucketNameResolverKind {
    pub fn build(self, config: &SnapshotStoreConfig) -> Result<Arc<dyn BucketNameResolver>> {
        Ok(match self {
            BucketNameResolverKind::PersistenceId => Arc::new(PersistenceIdBucketNameResolver),
            BucketNameResolverKind::Sharded => Arc::new(ShardedBucketNameResolver::new(
                config.bucket_name_base.clone(),
                config.bucket_shards,
            )?),
        })
    }
}

impl FromStr for BucketNameResolverKind {
    type Err = SnapshotStoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "persistence-id" => Ok(BucketNameResolverKind::PersistenceId),
            "sharded" => Ok(BucketNameResolverKind::Sharded),
            other => Err(SnapshotStoreError::Configuration(format!(
                "unknown bucket name resolver: {other}"
            ))),
        }
    }
}

impl fmt::Display for BucketNameResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketNameResolverKind::PersistenceId => f.write_str("persistence-id"),
            BucketNameResolverKind::Sharded => f.write_str("sharded"),
        }
    }
}
