use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Result, SnapshotStoreError};
use crate::snapshot::PersistenceId;

/// Maps an entity identity to an optional key prefix inside its bucket.
///
/// A configured static path prefix takes precedence over this.
pub trait PathPrefixResolver: Send + Sync {
    fn resolve(&self, persistence_id: &PersistenceId) -> Option<String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoPathPrefixResolver;

impl PathPrefixResolver for NoPathPrefixResolver {
    fn resolve(&self, _persistence_id: &PersistenceId) -> Option<String> {
        None
    }
}

#[derive(Clone, Debug)]
pub struct StaticPathPrefixResolver {
    prefix: String,
}

impl StaticPathPrefixResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        StaticPathPrefixResolver {
            prefix: prefix.into(),
        }
    }
}

impl PathPrefixResolver for StaticPathPrefixResolver {
    fn resolve(&self, _persistence_id: &PersistenceId) -> Option<String> {
        Some(self.prefix.clone())
    }
}

/// Groups snapshots by entity type, taken from ids shaped `Type|id`.
/// Ids without a `|` get no prefix.
#[derive(Clone, Copy, Debug, Default)]
pub struct EntityTypePathPrefixResolver;

impl PathPrefixResolver for EntityTypePathPrefixResolver {
    fn resolve(&self, persistence_id: &PersistenceId) -> Option<String> {
        persistence_id
            .as_str()
            .split_once('|')
            .map(|(entity_type, _)| entity_type)
            .filter(|entity_type| !entity_type.is_empty())
            .map(str::to_string)
    }
}

/// Registry of built-in path prefix resolvers, selectable by identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PathPrefixResolverKind {
    #[default]
    None,
    EntityType,
}

impl PathPrefixResolverKind {
    pub fn build(self) -> Arc<dyn PathPrefixResolver> {
        match self {
            PathPrefixResolverKind::None => Arc::new(NoPathPrefixResolver),
            PathPrefixResolverKind::EntityType => Arc::new(EntityTypePathPrefixResolver),
        }
    }
}

impl FromStr for PathPrefixResolverKind {
    type Err = SnapshotStoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(PathPrefixResolverKind::None),
            "entity-type" => Ok(PathPrefixResolverKind::EntityType),
            other => Err(SnapshotStoreError::Configuration(format!(
                "unknown path prefix resolver: {other}"
            ))),
        }
    }
}

impl fmt::Display for PathPrefixResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPrefixResolverKind::None => f.write_str("none"),
            PathPrefixResolverKind::EntityType => f.write_str("entity-type"),
        }
    }
}
