//! sourced_snapshots: snapshot store for event-sourced entities on object storage.
//!
//! Every snapshot is one object whose key encodes the persistence id,
//! sequence number and timestamp. Loading lists the entity's keys, keeps the
//! ones inside the selection window and tries the most recent few, falling
//! back to older snapshots when one cannot be fetched or decoded.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use sourced_snapshots::{
//!     BitcodeSerializer, InMemoryObjectStore, ObjectSnapshotStore, PersistenceId,
//!     SnapshotMetadata, SnapshotSelectionCriteria, SnapshotStore, SnapshotStoreConfig,
//! };
//!
//! let client = InMemoryObjectStore::with_buckets(["snapshots"]);
//! let store = ObjectSnapshotStore::builder(Arc::new(client), BitcodeSerializer::<Cart>::new())
//!     .with_config(SnapshotStoreConfig::default().with_bucket_name("snapshots"))
//!     .build()?;
//!
//! let id = PersistenceId::new("Cart|42")?;
//! store.save(SnapshotMetadata::new(id.clone(), 7, now_millis()), cart).await?;
//! let latest = store.load(&id, SnapshotSelectionCriteria::latest()).await?;
//! ```

mod config;
mod error;
mod instrument;
mod key;
mod object_store;
mod resolver;
mod serializer;
mod snapshot;
mod store;

pub use config::{SnapshotStoreConfig, DEFAULT_EXTENSION_NAME, DEFAULT_MAX_LOAD_ATTEMPTS};
pub use error::{ObjectStoreError, Result, SnapshotStoreError};
pub use instrument::{
    Context, InMemoryMetricsReporter, MetricsReporter, MetricsReporterKind, NoopMetricsReporter,
    NoopTraceReporter, Operation, OperationStats, TraceReporter, TraceReporterKind,
    TracingTraceReporter,
};
pub use key::{DefaultKeyConverter, KeyConverter, KeyConverterKind};
pub use object_store::{GetObjectOutput, InMemoryObjectStore, ObjectStore, StatusCode};
pub use resolver::{
    BucketNameResolver, BucketNameResolverKind, EntityTypePathPrefixResolver,
    NoPathPrefixResolver, PathPrefixResolver, PathPrefixResolverKind,
    PersistenceIdBucketNameResolver, ShardedBucketNameResolver, StaticBucketNameResolver,
    StaticPathPrefixResolver,
};
#[cfg(feature = "bitcode")]
pub use serializer::BitcodeSerializer;
pub use serializer::{JsonSerializer, Serializer};
pub use snapshot::{
    PersistenceId, SelectedSnapshot, SequenceNumber, SnapshotMetadata, SnapshotRow,
    SnapshotSelectionCriteria, SnapshotStore,
};
pub use store::{ObjectSnapshotStore, SnapshotStoreBuilder};

// Re-exported so implementors of `ObjectStore` and `SnapshotStore` use the
// same macro version.
pub use async_trait::async_trait;
