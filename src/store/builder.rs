use std::sync::Arc;

use crate::config::SnapshotStoreConfig;
use crate::error::Result;
use crate::instrument::{MetricsReporter, TraceReporter};
use crate::key::KeyConverter;
use crate::object_store::ObjectStore;
use crate::resolver::{BucketNameResolver, PathPrefixResolver};
use crate::serializer::Serializer;

use super::engine::ObjectSnapshotStore;

/// Wires an [`ObjectSnapshotStore`].
///
/// Strategies passed in explicitly win; the rest are looked up from the
/// identifiers in the config. `build` fails with `Configuration` when the
/// config is invalid or names an unknown strategy.
///
/// ```ignore
/// let store = ObjectSnapshotStore::builder(Arc::new(client), BitcodeSerializer::<CartSnapshot>::new())
///     .with_config(SnapshotStoreConfig::default().with_bucket_name("snapshots"))
///     .with_metrics_reporter(metrics.clone())
///     .build()?;
/// ```
pub struct SnapshotStoreBuilder<S> {
    client: Arc<dyn ObjectStore>,
    serializer: S,
    config: SnapshotStoreConfig,
    key_converter: Option<Arc<dyn KeyConverter>>,
    bucket_name_resolver: Option<Arc<dyn BucketNameResolver>>,
    path_prefix_resolver: Option<Arc<dyn PathPrefixResolver>>,
    metrics: Option<Arc<dyn MetricsReporter>>,
    trace: Option<Arc<dyn TraceReporter>>,
}

impl<S: Serializer> SnapshotStoreBuilder<S> {
    pub fn new(client: Arc<dyn ObjectStore>, serializer: S) -> Self {
        SnapshotStoreBuilder {
            client,
            serializer,
            config: SnapshotStoreConfig::default(),
            key_converter: None,
            bucket_name_resolver: None,
            path_prefix_resolver: None,
            metrics: None,
            trace: None,
        }
    }

    pub fn with_config(mut self, config: SnapshotStoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_key_converter(mut self, key_converter: Arc<dyn KeyConverter>) -> Self {
        self.key_converter = Some(key_converter);
        self
    }

    pub fn with_bucket_name_resolver(mut self, resolver: Arc<dyn BucketNameResolver>) -> Self {
        self.bucket_name_resolver = Some(resolver);
        self
    }

    pub fn with_path_prefix_resolver(mut self, resolver: Arc<dyn PathPrefixResolver>) -> Self {
        self.path_prefix_resolver = Some(resolver);
        self
    }

    pub fn with_metrics_reporter(mut self, metrics: Arc<dyn MetricsReporter>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_trace_reporter(mut self, trace: Arc<dyn TraceReporter>) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn build(self) -> Result<ObjectSnapshotStore<S>> {
        let config = self.config;
        config.validate()?;

        let key_converter = match self.key_converter {
            Some(key_converter) => key_converter,
            None => config.key_converter_kind()?.build(),
        };
        let bucket_name_resolver = match self.bucket_name_resolver {
            Some(resolver) => resolver,
            None => config.bucket_name_resolver_kind()?.build(&config)?,
        };
        let path_prefix_resolver = match self.path_prefix_resolver {
            Some(resolver) => resolver,
            None => config.path_prefix_resolver_kind()?.build(),
        };
        let metrics = match self.metrics {
            Some(metrics) => metrics,
            None => config.metrics_reporter_kind()?.build(),
        };
        let trace = match self.trace {
            Some(trace) => trace,
            None => config.trace_reporter_kind()?.build(),
        };

        tracing::debug!(
            bucket_name = ?config.bucket_name,
            path_prefix = ?config.path_prefix,
            max_load_attempts = config.max_load_attempts,
            extension_name = config.extension_name.as_str(),
            "snapshot store configured"
        );

        Ok(ObjectSnapshotStore {
            client: self.client,
            serializer: Arc::new(self.serializer),
            key_converter,
            bucket_name_resolver,
            path_prefix_resolver,
            metrics,
            trace,
            config: Arc::new(config),
        })
    }
}
