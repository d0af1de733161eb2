use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn, Instrument, Span};

use crate::config::SnapshotStoreConfig;
use crate::error::{Result, SnapshotStoreError};
use crate::instrument::{Context, MetricsReporter, Operation, TraceReporter};
use crate::key::KeyConverter;
use crate::object_store::ObjectStore;
use crate::resolver::{BucketNameResolver, PathPrefixResolver};
use crate::serializer::Serializer;
use crate::snapshot::{
    PersistenceId, SelectedSnapshot, SnapshotMetadata, SnapshotRow, SnapshotSelectionCriteria,
    SnapshotStore,
};

use super::builder::SnapshotStoreBuilder;

/// Snapshot store on top of an object store: one object per snapshot, the
/// bucket listing is the only index.
///
/// Load never fails because of a bad snapshot. A candidate that cannot be
/// fetched or deserialized is skipped for the next older one, and running out
/// of candidates yields `Ok(None)`, the same answer as "no snapshot exists".
/// Skipped candidates are logged at `warn` and reported through
/// [`MetricsReporter::load_attempt_failed`]; watch those if corruption must
/// not go unnoticed.
///
/// Cloning is cheap; clones share every collaborator.
pub struct ObjectSnapshotStore<S> {
    pub(super) client: Arc<dyn ObjectStore>,
    pub(super) serializer: Arc<S>,
    pub(super) key_converter: Arc<dyn KeyConverter>,
    pub(super) bucket_name_resolver: Arc<dyn BucketNameResolver>,
    pub(super) path_prefix_resolver: Arc<dyn PathPrefixResolver>,
    pub(super) metrics: Arc<dyn MetricsReporter>,
    pub(super) trace: Arc<dyn TraceReporter>,
    pub(super) config: Arc<SnapshotStoreConfig>,
}

impl<S> Clone for ObjectSnapshotStore<S> {
    fn clone(&self) -> Self {
        ObjectSnapshotStore {
            client: Arc::clone(&self.client),
            serializer: Arc::clone(&self.serializer),
            key_converter: Arc::clone(&self.key_converter),
            bucket_name_resolver: Arc::clone(&self.bucket_name_resolver),
            path_prefix_resolver: Arc::clone(&self.path_prefix_resolver),
            metrics: Arc::clone(&self.metrics),
            trace: Arc::clone(&self.trace),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: Serializer> ObjectSnapshotStore<S> {
    pub fn builder(client: Arc<dyn ObjectStore>, serializer: S) -> SnapshotStoreBuilder<S> {
        SnapshotStoreBuilder::new(client, serializer)
    }

    pub fn config(&self) -> &SnapshotStoreConfig {
        &self.config
    }

    /// Bucket holding the snapshots of `persistence_id`. The configured
    /// bucket name wins over the resolver.
    pub fn bucket_name(&self, persistence_id: &PersistenceId) -> String {
        match &self.config.bucket_name {
            Some(bucket_name) => bucket_name.clone(),
            None => self.bucket_name_resolver.resolve(persistence_id),
        }
    }

    /// Key prefix for `persistence_id`, without surrounding slashes. The
    /// configured path prefix wins over the resolver.
    pub fn path_prefix(&self, persistence_id: &PersistenceId) -> Option<String> {
        self.config
            .path_prefix
            .clone()
            .or_else(|| self.path_prefix_resolver.resolve(persistence_id))
            .map(|prefix| prefix.trim_matches('/').to_string())
            .filter(|prefix| !prefix.is_empty())
    }

    /// Full object key `metadata` is stored under.
    pub fn object_key(&self, metadata: &SnapshotMetadata) -> String {
        let prefix = self.path_prefix(&metadata.persistence_id);
        self.prefixed_key(prefix.as_deref(), metadata)
    }

    fn prefixed_key(&self, prefix: Option<&str>, metadata: &SnapshotMetadata) -> String {
        let key = self
            .key_converter
            .convert_to(metadata, &self.config.extension_name);
        join_key(prefix, &key)
    }

    fn decode_key(&self, prefix: Option<&str>, key: &str) -> Result<SnapshotMetadata> {
        let relative = match prefix {
            Some(prefix) => key
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('/'))
                .ok_or_else(|| {
                    SnapshotStoreError::malformed_key(key, format!("outside prefix {prefix:?}"))
                })?,
            None => key,
        };
        self.key_converter
            .convert_from(relative, &self.config.extension_name)
    }

    /// Lists, decodes and filters the snapshots of `persistence_id`, oldest
    /// first. Undecodable keys and keys of other ids are dropped.
    async fn list_candidates(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        persistence_id: &PersistenceId,
        criteria: &SnapshotSelectionCriteria,
    ) -> Result<Vec<SnapshotMetadata>> {
        let list_prefix = join_key(prefix, &self.key_converter.list_prefix(persistence_id));
        let keys = self
            .client
            .list(bucket, Some(&list_prefix), &self.config.list_delimiter)
            .await
            .map_err(|e| SnapshotStoreError::object_store("list", e))?;

        let mut candidates: Vec<SnapshotMetadata> = keys
            .iter()
            .filter_map(|key| match self.decode_key(prefix, key) {
                Ok(metadata) => Some(metadata),
                Err(error) => {
                    debug!(bucket, key = key.as_str(), %error, "skipping undecodable key");
                    None
                }
            })
            .filter(|metadata| {
                &metadata.persistence_id == persistence_id && criteria.matches(metadata)
            })
            .collect();
        candidates.sort_by_key(|metadata| metadata.recency());

        debug!(
            bucket,
            prefix = list_prefix.as_str(),
            listed = keys.len(),
            candidates = candidates.len(),
            "listed snapshot candidates"
        );
        Ok(candidates)
    }

    async fn fetch(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        metadata: &SnapshotMetadata,
    ) -> Result<SelectedSnapshot<S::Snapshot>> {
        let key = self.prefixed_key(prefix, metadata);
        let output = self
            .client
            .get(bucket, &key)
            .await
            .map_err(|e| SnapshotStoreError::object_store("get", e))?;
        if !output.status.is_success() {
            return Err(SnapshotStoreError::StoreOperation {
                op: "get",
                status_code: output.status.as_u16(),
            });
        }

        let row = SnapshotRow::new(metadata.clone(), output.body);
        let (metadata, snapshot) = self.serializer.deserialize(row)?;
        Ok(SelectedSnapshot { metadata, snapshot })
    }

    async fn load_latest(
        &self,
        ctx: &Context,
        persistence_id: &PersistenceId,
        criteria: SnapshotSelectionCriteria,
    ) -> Result<Option<SelectedSnapshot<S::Snapshot>>> {
        let bucket = self.bucket_name(persistence_id);
        let prefix = self.path_prefix(persistence_id);
        let candidates = self
            .list_candidates(&bucket, prefix.as_deref(), persistence_id, &criteria)
            .await?;

        let budget = candidates.len().min(self.config.max_load_attempts);
        let recent = &candidates[candidates.len() - budget..];

        // Newest first; each attempt only runs after the previous one failed.
        for metadata in recent.iter().rev() {
            match self.fetch(&bucket, prefix.as_deref(), metadata).await {
                Ok(selected) => {
                    debug!(
                        %persistence_id,
                        sequence_number = metadata.sequence_number.value(),
                        timestamp = metadata.timestamp,
                        "loaded snapshot"
                    );
                    return Ok(Some(selected));
                }
                Err(error) => {
                    warn!(
                        %persistence_id,
                        sequence_number = metadata.sequence_number.value(),
                        timestamp = metadata.timestamp,
                        %error,
                        "snapshot unusable, falling back to an older one"
                    );
                    self.metrics.load_attempt_failed(ctx, metadata, &error);
                }
            }
        }

        debug!(
            %persistence_id,
            candidates = candidates.len(),
            attempted = budget,
            "no usable snapshot"
        );
        Ok(None)
    }

    async fn put(&self, metadata: &SnapshotMetadata, snapshot: S::Snapshot) -> Result<()> {
        let body = self.serializer.serialize(metadata, &snapshot)?;

        let bucket = self.bucket_name(&metadata.persistence_id);
        let key = self.object_key(metadata);
        let content_length = body.len() as u64;
        debug!(bucket = bucket.as_str(), key = key.as_str(), content_length, "saving snapshot");

        let status = self
            .client
            .put(&bucket, &key, body, content_length)
            .await
            .map_err(|e| SnapshotStoreError::object_store("put", e))?;
        if !status.is_success() {
            return Err(SnapshotStoreError::StoreOperation {
                op: "put",
                status_code: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn delete_one(&self, metadata: &SnapshotMetadata) -> Result<()> {
        if metadata.timestamp == 0 {
            let criteria = SnapshotSelectionCriteria::at_sequence(metadata.sequence_number);
            return self
                .delete_matching(&metadata.persistence_id, criteria)
                .await;
        }

        let bucket = self.bucket_name(&metadata.persistence_id);
        let key = self.object_key(metadata);
        debug!(bucket = bucket.as_str(), key = key.as_str(), "deleting snapshot");
        delete_object(self.client.as_ref(), &bucket, &key).await
    }

    /// Fans out one delete task per candidate and waits for all of them. The
    /// first failure, in candidate order, is returned once every task ended.
    async fn delete_matching(
        &self,
        persistence_id: &PersistenceId,
        criteria: SnapshotSelectionCriteria,
    ) -> Result<()> {
        let bucket = self.bucket_name(persistence_id);
        let prefix = self.path_prefix(persistence_id);
        let candidates = self
            .list_candidates(&bucket, prefix.as_deref(), persistence_id, &criteria)
            .await?;

        let handles: Vec<_> = candidates
            .iter()
            .map(|metadata| {
                let client = Arc::clone(&self.client);
                let bucket = bucket.clone();
                let key = self.prefixed_key(prefix.as_deref(), metadata);
                tokio::spawn(
                    async move { delete_object(client.as_ref(), &bucket, &key).await }
                        .instrument(Span::current()),
                )
            })
            .collect();

        let mut first_error = None;
        for (metadata, handle) in candidates.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(SnapshotStoreError::DeleteTask(join_error.to_string())),
            };
            if let Err(error) = outcome {
                warn!(
                    %persistence_id,
                    sequence_number = metadata.sequence_number.value(),
                    timestamp = metadata.timestamp,
                    %error,
                    "snapshot delete failed"
                );
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => {
                debug!(%persistence_id, deleted = candidates.len(), "deleted snapshots");
                Ok(())
            }
        }
    }
}

async fn delete_object(client: &dyn ObjectStore, bucket: &str, key: &str) -> Result<()> {
    let status = client
        .delete(bucket, key)
        .await
        .map_err(|e| SnapshotStoreError::object_store("delete", e))?;
    if !status.is_success() {
        return Err(SnapshotStoreError::StoreOperation {
            op: "delete",
            status_code: status.as_u16(),
        });
    }
    Ok(())
}

fn join_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}/{key}"),
        None => key.to_string(),
    }
}

#[async_trait]
impl<S: Serializer> SnapshotStore for ObjectSnapshotStore<S> {
    type Snapshot = S::Snapshot;

    async fn load(
        &self,
        persistence_id: &PersistenceId,
        criteria: SnapshotSelectionCriteria,
    ) -> Result<Option<SelectedSnapshot<S::Snapshot>>> {
        let ctx = Context::new(persistence_id.clone(), Operation::Load);
        let ctx = self.metrics.before_load(ctx);
        let span = self.trace.span(&ctx);

        let result = self
            .load_latest(&ctx, persistence_id, criteria)
            .instrument(span)
            .await;
        match &result {
            Ok(_) => self.metrics.after_load(&ctx),
            Err(error) => self.metrics.error_load(&ctx, error),
        }
        result
    }

    async fn save(&self, metadata: SnapshotMetadata, snapshot: S::Snapshot) -> Result<()> {
        let ctx = Context::new(metadata.persistence_id.clone(), Operation::Save);
        let ctx = self.metrics.before_save(ctx);
        let span = self.trace.span(&ctx);

        let result = self.put(&metadata, snapshot).instrument(span).await;
        match &result {
            Ok(()) => self.metrics.after_save(&ctx),
            Err(error) => self.metrics.error_save(&ctx, error),
        }
        result
    }

    async fn delete(&self, metadata: SnapshotMetadata) -> Result<()> {
        let ctx = Context::new(metadata.persistence_id.clone(), Operation::Delete);
        let ctx = self.metrics.before_delete(ctx);
        let span = self.trace.span(&ctx);

        let result = self.delete_one(&metadata).instrument(span).await;
        match &result {
            Ok(()) => self.metrics.after_delete(&ctx),
            Err(error) => self.metrics.error_delete(&ctx, error),
        }
        result
    }

    async fn delete_by_criteria(
        &self,
        persistence_id: &PersistenceId,
        criteria: SnapshotSelectionCriteria,
    ) -> Result<()> {
        let ctx = Context::new(persistence_id.clone(), Operation::DeleteByCriteria);
        let ctx = self.metrics.before_delete_by_criteria(ctx);
        let span = self.trace.span(&ctx);

        let result = self
            .delete_matching(persistence_id, criteria)
            .instrument(span)
            .await;
        match &result {
            Ok(()) => self.metrics.after_delete_by_criteria(&ctx),
            Err(error) => self.metrics.error_delete_by_criteria(&ctx, error),
        }
        result
    }
}
