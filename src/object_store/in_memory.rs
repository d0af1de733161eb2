use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::ObjectStoreError;

use super::client::{GetObjectOutput, ObjectStore, StatusCode};

type Buckets = HashMap<String, BTreeMap<String, Vec<u8>>>;

/// In-memory object store backed by `Arc<RwLock<HashMap>>`.
///
/// Clone-friendly (cloning shares the same underlying storage). Buckets must
/// be created before use, like a real object store.
#[derive(Clone, Default)]
pub struct InMemoryObjectStore {
    buckets: Arc<RwLock<Buckets>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buckets<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let storage: Buckets = buckets
            .into_iter()
            .map(|bucket| (bucket.into(), BTreeMap::new()))
            .collect();
        InMemoryObjectStore {
            buckets: Arc::new(RwLock::new(storage)),
        }
    }

    pub fn create_bucket(&self, bucket: &str) -> Result<(), ObjectStoreError> {
        let mut storage = self
            .buckets
            .write()
            .map_err(|_| ObjectStoreError::LockPoisoned("create bucket"))?;
        storage.entry(bucket.to_string()).or_default();
        Ok(())
    }

    /// Every key in `bucket`, in lexical order.
    pub fn keys(&self, bucket: &str) -> Result<Vec<String>, ObjectStoreError> {
        let storage = self
            .buckets
            .read()
            .map_err(|_| ObjectStoreError::LockPoisoned("keys"))?;
        let objects = storage
            .get(bucket)
            .ok_or_else(|| ObjectStoreError::NoSuchBucket(bucket.to_string()))?;
        Ok(objects.keys().cloned().collect())
    }

    /// Write raw bytes, bypassing the content-length check. Useful for
    /// planting foreign or corrupt objects.
    pub fn insert_raw(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<(), ObjectStoreError> {
        let mut storage = self
            .buckets
            .write()
            .map_err(|_| ObjectStoreError::LockPoisoned("insert"))?;
        storage
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body);
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_length: u64,
    ) -> Result<StatusCode, ObjectStoreError> {
        if body.len() as u64 != content_length {
            return Ok(StatusCode(400));
        }
        let mut storage = self
            .buckets
            .write()
            .map_err(|_| ObjectStoreError::LockPoisoned("put"))?;
        let objects = storage
            .get_mut(bucket)
            .ok_or_else(|| ObjectStoreError::NoSuchBucket(bucket.to_string()))?;
        objects.insert(key.to_string(), body);
        Ok(StatusCode::OK)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<GetObjectOutput, ObjectStoreError> {
        let storage = self
            .buckets
            .read()
            .map_err(|_| ObjectStoreError::LockPoisoned("get"))?;
        let objects = storage
            .get(bucket)
            .ok_or_else(|| ObjectStoreError::NoSuchBucket(bucket.to_string()))?;
        Ok(match objects.get(key) {
            Some(body) => GetObjectOutput {
                status: StatusCode::OK,
                body: body.clone(),
            },
            None => GetObjectOutput {
                status: StatusCode::NOT_FOUND,
                body: Vec::new(),
            },
        })
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<StatusCode, ObjectStoreError> {
        let mut storage = self
            .buckets
            .write()
            .map_err(|_| ObjectStoreError::LockPoisoned("delete"))?;
        let objects = storage
            .get_mut(bucket)
            .ok_or_else(|| ObjectStoreError::NoSuchBucket(bucket.to_string()))?;
        objects.remove(key);
        Ok(StatusCode::NO_CONTENT)
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: &str,
    ) -> Result<Vec<String>, ObjectStoreError> {
        let storage = self
            .buckets
            .read()
            .map_err(|_| ObjectStoreError::LockPoisoned("list"))?;
        let objects = storage
            .get(bucket)
            .ok_or_else(|| ObjectStoreError::NoSuchBucket(bucket.to_string()))?;
        let prefix = prefix.unwrap_or("");

        Ok(objects
            .keys()
            .filter_map(|key| {
                let rest = key.strip_prefix(prefix)?;
                if !delimiter.is_empty() && rest.contains(delimiter) {
                    return None;
                }
                Some(key.clone())
            })
            .collect())
    }
}
