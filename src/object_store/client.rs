use std::fmt;

use async_trait::async_trait;

use crate::error::ObjectStoreError;

/// Status returned by the object store for a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Response of a `get`: status plus body (empty on failure).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetObjectOutput {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Minimal bucket/key/object client the snapshot store runs on.
///
/// Any non-success status is a failure carrying that code. `Err` is reserved
/// for requests that never produced a status.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_length: u64,
    ) -> Result<StatusCode, ObjectStoreError>;

    async fn get(&self, bucket: &str, key: &str) -> Result<GetObjectOutput, ObjectStoreError>;

    async fn delete(&self, bucket: &str, key: &str) -> Result<StatusCode, ObjectStoreError>;

    /// Keys in `bucket` starting with `prefix`. Keys whose remainder after the
    /// prefix contains `delimiter` are rolled up and not returned.
    async fn list(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: &str,
    ) -> Result<Vec<String>, ObjectStoreError>;
}
