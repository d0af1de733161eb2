//! Store configuration.
//!
//! Strategy fields hold identifiers resolved through the `*Kind` registries
//! when the store is built; an unknown identifier refuses to build.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotStoreError};
use crate::instrument::{MetricsReporterKind, TraceReporterKind};
use crate::key::KeyConverterKind;
use crate::resolver::{BucketNameResolverKind, PathPrefixResolverKind};

pub const DEFAULT_MAX_LOAD_ATTEMPTS: usize = 3;
pub const DEFAULT_EXTENSION_NAME: &str = "snapshot";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotStoreConfig {
    /// Static bucket; wins over the bucket name resolver.
    pub bucket_name: Option<String>,
    /// Static key prefix; wins over the path prefix resolver.
    pub path_prefix: Option<String>,
    /// How many of the most recent candidates load will try.
    pub max_load_attempts: usize,
    pub extension_name: String,
    pub list_delimiter: String,
    pub key_converter: String,
    pub bucket_name_resolver: String,
    pub bucket_name_base: String,
    pub bucket_shards: u32,
    pub path_prefix_resolver: String,
    pub metrics_reporter: Option<String>,
    pub trace_reporter: Option<String>,
}

impl Default for SnapshotStoreConfig {
    fn default() -> Self {
        SnapshotStoreConfig {
            bucket_name: None,
            path_prefix: None,
            max_load_attempts: DEFAULT_MAX_LOAD_ATTEMPTS,
            extension_name: DEFAULT_EXTENSION_NAME.to_string(),
            list_delimiter: "/".to_string(),
            key_converter: KeyConverterKind::Default.to_string(),
            bucket_name_resolver: BucketNameResolverKind::PersistenceId.to_string(),
            bucket_name_base: "snapshots".to_string(),
            bucket_shards: 1,
            path_prefix_resolver: PathPrefixResolverKind::None.to_string(),
            metrics_reporter: None,
            trace_reporter: None,
        }
    }
}

impl SnapshotStoreConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SnapshotStoreConfig = serde_json::from_str(json)
            .map_err(|e| SnapshotStoreError::Configuration(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SnapshotStoreError::Configuration(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn with_bucket_name(mut self, bucket_name: impl Into<String>) -> Self {
        self.bucket_name = Some(bucket_name.into());
        self
    }

    pub fn with_path_prefix(mut self, path_prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(path_prefix.into());
        self
    }

    pub fn with_max_load_attempts(mut self, max_load_attempts: usize) -> Self {
        self.max_load_attempts = max_load_attempts;
        self
    }

    pub fn with_extension_name(mut self, extension_name: impl Into<String>) -> Self {
        self.extension_name = extension_name.into();
        self
    }

    pub fn with_list_delimiter(mut self, list_delimiter: impl Into<String>) -> Self {
        self.list_delimiter = list_delimiter.into();
        self
    }

    /// Checks values and that every strategy identifier names a known strategy.
    pub fn validate(&self) -> Result<()> {
        if self.max_load_attempts == 0 {
            return Err(SnapshotStoreError::Configuration(
                "max_load_attempts must be at least 1".into(),
            ));
        }
        if self.extension_name.is_empty() || self.extension_name.contains('/') {
            return Err(SnapshotStoreError::Configuration(format!(
                "invalid extension_name: {:?}",
                self.extension_name
            )));
        }
        // The delimiter must never occur in `{seq}.{ts}.{extension}`, otherwise
        // listing folds every snapshot into a common prefix.
        let in_file_name =
            |c: char| c == '.' || c.is_ascii_digit() || self.extension_name.contains(c);
        if self.list_delimiter.chars().any(in_file_name) {
            return Err(SnapshotStoreError::Configuration(format!(
                "list_delimiter {:?} collides with snapshot file names",
                self.list_delimiter
            )));
        }
        if self.bucket_shards == 0 {
            return Err(SnapshotStoreError::Configuration(
                "bucket_shards must be at least 1".into(),
            ));
        }
        if matches!(&self.bucket_name, Some(name) if name.is_empty()) {
            return Err(SnapshotStoreError::Configuration(
                "bucket_name must not be empty".into(),
            ));
        }
        self.key_converter_kind()?;
        self.bucket_name_resolver_kind()?;
        self.path_prefix_resolver_kind()?;
        self.metrics_reporter_kind()?;
        self.trace_reporter_kind()?;
        Ok(())
    }

    pub fn key_converter_kind(&self) -> Result<KeyConverterKind> {
        self.key_converter.parse()
    }

    pub fn bucket_name_resolver_kind(&self) -> Result<BucketNameResolverKind> {
        self.bucket_name_resolver.parse()
    }

    pub fn path_prefix_resolver_kind(&self) -> Result<PathPrefixResolverKind> {
        self.path_prefix_resolver.parse()
    }

    pub fn metrics_reporter_kind(&self) -> Result<MetricsReporterKind> {
        self.metrics_reporter
            .as_deref()
            .map_or(Ok(MetricsReporterKind::None), |id| id.parse())
    }

    pub fn trace_reporter_kind(&self) -> Result<TraceReporterKind> {
        self.trace_reporter
            .as_deref()
            .map_or(Ok(TraceReporterKind::None), |id| id.parse())
    }
}
