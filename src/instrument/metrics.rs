use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{Result, SnapshotStoreError};
use crate::snapshot::SnapshotMetadata;

use super::context::{Context, Operation};

/// Observational hooks around every store operation.
///
/// `before_*` runs before the operation starts and may return an enriched
/// context, which every later hook of the same call receives. Exactly one of
/// `after_*` / `error_*` runs once the operation has finished. Hooks cannot
/// change the outcome.
pub trait MetricsReporter: Send + Sync {
    fn before_load(&self, ctx: Context) -> Context {
        ctx
    }
    fn after_load(&self, _ctx: &Context) {}
    fn error_load(&self, _ctx: &Context, _error: &SnapshotStoreError) {}

    /// A candidate failed to fetch or deserialize and load fell back to the
    /// next older one. The load itself still reports through `after_load`.
    fn load_attempt_failed(
        &self,
        _ctx: &Context,
        _metadata: &SnapshotMetadata,
        _error: &SnapshotStoreError,
    ) {
    }

    fn before_save(&self, ctx: Context) -> Context {
        ctx
    }
    fn after_save(&self, _ctx: &Context) {}
    fn error_save(&self, _ctx: &Context, _error: &SnapshotStoreError) {}

    fn before_delete(&self, ctx: Context) -> Context {
        ctx
    }
    fn after_delete(&self, _ctx: &Context) {}
    fn error_delete(&self, _ctx: &Context, _error: &SnapshotStoreError) {}

    fn before_delete_by_criteria(&self, ctx: Context) -> Context {
        ctx
    }
    fn after_delete_by_criteria(&self, _ctx: &Context) {}
    fn error_delete_by_criteria(&self, _ctx: &Context, _error: &SnapshotStoreError) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetricsReporter;

impl MetricsReporter for NoopMetricsReporter {}

#[derive(Debug, Default)]
struct OperationCounters {
    started: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    last_elapsed_micros: AtomicU64,
}

/// Snapshot of one operation's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OperationStats {
    pub started: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub last_elapsed_micros: u64,
}

/// Counts calls and outcomes per operation with lock-free counters.
#[derive(Debug, Default)]
pub struct InMemoryMetricsReporter {
    load: OperationCounters,
    save: OperationCounters,
    delete: OperationCounters,
    delete_by_criteria: OperationCounters,
    load_attempt_failures: AtomicU64,
}

impl InMemoryMetricsReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self, operation: Operation) -> OperationStats {
        let counters = self.counters(operation);
        OperationStats {
            started: counters.started.load(Ordering::Relaxed),
            succeeded: counters.succeeded.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            last_elapsed_micros: counters.last_elapsed_micros.load(Ordering::Relaxed),
        }
    }

    pub fn load_attempt_failures(&self) -> u64 {
        self.load_attempt_failures.load(Ordering::Relaxed)
    }

    fn counters(&self, operation: Operation) -> &OperationCounters {
        match operation {
            Operation::Load => &self.load,
            Operation::Save => &self.save,
            Operation::Delete => &self.delete,
            Operation::DeleteByCriteria => &self.delete_by_criteria,
        }
    }

    fn started(&self, ctx: Context) -> Context {
        self.counters(ctx.operation())
            .started
            .fetch_add(1, Ordering::Relaxed);
        ctx
    }

    fn finished(&self, ctx: &Context, ok: bool) {
        let counters = self.counters(ctx.operation());
        let outcome = if ok {
            &counters.succeeded
        } else {
            &counters.failed
        };
        outcome.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(ctx.elapsed().as_micros()).unwrap_or(u64::MAX);
        counters.last_elapsed_micros.store(micros, Ordering::Relaxed);
    }
}

impl MetricsReporter for InMemoryMetricsReporter {
    fn before_load(&self, ctx: Context) -> Context {
        self.started(ctx)
    }
    fn after_load(&self, ctx: &Context) {
        self.finished(ctx, true)
    }
    fn error_load(&self, ctx: &Context, _error: &SnapshotStoreError) {
        self.finished(ctx, false)
    }
    fn load_attempt_failed(
        &self,
        _ctx: &Context,
        _metadata: &SnapshotMetadata,
        _error: &SnapshotStoreError,
    ) {
        self.load_attempt_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn before_save(&self, ctx: Context) -> Context {
        self.started(ctx)
    }
    fn after_save(&self, ctx: &Context) {
        self.finished(ctx, true)
    }
    fn error_save(&self, ctx: &Context, _error: &SnapshotStoreError) {
        self.finished(ctx, false)
    }

    fn before_delete(&self, ctx: Context) -> Context {
        self.started(ctx)
    }
    fn after_delete(&self, ctx: &Context) {
        self.finished(ctx, true)
    }
    fn error_delete(&self, ctx: &Context, _error: &SnapshotStoreError) {
        self.finished(ctx, false)
    }

    fn before_delete_by_criteria(&self, ctx: Context) -> Context {
        self.started(ctx)
    }
    fn after_delete_by_criteria(&self, ctx: &Context) {
        self.finished(ctx, true)
    }
    fn error_delete_by_criteria(&self, ctx: &Context, _error: &SnapshotStoreError) {
        self.finished(ctx, false)
    }
}

/// Registry of built-in metrics reporters, selectable by identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MetricsReporterKind {
    #[default]
    None,
    InMemory,
}

impl MetricsReporterKind {
    pub fn build(self) -> Arc<dyn MetricsReporter> {
        match self {
            MetricsReporterKind::None => Arc::new(NoopMetricsReporter),
            MetricsReporterKind::InMemory => Arc::new(InMemoryMetricsReporter::new()),
        }
    }
}

impl FromStr for MetricsReporterKind {
    type Err = SnapshotStoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(MetricsReporterKind::None),
            "in-memory" => Ok(MetricsReporterKind::InMemory),
            other => Err(SnapshotStoreError::Configuration(format!(
                "unknown metrics reporter: {other}"
            ))),
        }
    }
}

impl fmt::Display for MetricsReporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsReporterKind::None => f.write_str("none"),
            MetricsReporterKind::InMemory => f.write_str("in-memory"),
        }
    }
}
