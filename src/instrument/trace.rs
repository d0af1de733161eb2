use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::Span;

use crate::error::{Result, SnapshotStoreError};

use super::context::Context;

/// Supplies the span an operation runs in.
///
/// The store drives the whole operation future inside the returned span, so
/// the span covers every poll from the first object-store call to the last.
pub trait TraceReporter: Send + Sync {
    fn span(&self, _ctx: &Context) -> Span {
        Span::none()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTraceReporter;

impl TraceReporter for NoopTraceReporter {}

/// Opens an `info` span per operation through the `tracing` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTraceReporter;

impl TraceReporter for TracingTraceReporter {
    fn span(&self, ctx: &Context) -> Span {
        tracing::info_span!(
            "snapshot_store",
            operation = ctx.operation().as_str(),
            persistence_id = %ctx.persistence_id(),
            context_id = %ctx.id(),
        )
    }
}

/// Registry of built-in trace reporters, selectable by identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceReporterKind {
    #[default]
    None,
    Tracing,
}

impl TraceReporterKind {
    pub fn build(self) -> Arc<dyn TraceReporter> {
        match self {
            TraceReporterKind::None => Arc::new(NoopTraceReporter),
            TraceReporterKind::Tracing => Arc::new(TracingTraceReporter),
        }
    }
}

impl FromStr for TraceReporterKind {
    type Err = SnapshotStoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(TraceReporterKind::None),
            "tracing" => Ok(TraceReporterKind::Tracing),
            other => Err(SnapshotStoreError::Configuration(format!(
                "unknown trace reporter: {other}"
            ))),
        }
    }
}

impl fmt::Display for TraceReporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceReporterKind::None => f.write_str("none"),
            TraceReporterKind::Tracing => f.write_str("tracing"),
        }
    }
}
