//! Optional cross-cutting hooks around every snapshot store operation.
//!
//! Absence is modelled by the no-op implementations, which the store invokes
//! unconditionally.

mod context;
mod metrics;
mod trace;

pub use context::{Context, Operation};
pub use metrics::{
    InMemoryMetricsReporter, MetricsReporter, MetricsReporterKind, NoopMetricsReporter,
    OperationStats,
};
pub use trace::{NoopTraceReporter, TraceReporter, TraceReporterKind, TracingTraceReporter};
