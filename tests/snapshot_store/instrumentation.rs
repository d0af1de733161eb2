use std::sync::{Arc, Mutex};

use sourced_snapshots::{
    Context, InMemoryMetricsReporter, MetricsReporter, ObjectSnapshotStore, ObjectStoreError,
    Operation, Result, Serializer, SnapshotMetadata, SnapshotRow, SnapshotSelectionCriteria,
    SnapshotStore, SnapshotStoreError, TraceReporter, TracingTraceReporter,
};
use tracing::Span;

use crate::support::*;

/// Records every hook call as `"<hook> <context id> <tenant attribute>"`.
#[derive(Default)]
struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    fn record(&self, hook: &str, ctx: &Context) {
        self.events.lock().unwrap().push(format!(
            "{hook} {} {}",
            ctx.id(),
            ctx.attribute("tenant").unwrap_or("-")
        ));
    }

    fn hooks(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.split(' ').next().unwrap_or_default().to_string())
            .collect()
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl MetricsReporter for RecordingReporter {
    fn before_load(&self, ctx: Context) -> Context {
        let ctx = ctx.with_attribute("tenant", "acme");
        self.record("before_load", &ctx);
        ctx
    }
    fn after_load(&self, ctx: &Context) {
        self.record("after_load", ctx)
    }
    fn error_load(&self, ctx: &Context, _error: &SnapshotStoreError) {
        self.record("error_load", ctx)
    }
    fn load_attempt_failed(
        &self,
        ctx: &Context,
        metadata: &SnapshotMetadata,
        _error: &SnapshotStoreError,
    ) {
        self.record(
            &format!("load_attempt_failed:{}", metadata.sequence_number),
            ctx,
        )
    }

    fn before_save(&self, ctx: Context) -> Context {
        let ctx = ctx.with_attribute("tenant", "acme");
        self.record("before_save", &ctx);
        ctx
    }
    fn after_save(&self, ctx: &Context) {
        self.record("after_save", ctx)
    }
    fn error_save(&self, ctx: &Context, _error: &SnapshotStoreError) {
        self.record("error_save", ctx)
    }

    fn before_delete(&self, ctx: Context) -> Context {
        self.record("before_delete", &ctx);
        ctx
    }
    fn after_delete(&self, ctx: &Context) {
        self.record("after_delete", ctx)
    }
    fn error_delete(&self, ctx: &Context, _error: &SnapshotStoreError) {
        self.record("error_delete", ctx)
    }

    fn before_delete_by_criteria(&self, ctx: Context) -> Context {
        self.record("before_delete_by_criteria", &ctx);
        ctx
    }
    fn after_delete_by_criteria(&self, ctx: &Context) {
        self.record("after_delete_by_criteria", ctx)
    }
    fn error_delete_by_criteria(&self, ctx: &Context, _error: &SnapshotStoreError) {
        self.record("error_delete_by_criteria", ctx)
    }
}

#[derive(Default)]
struct CountingTraceReporter {
    operations: Mutex<Vec<Operation>>,
}

impl TraceReporter for CountingTraceReporter {
    fn span(&self, ctx: &Context) -> Span {
        self.operations.lock().unwrap().push(ctx.operation());
        Span::none()
    }
}

/// Refuses to serialize carts whose total is 13.
struct SuperstitiousSerializer;

impl Serializer for SuperstitiousSerializer {
    type Snapshot = CartSnapshot;

    fn serialize(&self, _metadata: &SnapshotMetadata, snapshot: &CartSnapshot) -> Result<Vec<u8>> {
        if snapshot.total == 13 {
            return Err(SnapshotStoreError::Serialization("unlucky cart".into()));
        }
        serde_json::to_vec(snapshot).map_err(|e| SnapshotStoreError::Serialization(e.to_string()))
    }

    fn deserialize(&self, row: SnapshotRow) -> Result<(SnapshotMetadata, CartSnapshot)> {
        let snapshot = serde_json::from_slice(&row.payload)
            .map_err(|e| SnapshotStoreError::Deserialization(e.to_string()))?;
        Ok((row.metadata(), snapshot))
    }
}

fn instrumented(
    client: &Arc<FaultyObjectStore>,
    reporter: &Arc<RecordingReporter>,
) -> ObjectSnapshotStore<SuperstitiousSerializer> {
    ObjectSnapshotStore::builder(client.clone(), SuperstitiousSerializer)
        .with_config(config())
        .with_metrics_reporter(reporter.clone())
        .build()
        .unwrap()
}

#[tokio::test]
async fn enriched_context_reaches_after_hook() {
    let client = FaultyObjectStore::new();
    let reporter = Arc::new(RecordingReporter::default());
    let store = instrumented(&client, &reporter);

    store.save(meta("Cart|1", 1, 10), cart(1)).await.unwrap();

    let events = reporter.events();
    assert_eq!(reporter.hooks(), vec!["before_save", "after_save"]);
    // Same context id and the attribute added by `before_save`.
    let before: Vec<&str> = events[0].split(' ').collect();
    let after: Vec<&str> = events[1].split(' ').collect();
    assert_eq!(before[1], after[1]);
    assert_eq!(after[2], "acme");
}

#[tokio::test]
async fn serialization_failure_fires_error_hook_and_propagates() {
    let client = FaultyObjectStore::new();
    let reporter = Arc::new(RecordingReporter::default());
    let store = instrumented(&client, &reporter);

    let err = store.save(meta("Cart|1", 1, 10), cart(13)).await.unwrap_err();

    assert!(matches!(err, SnapshotStoreError::Serialization(_)));
    assert_eq!(reporter.hooks(), vec!["before_save", "error_save"]);
    assert!(client.keys().is_empty());
}

#[tokio::test]
async fn swallowed_load_failures_are_reported() {
    let client = FaultyObjectStore::new();
    let reporter = Arc::new(RecordingReporter::default());
    let store = instrumented(&client, &reporter);
    store.save(meta("Cart|1", 1, 10), cart(1)).await.unwrap();
    store.save(meta("Cart|1", 2, 20), cart(2)).await.unwrap();
    client.fail_get_with("Cart|1/2.20.snapshot", 500);
    reporter.events.lock().unwrap().clear();

    let loaded = store
        .load(&pid("Cart|1"), SnapshotSelectionCriteria::latest())
        .await
        .unwrap();

    assert_eq!(loaded.map(|s| s.snapshot), Some(cart(1)));
    assert_eq!(
        reporter.hooks(),
        vec!["before_load", "load_attempt_failed:2", "after_load"]
    );
}

#[tokio::test]
async fn list_failure_fires_error_load() {
    let client = FaultyObjectStore::new();
    let reporter = Arc::new(RecordingReporter::default());
    let store = instrumented(&client, &reporter);
    client.fail_lists_with(ObjectStoreError::Request("timeout".into()));

    assert!(store
        .load(&pid("Cart|1"), SnapshotSelectionCriteria::latest())
        .await
        .is_err());
    assert_eq!(reporter.hooks(), vec!["before_load", "error_load"]);
}

#[tokio::test]
async fn sentinel_delete_reports_as_single_delete() {
    let client = FaultyObjectStore::new();
    let reporter = Arc::new(RecordingReporter::default());
    let store = instrumented(&client, &reporter);
    store.save(meta("Cart|1", 1, 10), cart(1)).await.unwrap();
    reporter.events.lock().unwrap().clear();

    store.delete(meta("Cart|1", 1, 0)).await.unwrap();
    store
        .delete_by_criteria(&pid("Cart|1"), SnapshotSelectionCriteria::latest())
        .await
        .unwrap();

    assert_eq!(
        reporter.hooks(),
        vec![
            "before_delete",
            "after_delete",
            "before_delete_by_criteria",
            "after_delete_by_criteria"
        ]
    );
}

#[tokio::test]
async fn failed_delete_fires_error_delete() {
    let client = FaultyObjectStore::new();
    let reporter = Arc::new(RecordingReporter::default());
    let store = instrumented(&client, &reporter);
    client.fail_delete_with("Cart|1/1.10.snapshot", 500);

    assert!(store.delete(meta("Cart|1", 1, 10)).await.is_err());
    assert_eq!(reporter.hooks(), vec!["before_delete", "error_delete"]);
}

#[tokio::test]
async fn in_memory_metrics_count_outcomes() {
    let client = FaultyObjectStore::new();
    let metrics = Arc::new(InMemoryMetricsReporter::new());
    let store = ObjectSnapshotStore::builder(client.clone(), SuperstitiousSerializer)
        .with_config(config())
        .with_metrics_reporter(metrics.clone())
        .build()
        .unwrap();

    store.save(meta("Cart|1", 1, 10), cart(1)).await.unwrap();
    store.save(meta("Cart|1", 2, 20), cart(2)).await.unwrap();
    let _ = store.save(meta("Cart|1", 3, 30), cart(13)).await;
    client.fail_get_with("Cart|1/2.20.snapshot", 500);
    store
        .load(&pid("Cart|1"), SnapshotSelectionCriteria::latest())
        .await
        .unwrap();

    let save = metrics.stats(Operation::Save);
    assert_eq!((save.started, save.succeeded, save.failed), (3, 2, 1));
    let load = metrics.stats(Operation::Load);
    assert_eq!((load.started, load.succeeded, load.failed), (1, 1, 0));
    assert_eq!(metrics.load_attempt_failures(), 1);
}

#[tokio::test]
async fn trace_reporter_wraps_every_operation() {
    let client = FaultyObjectStore::new();
    let trace = Arc::new(CountingTraceReporter::default());
    let store = ObjectSnapshotStore::builder(client.clone(), SuperstitiousSerializer)
        .with_config(config())
        .with_trace_reporter(trace.clone())
        .build()
        .unwrap();

    store.save(meta("Cart|1", 1, 10), cart(1)).await.unwrap();
    store
        .load(&pid("Cart|1"), SnapshotSelectionCriteria::latest())
        .await
        .unwrap();
    store.delete(meta("Cart|1", 1, 10)).await.unwrap();
    store
        .delete_by_criteria(&pid("Cart|1"), SnapshotSelectionCriteria::latest())
        .await
        .unwrap();

    assert_eq!(
        *trace.operations.lock().unwrap(),
        vec![
            Operation::Save,
            Operation::Load,
            Operation::Delete,
            Operation::DeleteByCriteria
        ]
    );
}

#[tokio::test]
async fn tracing_reporter_does_not_change_results() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    let client = FaultyObjectStore::new();
    let store = ObjectSnapshotStore::builder(client.clone(), SuperstitiousSerializer)
        .with_config(config())
        .with_trace_reporter(Arc::new(TracingTraceReporter))
        .build()
        .unwrap();

    store.save(meta("Cart|1", 1, 10), cart(1)).await.unwrap();
    let err = store.save(meta("Cart|1", 2, 20), cart(13)).await.unwrap_err();
    assert!(matches!(err, SnapshotStoreError::Serialization(_)));

    let loaded = store
        .load(&pid("Cart|1"), SnapshotSelectionCriteria::latest())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.snapshot, cart(1));
}
