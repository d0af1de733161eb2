use sourced_snapshots::{
    JsonSerializer, ObjectSnapshotStore, ObjectStoreError, SnapshotSelectionCriteria,
    SnapshotStore, SnapshotStoreError,
};

use crate::support::*;

#[tokio::test]
async fn save_writes_one_object_at_the_derived_key() {
    let client = FaultyObjectStore::new();
    let store = store(&client, config());

    store.save(meta("Cart|1", 3, 100), cart(2)).await.unwrap();

    assert_eq!(client.keys(), vec!["Cart|1/3.100.snapshot".to_string()]);
    assert_eq!(store.object_key(&meta("Cart|1", 3, 100)), "Cart|1/3.100.snapshot");
}

#[tokio::test]
async fn saved_snapshot_loads_back() {
    let client = FaultyObjectStore::new();
    let store = store(&client, config());

    store.save(meta("Cart|1", 3, 100), cart(2)).await.unwrap();
    let loaded = store
        .load(&pid("Cart|1"), SnapshotSelectionCriteria::latest())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(loaded.metadata, meta("Cart|1", 3, 100));
    assert_eq!(loaded.snapshot, cart(2));
}

#[tokio::test]
async fn server_error_on_put_is_a_store_operation_error() {
    let client = FaultyObjectStore::new();
    client.fail_puts_with(500);
    let store = store(&client, config());

    let err = store.save(meta("Cart|1", 3, 100), cart(1)).await.unwrap_err();

    assert_eq!(
        err,
        SnapshotStoreError::StoreOperation {
            op: "put",
            status_code: 500
        }
    );
    assert_eq!(err.status_code(), Some(500));
    assert!(client.keys().is_empty());
}

#[tokio::test]
async fn missing_bucket_surfaces_client_error() {
    let client = FaultyObjectStore::new();
    let store = store(&client, config().with_bucket_name("not-created"));

    let err = store.save(meta("Cart|1", 1, 1), cart(1)).await.unwrap_err();

    assert_eq!(
        err,
        SnapshotStoreError::ObjectStore {
            op: "put",
            source: ObjectStoreError::NoSuchBucket("not-created".into()),
        }
    );
}

#[tokio::test]
async fn path_prefix_is_prepended_to_keys() {
    let client = FaultyObjectStore::new();
    let store = store(&client, config().with_path_prefix("tenant-a"));

    store.save(meta("Cart|1", 1, 10), cart(1)).await.unwrap();
    assert_eq!(client.keys(), vec!["tenant-a/Cart|1/1.10.snapshot".to_string()]);

    let loaded = store
        .load(&pid("Cart|1"), SnapshotSelectionCriteria::latest())
        .await
        .unwrap();
    assert_eq!(loaded.map(|s| s.snapshot), Some(cart(1)));
}

#[tokio::test]
async fn extension_name_is_part_of_the_key() {
    let client = FaultyObjectStore::new();
    let store = store(&client, config().with_extension_name("json"));

    store.save(meta("Cart|1", 1, 10), cart(1)).await.unwrap();
    assert_eq!(client.keys(), vec!["Cart|1/1.10.json".to_string()]);
}

#[cfg(feature = "bitcode")]
#[tokio::test]
async fn bitcode_serializer_round_trips_through_the_store() {
    use sourced_snapshots::BitcodeSerializer;

    let client = FaultyObjectStore::new();
    let store = ObjectSnapshotStore::builder(client.clone(), BitcodeSerializer::<CartSnapshot>::new())
        .with_config(config())
        .build()
        .unwrap();

    store.save(meta("Cart|1", 9, 90), cart(3)).await.unwrap();
    let loaded = store
        .load(&pid("Cart|1"), SnapshotSelectionCriteria::latest())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.snapshot, cart(3));
}

#[tokio::test]
async fn json_serializer_store_is_cloneable() {
    let client = FaultyObjectStore::new();
    let store: ObjectSnapshotStore<JsonSerializer<CartSnapshot>> = store(&client, config());
    let clone = store.clone();

    store.save(meta("Cart|1", 1, 1), cart(1)).await.unwrap();
    assert!(clone
        .load(&pid("Cart|1"), SnapshotSelectionCriteria::latest())
        .await
        .unwrap()
        .is_some());
}
