use std::collections::HashSet;
use std::time::Duration;

use sweep::error::ErrorKind;
use sweep::test_utils::pipeline::create_pipeline;
use sweep::test_utils::store::FakeObjectStore;
use sweep_telemetry::init_test_tracing;

#[tokio::test(flavor = "multi_thread")]
async fn sweep_deletes_every_listed_object() {
    init_test_tracing();

    let keys: Vec<String> = (0..25).map(|i| format!("logs/2024/part-{i:02}")).collect();
    let pages = vec![
        keys[0..10].iter().map(String::as_str).collect(),
        keys[10..20].iter().map(String::as_str).collect(),
        keys[20..25].iter().map(String::as_str).collect(),
    ];
    let store = FakeObjectStore::with_pages(pages);

    let pipeline = create_pipeline(&store, "backups", "logs/", 4);
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.submitted, 25);
    assert_eq!(report.succeeded, 25);
    assert_eq!(report.failed, 0);
    assert!(report.failures.is_empty());
    assert!(report.enumeration_error.is_none());

    // Three pages of 10/10/5 need exactly three listing calls.
    assert_eq!(store.list_calls(), 3);

    // Every enumerated object was deleted exactly once.
    let deleted = store.deleted_objects().await;
    assert_eq!(deleted.len(), 25);
    let deleted_keys: HashSet<String> = deleted.into_iter().map(|object| object.key).collect();
    assert_eq!(deleted_keys, keys.into_iter().collect::<HashSet<_>>());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_deletes_are_reported_not_fatal() {
    init_test_tracing();

    let store = FakeObjectStore::with_generated_keys(10, 5);
    store.fail_delete_of("key-00003").await;
    store.fail_delete_of("key-00007").await;

    let pipeline = create_pipeline(&store, "backups", "", 4);
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.submitted, 10);
    assert_eq!(report.succeeded, 8);
    assert_eq!(report.failed, 2);
    assert!(report.enumeration_error.is_none());

    // The failures list names exactly the failing objects, order unspecified.
    let failed_keys: HashSet<String> = report
        .failures
        .into_iter()
        .map(|failure| failure.object.key)
        .collect();
    assert_eq!(
        failed_keys,
        HashSet::from(["key-00003".to_string(), "key-00007".to_string()])
    );

    // The failing objects were still attempted, like every other one.
    assert_eq!(store.delete_attempts().await.len(), 10);
}

#[tokio::test(flavor = "multi_thread")]
async fn listing_failure_aborts_with_partial_report() {
    init_test_tracing();

    let keys: Vec<String> = (0..25).map(|i| format!("key-{i:05}")).collect();
    let pages = vec![
        keys[0..10].iter().map(String::as_str).collect(),
        keys[10..20].iter().map(String::as_str).collect(),
        keys[20..25].iter().map(String::as_str).collect(),
    ];
    let store = FakeObjectStore::with_pages(pages);
    store.fail_listing_of_page(1).await;

    let pipeline = create_pipeline(&store, "backups", "", 4);
    let report = pipeline.run().await.unwrap();

    let err = report.enumeration_error.as_ref().expect("run must surface the listing failure");
    assert_eq!(err.kind(), ErrorKind::EnumerationFailed);

    // Only the first page was enumerated, and all of it was still processed.
    assert_eq!(report.submitted, 10);
    assert_eq!(report.succeeded + report.failed, report.submitted);
    assert_eq!(store.deleted_objects().await.len(), 10);
}

#[tokio::test(flavor = "multi_thread")]
async fn barrier_holds_under_concurrent_stress() {
    init_test_tracing();

    // A slow enumerator repeatedly lets the workers drain the queue while
    // more pages are still coming; the two-condition barrier must not
    // release on those transient empty states.
    let store = FakeObjectStore::with_generated_keys(1000, 100);
    store.randomize_delete_delay(Duration::from_millis(5)).await;
    store.delay_pages(Duration::from_millis(10)).await;

    let pipeline = create_pipeline(&store, "backups", "", 16);
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.submitted, 1000);
    assert_eq!(report.succeeded, 1000);
    assert_eq!(report.failed, 0);

    let deleted = store.deleted_objects().await;
    assert_eq!(deleted.len(), 1000);
    let distinct: HashSet<String> = deleted.into_iter().map(|object| object.key).collect();
    assert_eq!(distinct.len(), 1000);
}

#[tokio::test(flavor = "multi_thread")]
async fn item_failures_never_kill_workers() {
    init_test_tracing();

    let store = FakeObjectStore::with_generated_keys(40, 10);
    store.fail_delete_of("key-00004").await;
    store.fail_delete_of("key-00013").await;
    store.fail_delete_of("key-00027").await;
    store.panic_on_delete_of("key-00008").await;
    store.panic_on_delete_of("key-00031").await;

    let pipeline = create_pipeline(&store, "backups", "", 8);
    let report = pipeline.run().await.unwrap();

    // Every object was processed even though failures and panics were
    // interleaved with them; a dead worker would have stalled the run
    // instead.
    assert_eq!(report.submitted, 40);
    assert_eq!(report.succeeded, 35);
    assert_eq!(report.failed, 5);
    assert_eq!(store.delete_attempts().await.len(), 40);

    let failed_keys: HashSet<String> = report
        .failures
        .into_iter()
        .map(|failure| failure.object.key)
        .collect();
    assert!(failed_keys.contains("key-00008"));
    assert!(failed_keys.contains("key-00031"));
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_signal_stops_enumeration_and_drains() {
    init_test_tracing();

    let store = FakeObjectStore::with_generated_keys(100, 10);
    store.delay_pages(Duration::from_millis(100)).await;

    let pipeline = create_pipeline(&store, "backups", "", 4);
    let shutdown_tx = pipeline.shutdown_tx();

    let run = tokio::spawn(pipeline.run());
    tokio::time::sleep(Duration::from_millis(150)).await;
    shutdown_tx.shutdown().unwrap();

    let report = run.await.unwrap().unwrap();

    let err = report.enumeration_error.as_ref().expect("canceled run must report it");
    assert_eq!(err.kind(), ErrorKind::EnumerationCanceled);

    // The signal landed mid-listing, so only part of the bucket was
    // enumerated, and everything enumerated was still processed.
    assert!(report.submitted < 100);
    assert_eq!(report.succeeded + report.failed, report.submitted);
    assert_eq!(store.deleted_objects().await.len(), report.submitted as usize);
}
