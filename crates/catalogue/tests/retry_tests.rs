//! Retrying catalogue calls and the schema version check at open.

mod common;

use common::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tapecat_catalogue::models::{ArchiveFileSearchCriteria, TapePoolSearchCriteria};
use tapecat_catalogue::{
    CatalogueCursor, CatalogueError, RetryPolicy, RetryingCatalogue, SqliteCatalogue, cursor,
};
use tapecat_core::{SCHEMA_VERSION, SchemaVersion};

fn lost() -> CatalogueError {
    CatalogueError::ConnectionLost("server closed the connection".to_string())
}

#[tokio::test]
async fn test_call_succeeds_after_lost_connections() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    create_tape_world(test.catalogue().as_ref()).await;
    let retrying = RetryingCatalogue::new(
        test.catalogue(),
        RetryPolicy::new(3, Duration::from_millis(1)),
    );

    let calls = &AtomicU32::new(0);
    let criteria = &TapePoolSearchCriteria::default();
    let pools = retrying
        .run(|c| async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                return Err(lost());
            }
            c.tape_pools().get_tape_pools(criteria).await
        })
        .await
        .expect("Call should succeed on the third try");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0].name, "pool1");
}

#[tokio::test]
async fn test_call_fails_when_tries_run_out() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let retrying = RetryingCatalogue::new(
        test.catalogue(),
        RetryPolicy::new(2, Duration::from_millis(1)),
    );

    let calls = &AtomicU32::new(0);
    let err = retrying
        .run(|c| async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                return Err(lost());
            }
            c.ping().await
        })
        .await
        .expect_err("two tries are not enough");
    assert!(err.is_connection_lost());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_validation_errors_are_not_retried() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let retrying = RetryingCatalogue::new(
        test.catalogue(),
        RetryPolicy::new(5, Duration::from_millis(1)),
    );

    let calls = &AtomicU32::new(0);
    let err = retrying
        .run(|c| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            c.tapes().get_tape("").await
        })
        .await
        .expect_err("empty vid");
    assert!(matches!(err, CatalogueError::EmptyField { field: "vid" }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retrying_cursor_over_archive_files() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let retrying = RetryingCatalogue::new(
        test.catalogue(),
        RetryPolicy::new(3, Duration::from_millis(1)),
    );

    let opens = &AtomicU32::new(0);
    let criteria = &ArchiveFileSearchCriteria::default();
    let mut files = retrying
        .cursor(|c| async move {
            if opens.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(lost());
            }
            c.archive_files().get_archive_files(criteria).await
        })
        .await
        .expect("Open cursor failed");
    assert_eq!(opens.load(Ordering::SeqCst), 2);
    assert!(!files.has_more().await.expect("has_more failed"));
    assert!(
        cursor::collect(&mut files)
            .await
            .expect("Drain failed")
            .is_empty()
    );
}

#[tokio::test]
async fn test_open_checks_schema_version() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    assert_eq!(
        test.catalogue()
            .get_schema_version()
            .await
            .expect("Get schema version failed"),
        SCHEMA_VERSION
    );

    let mut config = test.config.clone();
    config.expected_schema_version = Some(SchemaVersion::new(2, 0));
    let err = SqliteCatalogue::open(&config)
        .await
        .err()
        .expect("schema 1.0 is not 2.0");
    match err {
        CatalogueError::SchemaMismatch { expected, found } => {
            assert_eq!(expected, SchemaVersion::new(2, 0));
            assert_eq!(found, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }

    // A mismatch is not a lost connection and is reported on the first try.
    let err = tapecat_catalogue::open_with_retry(&config)
        .await
        .err()
        .expect("schema 1.0 is not 2.0");
    assert!(matches!(err, CatalogueError::SchemaMismatch { .. }));
}

#[tokio::test]
async fn test_open_with_retry_serves_calls() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config =
        tapecat_core::config::CatalogueConfig::for_testing(temp_dir.path().join("nested/cat.db"));
    let retrying = tapecat_catalogue::open_with_retry(&config)
        .await
        .expect("Open failed");
    retrying.ping().await.expect("Ping failed");
    retrying
        .verify_schema_version()
        .await
        .expect("Schema version check failed");
    assert_eq!(retrying.policy().max_tries, config.max_tries_to_connect);

    let catalogue: Arc<_> = Arc::clone(retrying.inner());
    create_vo_world(catalogue.as_ref()).await;
    let vos = retrying
        .run(|c| async move { c.vos().get_virtual_organizations().await })
        .await
        .expect("List VOs failed");
    assert_eq!(vos.len(), 1);
}
