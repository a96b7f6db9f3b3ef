//! Archive files, their tape copies, listing cursors and the recycle log.

mod common;

use common::*;
use tapecat_catalogue::models::{
    ArchiveFileSearchCriteria, RecycleLogSearchCriteria, TapeFileWritten,
};
use tapecat_catalogue::{Catalogue, CatalogueCursor, CatalogueError, cursor};

fn written(archive_file_id: u64, vid: &str, fseq: u64, copy_nb: u32) -> TapeFileWritten {
    TapeFileWritten {
        archive_file_id,
        disk_instance_name: "di1".to_string(),
        disk_file_id: format!("disk-{archive_file_id}"),
        disk_file_owner_uid: 1000,
        disk_file_gid: 1000,
        size_in_bytes: 1000 * archive_file_id,
        checksum_adler32: format!("{:08x}", archive_file_id),
        storage_class_name: "sc1".to_string(),
        vid: vid.to_string(),
        fseq,
        block_id: fseq * 10,
        copy_nb,
    }
}

/// Tape world plus a two-copy storage class and the tapes `V00001`/`V00002`.
async fn create_file_world(catalogue: &dyn Catalogue) {
    create_tape_world(catalogue).await;
    catalogue
        .storage_classes()
        .create_storage_class(&admin(), &new_storage_class("sc1", 2, "vo1"))
        .await
        .expect("Create storage class failed");
    create_tape(catalogue, "V00001", "pool1").await;
    create_tape(catalogue, "V00002", "pool1").await;
}

#[tokio::test]
async fn test_file_written_to_tape_updates_tape() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    create_file_world(catalogue.as_ref()).await;

    let files = catalogue.archive_files();
    files
        .file_written_to_tape(&written(1, "V00001", 1, 1))
        .await
        .expect("Write copy 1 failed");
    files
        .file_written_to_tape(&written(1, "V00002", 1, 2))
        .await
        .expect("Write copy 2 failed");
    files
        .file_written_to_tape(&written(2, "V00001", 2, 1))
        .await
        .expect("Write second file failed");

    let file = files
        .get_archive_file(1)
        .await
        .expect("Get archive file failed")
        .expect("archive file not found");
    assert_eq!(file.storage_class_name, "sc1");
    assert_eq!(file.size_in_bytes, 1000);
    let copies: Vec<(u32, &str)> = file
        .tape_files
        .iter()
        .map(|tf| (tf.copy_nb, tf.vid.as_str()))
        .collect();
    assert_eq!(copies, vec![(1, "V00001"), (2, "V00002")]);

    let tape = catalogue
        .tapes()
        .get_tape("V00001")
        .await
        .expect("Get tape failed")
        .expect("tape not found");
    assert_eq!(tape.last_fseq, 2);
    assert_eq!(tape.data_in_bytes, 3000);
    assert_eq!(tape.nb_master_files, 2);
    assert!(tape.dirty);

    let pool = catalogue
        .tape_pools()
        .get_tape_pool("pool1")
        .await
        .expect("Get tape pool failed")
        .expect("tape pool not found");
    assert_eq!(pool.data_bytes, 4000);
    assert_eq!(pool.nb_physical_files, 3);
    assert_eq!(pool.nb_empty_tapes, 0);
}

#[tokio::test]
async fn test_file_written_to_tape_rejects_inconsistent_events() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    create_file_world(catalogue.as_ref()).await;
    let files = catalogue.archive_files();
    files
        .file_written_to_tape(&written(1, "V00001", 1, 1))
        .await
        .expect("Write copy 1 failed");

    // Skipping an fseq.
    let err = files
        .file_written_to_tape(&written(2, "V00001", 3, 1))
        .await
        .expect_err("fseq gap");
    assert!(matches!(err, CatalogueError::Conflict(_)));

    // Same copy number twice.
    let err = files
        .file_written_to_tape(&written(1, "V00002", 1, 1))
        .await
        .expect_err("duplicate copy");
    assert!(matches!(err, CatalogueError::AlreadyExists { .. }));

    // Second copy with a different checksum.
    let mut mismatch = written(1, "V00002", 1, 2);
    mismatch.checksum_adler32 = "deadbeef".to_string();
    let err = files
        .file_written_to_tape(&mismatch)
        .await
        .expect_err("checksum mismatch");
    assert!(matches!(err, CatalogueError::Conflict(_)));

    let mut unknown_class = written(3, "V00002", 1, 1);
    unknown_class.storage_class_name = "nosuchclass".to_string();
    let err = files
        .file_written_to_tape(&unknown_class)
        .await
        .expect_err("unknown storage class");
    assert!(matches!(
        err,
        CatalogueError::NotFound {
            kind: "storage class",
            ..
        }
    ));

    // None of the failures advanced the second tape.
    let tape = catalogue
        .tapes()
        .get_tape("V00002")
        .await
        .expect("Get tape failed")
        .expect("tape not found");
    assert_eq!(tape.last_fseq, 0);
}

#[tokio::test]
async fn test_archive_file_cursor_pages_through_results() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    create_file_world(catalogue.as_ref()).await;
    for id in 1..=5 {
        catalogue
            .archive_files()
            .file_written_to_tape(&written(id, "V00001", id, 1))
            .await
            .expect("Write file failed");
    }
    catalogue
        .archive_files()
        .file_written_to_tape(&written(6, "V00002", 1, 1))
        .await
        .expect("Write file failed");

    // The test configuration fetches two rows per page.
    let mut all = catalogue
        .archive_files()
        .get_archive_files(&ArchiveFileSearchCriteria::default())
        .await
        .expect("Open cursor failed");
    let ids: Vec<u64> = cursor::collect(&mut all)
        .await
        .expect("Drain cursor failed")
        .iter()
        .map(|f| f.archive_file_id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    assert!(!all.has_more().await.expect("has_more failed"));
    assert!(all.next().await.is_err());

    let mut on_tape = catalogue
        .archive_files()
        .get_archive_files(&ArchiveFileSearchCriteria {
            vid: Some("V00002".to_string()),
            ..Default::default()
        })
        .await
        .expect("Open cursor failed");
    let files = cursor::collect(&mut on_tape)
        .await
        .expect("Drain cursor failed");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].archive_file_id, 6);
    assert_eq!(files[0].tape_files.len(), 1);

    let err = catalogue
        .archive_files()
        .get_archive_files(&ArchiveFileSearchCriteria {
            vid: Some("V99999".to_string()),
            ..Default::default()
        })
        .await
        .err()
        .expect("unknown tape criterion");
    assert!(matches!(err, CatalogueError::NotFound { kind: "tape", .. }));
}

#[tokio::test]
async fn test_delete_archive_file_recycles_copies() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_file_world(catalogue.as_ref()).await;
    let files = catalogue.archive_files();
    files
        .file_written_to_tape(&written(1, "V00001", 1, 1))
        .await
        .expect("Write copy 1 failed");
    files
        .file_written_to_tape(&written(1, "V00002", 1, 2))
        .await
        .expect("Write copy 2 failed");

    let err = files
        .delete_archive_file("di2", 1, "user request")
        .await
        .expect_err("wrong disk instance");
    assert!(matches!(err, CatalogueError::Conflict(_)));
    let err = files
        .delete_archive_file("di1", 1, "")
        .await
        .expect_err("missing reason");
    assert!(matches!(err, CatalogueError::EmptyField { field: "reason" }));

    files
        .delete_archive_file("di1", 1, "user request")
        .await
        .expect("Delete archive file failed");
    assert!(
        files
            .get_archive_file(1)
            .await
            .expect("Get archive file failed")
            .is_none()
    );

    let mut recycled = catalogue
        .file_recycle_log()
        .get_file_recycle_logs(&RecycleLogSearchCriteria {
            archive_file_id: Some(1),
            ..Default::default()
        })
        .await
        .expect("Open recycle log cursor failed");
    let entries = cursor::collect(&mut recycled)
        .await
        .expect("Drain recycle log failed");
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.reason_log == "user request"));
    assert!(entries.iter().all(|e| e.storage_class_name == "sc1"));

    // Recycled copies still pin the tape.
    let err = catalogue
        .tapes()
        .delete_tape("V00001")
        .await
        .expect_err("tape has recycled files");
    assert!(matches!(err, CatalogueError::NotEmpty { .. }));

    // Reclaiming a full tape clears its recycle log.
    catalogue
        .tapes()
        .set_tape_full(&admin, "V00001", true)
        .await
        .expect("Set full failed");
    catalogue
        .tapes()
        .reclaim_tape(&admin, "V00001")
        .await
        .expect("Reclaim failed");
    let tape = catalogue
        .tapes()
        .get_tape("V00001")
        .await
        .expect("Get tape failed")
        .expect("tape not found");
    assert_eq!(tape.last_fseq, 0);
    assert!(!tape.dirty);
    catalogue
        .tapes()
        .delete_tape("V00001")
        .await
        .expect("Delete reclaimed tape failed");

    let deleted = catalogue
        .file_recycle_log()
        .delete_files_from_recycle_log("V00002")
        .await
        .expect("Delete recycle log failed");
    assert_eq!(deleted, 1);
    catalogue
        .tapes()
        .delete_tape("V00002")
        .await
        .expect("Delete tape failed");
}

#[tokio::test]
async fn test_reclaim_refuses_tape_with_live_files() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_file_world(catalogue.as_ref()).await;
    catalogue
        .archive_files()
        .file_written_to_tape(&written(1, "V00001", 1, 1))
        .await
        .expect("Write file failed");
    catalogue
        .tapes()
        .set_tape_full(&admin, "V00001", true)
        .await
        .expect("Set full failed");

    let err = catalogue
        .tapes()
        .reclaim_tape(&admin, "V00001")
        .await
        .expect_err("tape holds a live file");
    assert!(matches!(err, CatalogueError::NotEmpty { .. }));

    let err = catalogue
        .storage_classes()
        .delete_storage_class("sc1")
        .await
        .expect_err("storage class is used by a file");
    assert!(matches!(
        err,
        CatalogueError::InUse {
            used_by: "archive file",
            ..
        }
    ));
}
