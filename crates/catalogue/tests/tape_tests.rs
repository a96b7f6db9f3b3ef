//! Tape creation, state changes, write selection and reclaiming.

mod common;

use common::*;
use tapecat_catalogue::CatalogueError;
use tapecat_catalogue::models::{NewTape, TapeSearchCriteria};
use tapecat_core::TapeState;

#[tokio::test]
async fn test_create_tape_copies_media_type_capacity() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    create_tape(catalogue.as_ref(), "V00001", "pool1").await;

    let tape = catalogue
        .tapes()
        .get_tape("V00001")
        .await
        .expect("Get tape failed")
        .expect("tape not found");
    assert_eq!(tape.capacity_in_bytes, TEN_TB);
    assert_eq!(tape.vo, "vo1");
    assert_eq!(tape.state, TapeState::Active);
    assert_eq!(tape.state_modified_by, "admin1@host1");
    assert!(!tape.full);

    // Later capacity changes leave existing tapes alone.
    catalogue
        .media_types()
        .modify_media_type_capacity_in_bytes(&admin, "lto9", 18_000_000_000_000)
        .await
        .expect("Modify capacity failed");
    let tape = catalogue
        .tapes()
        .get_tape("V00001")
        .await
        .expect("Get tape failed")
        .expect("tape not found");
    assert_eq!(tape.capacity_in_bytes, TEN_TB);

    // Switching media type picks up the new capacity.
    catalogue
        .media_types()
        .create_media_type(&admin, &new_media_type("lto10", 30_000_000_000_000))
        .await
        .expect("Create media type failed");
    catalogue
        .tapes()
        .modify_tape_media_type(&admin, "V00001", "lto10")
        .await
        .expect("Modify media type failed");
    let tape = catalogue
        .tapes()
        .get_tape("V00001")
        .await
        .expect("Get tape failed")
        .expect("tape not found");
    assert_eq!(tape.media_type, "lto10");
    assert_eq!(tape.capacity_in_bytes, 30_000_000_000_000);
}

#[tokio::test]
async fn test_create_tape_validation() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;

    let err = catalogue
        .tapes()
        .create_tape(&admin, &NewTape::active("v00001", "lto9", "vendor", "lib1", "pool1"))
        .await
        .expect_err("lower-case vid");
    assert!(matches!(err, CatalogueError::InvalidField { field: "vid", .. }));

    let mut broken = NewTape::active("V00002", "lto9", "vendor", "lib1", "pool1");
    broken.state = TapeState::Broken;
    let err = catalogue
        .tapes()
        .create_tape(&admin, &broken)
        .await
        .expect_err("broken without a reason");
    assert!(matches!(
        err,
        CatalogueError::EmptyField {
            field: "state_reason"
        }
    ));

    let err = catalogue
        .tapes()
        .create_tape(&admin, &NewTape::active("V00003", "lto9", "vendor", "lib1", "nopool"))
        .await
        .expect_err("unknown pool");
    assert!(matches!(
        err,
        CatalogueError::NotFound {
            kind: "tape pool",
            ..
        }
    ));

    create_tape(catalogue.as_ref(), "V00001", "pool1").await;
    let err = catalogue
        .tapes()
        .create_tape(&admin, &NewTape::active("V00001", "lto9", "vendor", "lib1", "pool1"))
        .await
        .expect_err("duplicate vid");
    assert!(matches!(err, CatalogueError::AlreadyExists { .. }));
}

#[tokio::test]
async fn test_state_change_checks_previous_state() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    create_tape(catalogue.as_ref(), "V00001", "pool1").await;

    let err = catalogue
        .tapes()
        .modify_tape_state(
            &admin,
            "V00001",
            Some(TapeState::Disabled),
            TapeState::Active,
            None,
        )
        .await
        .expect_err("tape is not disabled");
    assert!(matches!(err, CatalogueError::Conflict(_)));

    catalogue
        .tapes()
        .modify_tape_state(
            &admin,
            "V00001",
            Some(TapeState::Active),
            TapeState::Broken,
            Some("  cartridge damaged  "),
        )
        .await
        .expect("Break tape failed");
    let tape = catalogue
        .tapes()
        .get_tape("V00001")
        .await
        .expect("Get tape failed")
        .expect("tape not found");
    assert_eq!(tape.state, TapeState::Broken);
    assert_eq!(tape.state_reason.as_deref(), Some("cartridge damaged"));
}

#[tokio::test]
async fn test_tapes_for_writing() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    for vid in ["V00001", "V00002", "V00003", "V00004"] {
        create_tape(catalogue.as_ref(), vid, "pool1").await;
    }
    catalogue
        .tapes()
        .no_space_left_on_tape("V00002")
        .await
        .expect("Mark full failed");
    catalogue
        .tapes()
        .set_tape_read_only(&admin, "V00003", true)
        .await
        .expect("Set read-only failed");

    let writable = catalogue
        .tapes()
        .get_tapes_for_writing("lib1")
        .await
        .expect("Tapes for writing failed");
    let vids: Vec<&str> = writable.iter().map(|t| t.vid.as_str()).collect();
    assert_eq!(vids, vec!["V00001", "V00004"]);

    catalogue
        .logical_libraries()
        .set_logical_library_disabled(&admin, "lib1", true, Some("maintenance"))
        .await
        .expect("Disable library failed");
    let writable = catalogue
        .tapes()
        .get_tapes_for_writing("lib1")
        .await
        .expect("Tapes for writing failed");
    assert!(writable.is_empty());
}

#[tokio::test]
async fn test_mount_events_update_counters() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    create_tape_world(catalogue.as_ref()).await;
    create_tape(catalogue.as_ref(), "V00001", "pool1").await;

    let tapes = catalogue.tapes();
    tapes
        .tape_labelled("V00001", "drive1")
        .await
        .expect("Label failed");
    tapes
        .tape_mounted_for_archive("V00001", "drive1")
        .await
        .expect("Archive mount failed");
    tapes
        .tape_mounted_for_archive("V00001", "drive2")
        .await
        .expect("Archive mount failed");
    tapes
        .tape_mounted_for_retrieve("V00001", "drive3")
        .await
        .expect("Retrieve mount failed");

    let tape = tapes
        .get_tape("V00001")
        .await
        .expect("Get tape failed")
        .expect("tape not found");
    assert_eq!(tape.label_drive.as_deref(), Some("drive1"));
    assert_eq!(tape.last_write_drive.as_deref(), Some("drive2"));
    assert_eq!(tape.write_mount_count, 2);
    assert_eq!(tape.last_read_drive.as_deref(), Some("drive3"));
    assert_eq!(tape.read_mount_count, 1);

    let err = tapes
        .tape_mounted_for_retrieve("V99999", "drive3")
        .await
        .expect_err("unknown tape");
    assert!(matches!(err, CatalogueError::NotFound { .. }));
}

#[tokio::test]
async fn test_reclaim_requires_full_tape() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    create_tape(catalogue.as_ref(), "V00001", "pool1").await;

    let err = catalogue
        .tapes()
        .reclaim_tape(&admin, "V00001")
        .await
        .expect_err("tape is not full");
    assert!(matches!(err, CatalogueError::Conflict(_)));

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
    assert!(!tape.full);
    assert_eq!(tape.last_fseq, 0);
    assert_eq!(tape.data_in_bytes, 0);
}

#[tokio::test]
async fn test_get_tapes_by_criteria_and_vids() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    create_tape(catalogue.as_ref(), "V00001", "pool1").await;
    create_tape(catalogue.as_ref(), "V00002", "pool1").await;
    catalogue
        .tapes()
        .set_tape_full(&admin, "V00002", true)
        .await
        .expect("Set full failed");

    let full = catalogue
        .tapes()
        .get_tapes(&TapeSearchCriteria {
            full: Some(true),
            ..Default::default()
        })
        .await
        .expect("Search failed");
    assert_eq!(full.len(), 1);
    assert_eq!(full[0].vid, "V00002");

    let err = catalogue
        .tapes()
        .get_tapes(&TapeSearchCriteria {
            tape_pool: Some("nopool".to_string()),
            ..Default::default()
        })
        .await
        .expect_err("unknown pool criterion");
    assert!(matches!(err, CatalogueError::NotFound { .. }));

    let both = catalogue
        .tapes()
        .get_tapes_by_vids(&["V00002".to_string(), "V00001".to_string()])
        .await
        .expect("By vids failed");
    assert_eq!(both.len(), 2);

    let err = catalogue
        .tapes()
        .get_tapes_by_vids(&["V00001".to_string(), "V00404".to_string()])
        .await
        .expect_err("one vid is unknown");
    assert!(matches!(err, CatalogueError::NotFound { .. }));
}
