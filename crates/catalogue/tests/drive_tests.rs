//! Drive state, drive configuration and disk space reservations.

mod common;

use common::*;
use tapecat_catalogue::CatalogueError;
use tapecat_catalogue::models::{DriveConfigRow, DriveStatusUpdate, NewTapeDrive};
use tapecat_core::{DriveStatus, MountType};

fn new_drive(name: &str) -> NewTapeDrive {
    NewTapeDrive {
        drive_name: name.to_string(),
        host: "tpsrv01".to_string(),
        logical_library: "lib1".to_string(),
        dev_file_name: Some("/dev/nst0".to_string()),
        raw_library_slot: None,
        comment: None,
    }
}

#[tokio::test]
async fn test_drive_state_lifecycle() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    let drives = catalogue.drive_state();

    let mut orphan = new_drive("drive0");
    orphan.logical_library = "nolib".to_string();
    let err = drives
        .create_tape_drive(&admin, &orphan)
        .await
        .expect_err("unknown logical library");
    assert!(matches!(err, CatalogueError::NotFound { .. }));

    drives
        .create_tape_drive(&admin, &new_drive("drive1"))
        .await
        .expect("Create drive failed");
    let drive = drives
        .get_tape_drive("drive1")
        .await
        .expect("Get drive failed")
        .expect("drive not found");
    assert_eq!(drive.drive_status, DriveStatus::Down);
    assert_eq!(drive.mount_type, MountType::NoMount);
    assert!(!drive.desired_up);

    let err = drives
        .set_desired_tape_drive_state(&admin, "drive1", true, true, None)
        .await
        .expect_err("up and forced down");
    assert!(matches!(
        err,
        CatalogueError::InvalidField {
            field: "force_down",
            ..
        }
    ));
    drives
        .set_desired_tape_drive_state(&admin, "drive1", true, false, Some("back from repair"))
        .await
        .expect("Set desired state failed");

    drives
        .update_tape_drive_status(
            "drive1",
            &DriveStatusUpdate {
                status: DriveStatus::Transferring,
                mount_type: MountType::Retrieve,
                current_vid: Some("V00001".to_string()),
                current_tape_pool: Some("pool1".to_string()),
                session_id: Some(42),
                bytes_transferred: 4096,
                files_transferred: 2,
            },
        )
        .await
        .expect("Update status failed");

    let drive = drives
        .get_tape_drive("drive1")
        .await
        .expect("Get drive failed")
        .expect("drive not found");
    assert!(drive.desired_up);
    assert_eq!(drive.reason_up_down.as_deref(), Some("back from repair"));
    assert_eq!(drive.drive_status, DriveStatus::Transferring);
    assert_eq!(drive.current_vid.as_deref(), Some("V00001"));
    assert_eq!(drive.bytes_transferred, 4096);

    assert_eq!(
        drives.get_tape_drive_names().await.expect("List names failed"),
        vec!["drive1".to_string()]
    );
    drives
        .delete_tape_drive("drive1")
        .await
        .expect("Delete drive failed");
    assert!(
        drives
            .get_tape_drive("drive1")
            .await
            .expect("Get drive failed")
            .is_none()
    );
}

#[tokio::test]
async fn test_disk_space_reservations() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    let drives = catalogue.drive_state();
    for name in ["drive1", "drive2"] {
        drives
            .create_tape_drive(&admin, &new_drive(name))
            .await
            .expect("Create drive failed");
    }

    drives
        .reserve_disk_space("drive1", "ds1", 100)
        .await
        .expect("Reserve failed");
    drives
        .reserve_disk_space("drive1", "ds1", 50)
        .await
        .expect("Reserve failed");
    drives
        .reserve_disk_space("drive2", "ds1", 25)
        .await
        .expect("Reserve failed");
    drives
        .reserve_disk_space("drive2", "ds2", 10)
        .await
        .expect("Reserve failed");

    let reserved = drives
        .get_disk_space_reservations()
        .await
        .expect("Get reservations failed");
    assert_eq!(reserved.get("ds1"), Some(&175));
    assert_eq!(reserved.get("ds2"), Some(&10));

    drives
        .release_disk_space("drive1", "ds1", 60)
        .await
        .expect("Release failed");
    // Releasing more than is reserved clears the reservation.
    drives
        .release_disk_space("drive2", "ds2", 1000)
        .await
        .expect("Over-release failed");
    let reserved = drives
        .get_disk_space_reservations()
        .await
        .expect("Get reservations failed");
    assert_eq!(reserved.get("ds1"), Some(&115));
    assert_eq!(reserved.get("ds2"), None);

    let err = drives
        .reserve_disk_space("nodrive", "ds1", 1)
        .await
        .expect_err("unknown drive");
    assert!(matches!(err, CatalogueError::NotFound { .. }));

    // Deleting a drive drops its reservations.
    drives
        .delete_tape_drive("drive1")
        .await
        .expect("Delete drive failed");
    let reserved = drives
        .get_disk_space_reservations()
        .await
        .expect("Get reservations failed");
    assert_eq!(reserved.get("ds1"), Some(&25));
}

#[tokio::test]
async fn test_drive_config_entries() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let drives = catalogue.drive_state();
    let entry = DriveConfigRow {
        drive_name: "drive1".to_string(),
        key_name: "BufferSize".to_string(),
        category: "taped".to_string(),
        value: "262144".to_string(),
        source: "/etc/tapecat/taped.conf".to_string(),
    };
    drives
        .set_drive_config(&entry)
        .await
        .expect("Set config failed");
    let replaced = DriveConfigRow {
        value: "524288".to_string(),
        ..entry.clone()
    };
    drives
        .set_drive_config(&replaced)
        .await
        .expect("Replace config failed");

    let stored = drives
        .get_drive_config("drive1", "BufferSize")
        .await
        .expect("Get config failed");
    assert_eq!(stored, Some(replaced));
    assert_eq!(drives.get_drive_configs().await.expect("List failed").len(), 1);

    drives
        .delete_drive_config("drive1", "BufferSize")
        .await
        .expect("Delete config failed");
    let err = drives
        .delete_drive_config("drive1", "BufferSize")
        .await
        .expect_err("already deleted");
    assert!(matches!(err, CatalogueError::NotFound { .. }));
}
