//! Validation, uniqueness, modification and deletion rules across entity kinds.

mod common;

use common::*;
use tapecat_catalogue::CatalogueError;
use tapecat_catalogue::models::{NewDiskInstanceSpace, NewMediaType, NewPhysicalLibrary};

#[tokio::test]
async fn test_create_rejects_empty_and_zero_fields_by_name() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_vo_world(catalogue.as_ref()).await;

    let err = catalogue
        .tape_pools()
        .create_tape_pool(&admin, &new_tape_pool("", "vo1"))
        .await
        .expect_err("empty pool name must be rejected");
    assert!(matches!(err, CatalogueError::EmptyField { field: "name" }));

    let err = catalogue
        .media_types()
        .create_media_type(&admin, &new_media_type("lto9", 0))
        .await
        .expect_err("zero capacity must be rejected");
    assert!(matches!(
        err,
        CatalogueError::ZeroValue {
            field: "capacity_in_bytes"
        }
    ));

    let err = catalogue
        .storage_classes()
        .create_storage_class(&admin, &new_storage_class("sc1", 0, "vo1"))
        .await
        .expect_err("zero copies must be rejected");
    assert!(matches!(err, CatalogueError::ZeroValue { field: "nb_copies" }));
}

#[tokio::test]
async fn test_create_requires_referenced_entities() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();

    let err = catalogue
        .vos()
        .create_virtual_organization(&admin, &new_vo("vo1", "missing"))
        .await
        .expect_err("unknown disk instance must be rejected");
    assert!(matches!(
        err,
        CatalogueError::NotFound {
            kind: "disk instance",
            ..
        }
    ));

    create_vo_world(catalogue.as_ref()).await;
    let err = catalogue
        .tape_pools()
        .create_tape_pool(&admin, &new_tape_pool("pool1", "nobody"))
        .await
        .expect_err("unknown VO must be rejected");
    assert!(matches!(
        err,
        CatalogueError::NotFound {
            kind: "virtual organization",
            ..
        }
    ));
}

#[tokio::test]
async fn test_duplicate_names_are_rejected() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;

    let err = catalogue
        .tape_pools()
        .create_tape_pool(&admin, &new_tape_pool("pool1", "vo1"))
        .await
        .expect_err("duplicate pool must be rejected");
    assert!(matches!(
        err,
        CatalogueError::AlreadyExists {
            kind: "tape pool",
            ..
        }
    ));

    catalogue
        .admin_users()
        .create_admin_user(&admin, "alice", "operator")
        .await
        .expect("Create admin user failed");
    let err = catalogue
        .admin_users()
        .create_admin_user(&admin, "alice", "operator again")
        .await
        .expect_err("duplicate admin user must be rejected");
    assert!(matches!(err, CatalogueError::AlreadyExists { .. }));
}

#[tokio::test]
async fn test_rename_rejects_collision_case_sensitively() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    catalogue
        .tape_pools()
        .create_tape_pool(&admin, &new_tape_pool("pool2", "vo1"))
        .await
        .expect("Create tape pool failed");

    let err = catalogue
        .tape_pools()
        .modify_tape_pool_name(&admin, "pool2", "pool1")
        .await
        .expect_err("rename onto an existing pool must fail");
    assert!(matches!(err, CatalogueError::AlreadyExists { .. }));

    catalogue
        .tape_pools()
        .modify_tape_pool_name(&admin, "pool2", "POOL1")
        .await
        .expect("Names differing only by case are distinct");
    assert!(
        catalogue
            .tape_pools()
            .tape_pool_exists("POOL1")
            .await
            .expect("exists failed")
    );
}

#[tokio::test]
async fn test_modify_updates_only_last_modification_log() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    create_vo_world(catalogue.as_ref()).await;

    let before = catalogue
        .vos()
        .get_virtual_organization("vo1")
        .await
        .expect("Get VO failed")
        .expect("VO not found");

    let operator = tapecat_core::SecurityIdentity::new("operator2", "host2");
    catalogue
        .vos()
        .modify_virtual_organization_write_max_drives(&operator, "vo1", 7)
        .await
        .expect("Modify VO failed");

    let after = catalogue
        .vos()
        .get_virtual_organization("vo1")
        .await
        .expect("Get VO failed")
        .expect("VO not found");
    assert_eq!(after.write_max_drives, 7);
    assert_eq!(after.read_max_drives, before.read_max_drives);
    assert_eq!(after.creation_log(), before.creation_log());
    assert_eq!(after.last_modification_log().username, "operator2");
    assert_eq!(after.last_modification_log().host, "host2");
}

#[tokio::test]
async fn test_modify_unknown_entity_is_not_found() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();

    let err = catalogue
        .storage_classes()
        .modify_storage_class_comment(&admin(), "missing", "comment")
        .await
        .expect_err("unknown storage class");
    assert!(matches!(err, CatalogueError::NotFound { .. }));
}

#[tokio::test]
async fn test_delete_reports_referencing_kind() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;

    let err = catalogue
        .vos()
        .delete_virtual_organization("vo1")
        .await
        .expect_err("VO is used by a pool");
    assert!(matches!(
        err,
        CatalogueError::InUse {
            used_by: "tape pool",
            ..
        }
    ));

    catalogue
        .storage_classes()
        .create_storage_class(&admin, &new_storage_class("sc1", 1, "vo1"))
        .await
        .expect("Create storage class failed");
    catalogue
        .archive_routes()
        .create_archive_route(&admin, &new_archive_route("sc1", 1, "pool1"))
        .await
        .expect("Create archive route failed");

    let err = catalogue
        .storage_classes()
        .delete_storage_class("sc1")
        .await
        .expect_err("storage class is used by a route");
    assert!(matches!(
        err,
        CatalogueError::InUse {
            used_by: "archive route",
            ..
        }
    ));

    let err = catalogue
        .tape_pools()
        .delete_tape_pool("pool1")
        .await
        .expect_err("pool is targeted by a route");
    assert!(matches!(
        err,
        CatalogueError::InUse {
            used_by: "archive route",
            ..
        }
    ));

    let err = catalogue
        .disk_instances()
        .delete_disk_instance("di1")
        .await
        .expect_err("disk instance is used by a VO");
    assert!(matches!(
        err,
        CatalogueError::InUse {
            used_by: "virtual organization",
            ..
        }
    ));
}

#[tokio::test]
async fn test_only_one_repack_vo() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_vo_world(catalogue.as_ref()).await;

    let mut repack = new_vo("repack", "di1");
    repack.is_repack_vo = true;
    catalogue
        .vos()
        .create_virtual_organization(&admin, &repack)
        .await
        .expect("Create repack VO failed");

    let err = catalogue
        .vos()
        .modify_virtual_organization_is_repack_vo(&admin, "vo1", true)
        .await
        .expect_err("a second repack VO must be rejected");
    assert!(matches!(err, CatalogueError::Conflict(_)));

    let found = catalogue
        .vos()
        .get_default_virtual_organization_for_repack()
        .await
        .expect("Get repack VO failed")
        .expect("repack VO not found");
    assert_eq!(found.name, "repack");
}

#[tokio::test]
async fn test_archive_route_copy_number_bounded_by_storage_class() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    catalogue
        .storage_classes()
        .create_storage_class(&admin, &new_storage_class("sc1", 1, "vo1"))
        .await
        .expect("Create storage class failed");

    let err = catalogue
        .archive_routes()
        .create_archive_route(&admin, &new_archive_route("sc1", 2, "pool1"))
        .await
        .expect_err("copy 2 of a single-copy class");
    assert!(matches!(
        err,
        CatalogueError::InvalidField {
            field: "copy_nb",
            ..
        }
    ));
}

#[tokio::test]
async fn test_nb_copies_cannot_drop_below_routed_copy() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    catalogue
        .storage_classes()
        .create_storage_class(&admin, &new_storage_class("sc1", 2, "vo1"))
        .await
        .expect("Create storage class failed");
    catalogue
        .archive_routes()
        .create_archive_route(&admin, &new_archive_route("sc1", 2, "pool1"))
        .await
        .expect("Create archive route failed");

    let err = catalogue
        .storage_classes()
        .modify_storage_class_nb_copies(&admin, "sc1", 1)
        .await
        .expect_err("copy 2 is still routed");
    assert!(matches!(
        err,
        CatalogueError::InUse {
            kind: "storage class",
            used_by: "archive route",
            ..
        }
    ));

    catalogue
        .storage_classes()
        .modify_storage_class_nb_copies(&admin, "sc1", 3)
        .await
        .expect("Raising nb_copies failed");
    catalogue
        .storage_classes()
        .modify_storage_class_nb_copies(&admin, "sc1", 2)
        .await
        .expect("Lowering to the highest routed copy failed");
    let sc = catalogue
        .storage_classes()
        .get_storage_class("sc1")
        .await
        .expect("Get storage class failed")
        .expect("storage class not found");
    assert_eq!(sc.nb_copies, 2);

    let err = catalogue
        .storage_classes()
        .modify_storage_class_nb_copies(&admin, "missing", 1)
        .await
        .expect_err("unknown storage class");
    assert!(matches!(err, CatalogueError::NotFound { .. }));
}

#[tokio::test]
async fn test_disk_space_and_system_lifecycle() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_vo_world(catalogue.as_ref()).await;

    let err = catalogue
        .disk_instance_spaces()
        .create_disk_instance_space(
            &admin,
            &NewDiskInstanceSpace {
                refresh_interval: 0,
                ..new_space("di1", "space1", "constantFreeSpace:100")
            },
        )
        .await
        .expect_err("zero refresh interval");
    assert!(matches!(err, CatalogueError::ZeroValue { .. }));

    catalogue
        .disk_instance_spaces()
        .create_disk_instance_space(&admin, &new_space("di1", "space1", "constantFreeSpace:100"))
        .await
        .expect("Create space failed");
    catalogue
        .disk_systems()
        .create_disk_system(&admin, &new_disk_system("ds1", "di1", "space1"))
        .await
        .expect("Create disk system failed");

    let systems = catalogue
        .disk_systems()
        .get_all_disk_systems()
        .await
        .expect("List disk systems failed");
    let ds = systems
        .disk_system_for_url("root://ds1/path/file")
        .expect("URL should match ds1");
    assert_eq!(ds.free_space_query_url, "constantFreeSpace:100");
    assert_eq!(ds.last_refresh_time, None);

    catalogue
        .disk_instance_spaces()
        .update_disk_instance_space_free_space("di1", "space1", 4242)
        .await
        .expect("Free space update failed");
    let ds = catalogue
        .disk_systems()
        .get_disk_system("ds1")
        .await
        .expect("Get disk system failed")
        .expect("disk system not found");
    assert_eq!(ds.free_space, 4242);
    assert!(ds.last_refresh_time.is_some());

    let err = catalogue
        .disk_instance_spaces()
        .delete_disk_instance_space("di1", "space1")
        .await
        .expect_err("space is used by a disk system");
    assert!(matches!(
        err,
        CatalogueError::InUse {
            used_by: "disk system",
            ..
        }
    ));

    catalogue
        .disk_systems()
        .delete_disk_system("ds1")
        .await
        .expect("Delete disk system failed");
    catalogue
        .disk_instance_spaces()
        .delete_disk_instance_space("di1", "space1")
        .await
        .expect("Delete space failed");
}

#[tokio::test]
async fn test_media_type_in_use_and_libraries() {
    let test = TestCatalogue::new().await.expect("Failed to create catalogue");
    let catalogue = test.catalogue();
    let admin = admin();
    create_tape_world(catalogue.as_ref()).await;
    create_tape(catalogue.as_ref(), "V00001", "pool1").await;

    let err = catalogue
        .media_types()
        .delete_media_type("lto9")
        .await
        .expect_err("media type is used by a tape");
    assert!(matches!(err, CatalogueError::InUse { used_by: "tape", .. }));

    let media_type = catalogue
        .media_types()
        .get_media_type_by_vid("V00001")
        .await
        .expect("Media type by vid failed");
    assert_eq!(media_type.name, "lto9");

    catalogue
        .media_types()
        .create_media_type(
            &admin,
            &NewMediaType {
                primary_density_code: None,
                ..new_media_type("lto8", 12_000_000_000_000)
            },
        )
        .await
        .expect("Create media type failed");

    catalogue
        .physical_libraries()
        .create_physical_library(
            &admin,
            &NewPhysicalLibrary {
                name: "phys1".to_string(),
                manufacturer: "IBM".to_string(),
                model: "TS4500".to_string(),
                library_type: None,
                gui_url: None,
                webcam_url: None,
                location: Some("B513".to_string()),
                nb_physical_cartridge_slots: 4000,
                nb_available_cartridge_slots: None,
                nb_physical_drive_slots: 48,
                comment: None,
            },
        )
        .await
        .expect("Create physical library failed");
    catalogue
        .logical_libraries()
        .modify_logical_library_physical_library(&admin, "lib1", Some("phys1"))
        .await
        .expect("Attach physical library failed");

    let err = catalogue
        .physical_libraries()
        .delete_physical_library("phys1")
        .await
        .expect_err("physical library is used by a logical library");
    assert!(matches!(
        err,
        CatalogueError::InUse {
            used_by: "logical library",
            ..
        }
    ));

    let err = catalogue
        .logical_libraries()
        .delete_logical_library("lib1")
        .await
        .expect_err("library holds a tape");
    assert!(matches!(err, CatalogueError::NotEmpty { .. }));
}
