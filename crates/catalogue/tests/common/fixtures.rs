//! Entity fixtures shared by the integration tests.

#![allow(dead_code)]

use tapecat_catalogue::Catalogue;
use tapecat_catalogue::models::{
    NewArchiveRoute, NewDiskInstanceSpace, NewDiskSystem, NewLogicalLibrary, NewMediaType,
    NewMountPolicy, NewStorageClass, NewTape, NewTapePool, NewVirtualOrganization,
};
use tapecat_core::{ArchiveRouteType, SecurityIdentity};

pub const TEN_TB: u64 = 10_000_000_000_000;

/// The operator performing every mutating call in the tests.
pub fn admin() -> SecurityIdentity {
    SecurityIdentity::new("admin1", "host1")
}

pub fn new_vo(name: &str, disk_instance: &str) -> NewVirtualOrganization {
    NewVirtualOrganization {
        name: name.to_string(),
        read_max_drives: 1,
        write_max_drives: 1,
        max_file_size: 0,
        disk_instance_name: disk_instance.to_string(),
        is_repack_vo: false,
        comment: format!("{name} comment"),
    }
}

pub fn new_media_type(name: &str, capacity_in_bytes: u64) -> NewMediaType {
    NewMediaType {
        name: name.to_string(),
        cartridge: "3592".to_string(),
        capacity_in_bytes,
        primary_density_code: Some(0x5a),
        secondary_density_code: None,
        nb_wraps: Some(208),
        min_lpos: None,
        max_lpos: None,
        comment: format!("{name} comment"),
    }
}

pub fn new_logical_library(name: &str) -> NewLogicalLibrary {
    NewLogicalLibrary {
        name: name.to_string(),
        is_disabled: false,
        physical_library_name: None,
        comment: format!("{name} comment"),
    }
}

pub fn new_tape_pool(name: &str, vo: &str) -> NewTapePool {
    NewTapePool {
        name: name.to_string(),
        vo: vo.to_string(),
        nb_partial_tapes: 2,
        encryption: false,
        encryption_key_name: None,
        supply: Vec::new(),
        comment: format!("{name} comment"),
    }
}

pub fn new_storage_class(name: &str, nb_copies: u64, vo: &str) -> NewStorageClass {
    NewStorageClass {
        name: name.to_string(),
        nb_copies,
        vo: vo.to_string(),
        comment: format!("{name} comment"),
    }
}

pub fn new_archive_route(storage_class: &str, copy_nb: u32, tape_pool: &str) -> NewArchiveRoute {
    NewArchiveRoute {
        storage_class_name: storage_class.to_string(),
        copy_nb,
        route_type: ArchiveRouteType::Default,
        tape_pool_name: tape_pool.to_string(),
        comment: "route comment".to_string(),
    }
}

pub fn new_mount_policy(name: &str, priority: u64) -> NewMountPolicy {
    NewMountPolicy {
        name: name.to_string(),
        archive_priority: priority,
        archive_min_request_age: 60,
        retrieve_priority: priority,
        retrieve_min_request_age: 60,
        comment: format!("{name} comment"),
    }
}

pub fn new_space(disk_instance: &str, name: &str, query_url: &str) -> NewDiskInstanceSpace {
    NewDiskInstanceSpace {
        disk_instance_name: disk_instance.to_string(),
        name: name.to_string(),
        free_space_query_url: query_url.to_string(),
        refresh_interval: 60,
        comment: format!("{name} comment"),
    }
}

pub fn new_disk_system(name: &str, disk_instance: &str, space: &str) -> NewDiskSystem {
    NewDiskSystem {
        name: name.to_string(),
        file_regexp: format!("^root://{name}/"),
        disk_instance_name: disk_instance.to_string(),
        disk_instance_space_name: space.to_string(),
        targeted_free_space: 1000,
        sleep_time: 15,
        comment: format!("{name} comment"),
    }
}

/// Create the disk instance `di1` and the VO `vo1` attached to it.
pub async fn create_vo_world(catalogue: &dyn Catalogue) {
    let admin = admin();
    catalogue
        .disk_instances()
        .create_disk_instance(&admin, "di1", "disk instance comment")
        .await
        .expect("Create disk instance failed");
    catalogue
        .vos()
        .create_virtual_organization(&admin, &new_vo("vo1", "di1"))
        .await
        .expect("Create VO failed");
}

/// Create `di1`, `vo1`, the 10 TB media type `lto9`, the library `lib1` and
/// the pool `pool1`.
pub async fn create_tape_world(catalogue: &dyn Catalogue) {
    let admin = admin();
    create_vo_world(catalogue).await;
    catalogue
        .media_types()
        .create_media_type(&admin, &new_media_type("lto9", TEN_TB))
        .await
        .expect("Create media type failed");
    catalogue
        .logical_libraries()
        .create_logical_library(&admin, &new_logical_library("lib1"))
        .await
        .expect("Create logical library failed");
    catalogue
        .tape_pools()
        .create_tape_pool(&admin, &new_tape_pool("pool1", "vo1"))
        .await
        .expect("Create tape pool failed");
}

/// Create an empty active tape in `lib1` using `lto9`.
pub async fn create_tape(catalogue: &dyn Catalogue, vid: &str, pool: &str) {
    catalogue
        .tapes()
        .create_tape(&admin(), &NewTape::active(vid, "lto9", "vendor", "lib1", pool))
        .await
        .expect("Create tape failed");
}
