//! Embedded catalogue schema.
//!
//! Names compare with SQLite's default BINARY collation, so uniqueness is
//! case-sensitive. Entities that can be renamed carry a surrogate id; other
//! tables refer to them through it.

pub(crate) const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS catalogue_schema_version (
    schema_version_major INTEGER NOT NULL,
    schema_version_minor INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'PRODUCTION'
);

CREATE TABLE IF NOT EXISTS admin_user (
    admin_user_name TEXT PRIMARY KEY,
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS disk_instance (
    disk_instance_name TEXT PRIMARY KEY,
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS disk_instance_space (
    disk_instance_name TEXT NOT NULL REFERENCES disk_instance(disk_instance_name),
    disk_instance_space_name TEXT NOT NULL,
    free_space_query_url TEXT NOT NULL,
    refresh_interval INTEGER NOT NULL,
    free_space INTEGER NOT NULL DEFAULT 0,
    last_refresh_time TEXT,
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL,
    PRIMARY KEY (disk_instance_name, disk_instance_space_name)
);

CREATE TABLE IF NOT EXISTS disk_system (
    disk_system_name TEXT PRIMARY KEY,
    file_regexp TEXT NOT NULL,
    disk_instance_name TEXT NOT NULL,
    disk_instance_space_name TEXT NOT NULL,
    targeted_free_space INTEGER NOT NULL,
    sleep_time INTEGER NOT NULL,
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL,
    FOREIGN KEY (disk_instance_name, disk_instance_space_name)
        REFERENCES disk_instance_space(disk_instance_name, disk_instance_space_name)
);

CREATE TABLE IF NOT EXISTS virtual_organization (
    virtual_organization_id INTEGER PRIMARY KEY,
    virtual_organization_name TEXT NOT NULL UNIQUE,
    read_max_drives INTEGER NOT NULL,
    write_max_drives INTEGER NOT NULL,
    max_file_size INTEGER NOT NULL,
    disk_instance_name TEXT NOT NULL REFERENCES disk_instance(disk_instance_name),
    is_repack_vo INTEGER NOT NULL DEFAULT 0,
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_virtual_organization_repack
    ON virtual_organization(is_repack_vo) WHERE is_repack_vo = 1;

CREATE TABLE IF NOT EXISTS media_type (
    media_type_id INTEGER PRIMARY KEY,
    media_type_name TEXT NOT NULL UNIQUE,
    cartridge TEXT NOT NULL,
    capacity_in_bytes INTEGER NOT NULL,
    primary_density_code INTEGER,
    secondary_density_code INTEGER,
    nb_wraps INTEGER,
    min_lpos INTEGER,
    max_lpos INTEGER,
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS physical_library (
    physical_library_id INTEGER PRIMARY KEY,
    physical_library_name TEXT NOT NULL UNIQUE,
    physical_library_manufacturer TEXT NOT NULL,
    physical_library_model TEXT NOT NULL,
    physical_library_type TEXT,
    gui_url TEXT,
    webcam_url TEXT,
    physical_location TEXT,
    nb_physical_cartridge_slots INTEGER NOT NULL,
    nb_available_cartridge_slots INTEGER,
    nb_physical_drive_slots INTEGER NOT NULL,
    user_comment TEXT,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS logical_library (
    logical_library_id INTEGER PRIMARY KEY,
    logical_library_name TEXT NOT NULL UNIQUE,
    is_disabled INTEGER NOT NULL DEFAULT 0,
    disabled_reason TEXT,
    physical_library_id INTEGER REFERENCES physical_library(physical_library_id),
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tape_pool (
    tape_pool_id INTEGER PRIMARY KEY,
    tape_pool_name TEXT NOT NULL UNIQUE,
    virtual_organization_id INTEGER NOT NULL
        REFERENCES virtual_organization(virtual_organization_id),
    nb_partial_tapes INTEGER NOT NULL,
    is_encrypted INTEGER NOT NULL,
    encryption_key_name TEXT,
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tape_pool_supply (
    tape_pool_id INTEGER NOT NULL REFERENCES tape_pool(tape_pool_id) ON DELETE CASCADE,
    supply_tape_pool_id INTEGER NOT NULL REFERENCES tape_pool(tape_pool_id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    PRIMARY KEY (tape_pool_id, supply_tape_pool_id),
    CHECK (tape_pool_id <> supply_tape_pool_id)
);
CREATE INDEX IF NOT EXISTS idx_tape_pool_supply_source ON tape_pool_supply(supply_tape_pool_id);

CREATE TABLE IF NOT EXISTS tape (
    vid TEXT PRIMARY KEY,
    media_type_id INTEGER NOT NULL REFERENCES media_type(media_type_id),
    vendor TEXT NOT NULL,
    logical_library_id INTEGER NOT NULL REFERENCES logical_library(logical_library_id),
    tape_pool_id INTEGER NOT NULL REFERENCES tape_pool(tape_pool_id),
    encryption_key_name TEXT,
    capacity_in_bytes INTEGER NOT NULL,
    data_in_bytes INTEGER NOT NULL DEFAULT 0,
    last_fseq INTEGER NOT NULL DEFAULT 0,
    nb_master_files INTEGER NOT NULL DEFAULT 0,
    master_data_in_bytes INTEGER NOT NULL DEFAULT 0,
    is_full INTEGER NOT NULL DEFAULT 0,
    is_read_only INTEGER NOT NULL DEFAULT 0,
    dirty INTEGER NOT NULL DEFAULT 1,
    tape_state TEXT NOT NULL,
    state_reason TEXT,
    state_update_time TEXT NOT NULL,
    state_modified_by TEXT NOT NULL,
    verification_status TEXT,
    purchase_order TEXT,
    label_drive TEXT,
    label_time TEXT,
    last_read_drive TEXT,
    last_read_time TEXT,
    last_write_drive TEXT,
    last_write_time TEXT,
    read_mount_count INTEGER NOT NULL DEFAULT 0,
    write_mount_count INTEGER NOT NULL DEFAULT 0,
    user_comment TEXT,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tape_tape_pool ON tape(tape_pool_id);
CREATE INDEX IF NOT EXISTS idx_tape_logical_library ON tape(logical_library_id);

CREATE TABLE IF NOT EXISTS storage_class (
    storage_class_id INTEGER PRIMARY KEY,
    storage_class_name TEXT NOT NULL UNIQUE,
    nb_copies INTEGER NOT NULL,
    virtual_organization_id INTEGER NOT NULL
        REFERENCES virtual_organization(virtual_organization_id),
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS archive_route (
    storage_class_id INTEGER NOT NULL REFERENCES storage_class(storage_class_id),
    copy_nb INTEGER NOT NULL CHECK (copy_nb >= 1),
    archive_route_type TEXT NOT NULL,
    tape_pool_id INTEGER NOT NULL REFERENCES tape_pool(tape_pool_id),
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL,
    PRIMARY KEY (storage_class_id, copy_nb, archive_route_type),
    UNIQUE (storage_class_id, archive_route_type, tape_pool_id)
);

CREATE TABLE IF NOT EXISTS mount_policy (
    mount_policy_name TEXT PRIMARY KEY,
    archive_priority INTEGER NOT NULL,
    archive_min_request_age INTEGER NOT NULL,
    retrieve_priority INTEGER NOT NULL,
    retrieve_min_request_age INTEGER NOT NULL,
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS requester_mount_rule (
    disk_instance_name TEXT NOT NULL REFERENCES disk_instance(disk_instance_name),
    requester_name TEXT NOT NULL,
    mount_policy_name TEXT NOT NULL REFERENCES mount_policy(mount_policy_name),
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL,
    PRIMARY KEY (disk_instance_name, requester_name)
);

CREATE TABLE IF NOT EXISTS requester_group_mount_rule (
    disk_instance_name TEXT NOT NULL REFERENCES disk_instance(disk_instance_name),
    requester_group_name TEXT NOT NULL,
    mount_policy_name TEXT NOT NULL REFERENCES mount_policy(mount_policy_name),
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL,
    PRIMARY KEY (disk_instance_name, requester_group_name)
);

CREATE TABLE IF NOT EXISTS requester_activity_mount_rule (
    disk_instance_name TEXT NOT NULL REFERENCES disk_instance(disk_instance_name),
    requester_name TEXT NOT NULL,
    activity_regex TEXT NOT NULL,
    mount_policy_name TEXT NOT NULL REFERENCES mount_policy(mount_policy_name),
    user_comment TEXT NOT NULL,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL,
    PRIMARY KEY (disk_instance_name, requester_name, activity_regex)
);

CREATE TABLE IF NOT EXISTS tape_drive (
    drive_name TEXT PRIMARY KEY,
    host TEXT NOT NULL,
    logical_library TEXT NOT NULL,
    mount_type TEXT NOT NULL DEFAULT 'NO_MOUNT',
    drive_status TEXT NOT NULL DEFAULT 'UNKNOWN',
    desired_up INTEGER NOT NULL DEFAULT 0,
    desired_force_down INTEGER NOT NULL DEFAULT 0,
    reason_up_down TEXT,
    current_vid TEXT,
    current_tape_pool TEXT,
    session_id INTEGER,
    bytes_transferred INTEGER NOT NULL DEFAULT 0,
    files_transferred INTEGER NOT NULL DEFAULT 0,
    dev_file_name TEXT,
    raw_library_slot TEXT,
    user_comment TEXT,
    creation_log_user_name TEXT NOT NULL,
    creation_log_host_name TEXT NOT NULL,
    creation_log_time TEXT NOT NULL,
    last_update_user_name TEXT NOT NULL,
    last_update_host_name TEXT NOT NULL,
    last_update_time TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS disk_space_reservation (
    drive_name TEXT NOT NULL REFERENCES tape_drive(drive_name) ON DELETE CASCADE,
    disk_system_name TEXT NOT NULL,
    reserved_bytes INTEGER NOT NULL,
    PRIMARY KEY (drive_name, disk_system_name)
);

CREATE TABLE IF NOT EXISTS drive_config (
    drive_name TEXT NOT NULL,
    key_name TEXT NOT NULL,
    category TEXT NOT NULL,
    value TEXT NOT NULL,
    source TEXT NOT NULL,
    PRIMARY KEY (drive_name, key_name)
);

CREATE TABLE IF NOT EXISTS archive_file (
    archive_file_id INTEGER PRIMARY KEY,
    disk_instance_name TEXT NOT NULL REFERENCES disk_instance(disk_instance_name),
    disk_file_id TEXT NOT NULL,
    disk_file_owner_uid INTEGER NOT NULL,
    disk_file_gid INTEGER NOT NULL,
    size_in_bytes INTEGER NOT NULL,
    checksum_adler32 TEXT NOT NULL,
    storage_class_id INTEGER NOT NULL REFERENCES storage_class(storage_class_id),
    creation_time TEXT NOT NULL,
    reconciliation_time TEXT NOT NULL,
    UNIQUE (disk_instance_name, disk_file_id)
);

CREATE TABLE IF NOT EXISTS tape_file (
    vid TEXT NOT NULL REFERENCES tape(vid),
    fseq INTEGER NOT NULL,
    block_id INTEGER NOT NULL,
    logical_size_in_bytes INTEGER NOT NULL,
    copy_nb INTEGER NOT NULL,
    creation_time TEXT NOT NULL,
    archive_file_id INTEGER NOT NULL REFERENCES archive_file(archive_file_id),
    PRIMARY KEY (vid, fseq),
    UNIQUE (archive_file_id, copy_nb)
);
CREATE INDEX IF NOT EXISTS idx_tape_file_archive_file ON tape_file(archive_file_id);

CREATE TABLE IF NOT EXISTS file_recycle_log (
    file_recycle_log_id INTEGER PRIMARY KEY AUTOINCREMENT,
    vid TEXT NOT NULL,
    fseq INTEGER NOT NULL,
    block_id INTEGER NOT NULL,
    copy_nb INTEGER NOT NULL,
    archive_file_id INTEGER NOT NULL,
    disk_instance_name TEXT NOT NULL,
    disk_file_id TEXT NOT NULL,
    size_in_bytes INTEGER NOT NULL,
    checksum_adler32 TEXT NOT NULL,
    storage_class_id INTEGER NOT NULL REFERENCES storage_class(storage_class_id),
    archive_file_creation_time TEXT NOT NULL,
    reason_log TEXT NOT NULL,
    recycle_log_time TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_file_recycle_log_vid ON file_recycle_log(vid);
"#;
