//! Row types returned by the catalogue and the inputs accepted by create calls.
//!
//! Cross-entity references are always exposed by name; surrogate ids never leave
//! the database layer.

use crate::error::{CatalogueError, CatalogueResult};
use regex::Regex;
use sqlx::FromRow;
use tapecat_core::{ArchiveRouteType, DriveStatus, EntryLog, MountType, TapeState};
use time::OffsetDateTime;

/// Adds `creation_log()` and `last_modification_log()` to rows carrying the
/// six standard log columns.
macro_rules! entry_logs {
    ($($row:ty),* $(,)?) => {
        $(
            impl $row {
                pub fn creation_log(&self) -> EntryLog {
                    EntryLog {
                        username: self.creation_log_user_name.clone(),
                        host: self.creation_log_host_name.clone(),
                        time: self.creation_log_time,
                    }
                }

                pub fn last_modification_log(&self) -> EntryLog {
                    EntryLog {
                        username: self.last_update_user_name.clone(),
                        host: self.last_update_host_name.clone(),
                        time: self.last_update_time,
                    }
                }
            }
        )*
    };
}

// =============================================================================
// Administrators
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct AdminUserRow {
    pub name: String,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

// =============================================================================
// Virtual organizations
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewVirtualOrganization {
    pub name: String,
    pub read_max_drives: u64,
    pub write_max_drives: u64,
    /// Zero means no limit.
    pub max_file_size: u64,
    pub disk_instance_name: String,
    pub is_repack_vo: bool,
    pub comment: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct VirtualOrganizationRow {
    pub name: String,
    #[sqlx(try_from = "i64")]
    pub read_max_drives: u64,
    #[sqlx(try_from = "i64")]
    pub write_max_drives: u64,
    #[sqlx(try_from = "i64")]
    pub max_file_size: u64,
    pub disk_instance_name: String,
    pub is_repack_vo: bool,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

// =============================================================================
// Disk instances, spaces and disk systems
// =============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct DiskInstanceRow {
    pub name: String,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewDiskInstanceSpace {
    pub disk_instance_name: String,
    pub name: String,
    pub free_space_query_url: String,
    /// Seconds a probed free-space value stays fresh.
    pub refresh_interval: u64,
    pub comment: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct DiskInstanceSpaceRow {
    pub disk_instance_name: String,
    pub name: String,
    pub free_space_query_url: String,
    #[sqlx(try_from = "i64")]
    pub refresh_interval: u64,
    #[sqlx(try_from = "i64")]
    pub free_space: u64,
    pub last_refresh_time: Option<OffsetDateTime>,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewDiskSystem {
    pub name: String,
    pub file_regexp: String,
    pub disk_instance_name: String,
    pub disk_instance_space_name: String,
    pub targeted_free_space: u64,
    /// Seconds to back off once the disk system is found full.
    pub sleep_time: u64,
    pub comment: String,
}

/// A disk system together with the state of the space it draws from.
#[derive(Debug, Clone, FromRow)]
pub struct DiskSystemRow {
    pub name: String,
    pub file_regexp: String,
    pub disk_instance_name: String,
    pub disk_instance_space_name: String,
    pub free_space_query_url: String,
    #[sqlx(try_from = "i64")]
    pub refresh_interval: u64,
    #[sqlx(try_from = "i64")]
    pub free_space: u64,
    pub last_refresh_time: Option<OffsetDateTime>,
    #[sqlx(try_from = "i64")]
    pub targeted_free_space: u64,
    #[sqlx(try_from = "i64")]
    pub sleep_time: u64,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

impl DiskSystemRow {
    /// Whether the cached free space is still within its refresh interval at `now`.
    pub fn free_space_is_fresh(&self, now: OffsetDateTime) -> bool {
        match self.last_refresh_time {
            Some(refreshed) => {
                let interval = i64::try_from(self.refresh_interval).unwrap_or(i64::MAX);
                refreshed
                    .checked_add(time::Duration::seconds(interval))
                    .is_none_or(|expiry| now < expiry)
            }
            None => false,
        }
    }
}

/// All disk systems with their file regexps compiled, for URL matching.
#[derive(Debug, Clone, Default)]
pub struct DiskSystemList {
    systems: Vec<(DiskSystemRow, Regex)>,
}

impl DiskSystemList {
    pub fn from_rows(rows: Vec<DiskSystemRow>) -> CatalogueResult<Self> {
        let systems = rows
            .into_iter()
            .map(|row| {
                let regex = Regex::new(&row.file_regexp)
                    .map_err(|e| CatalogueError::invalid("file_regexp", e.to_string()))?;
                Ok((row, regex))
            })
            .collect::<CatalogueResult<Vec<_>>>()?;
        Ok(Self { systems })
    }

    /// The first disk system whose regexp matches a destination URL.
    pub fn disk_system_for_url(&self, url: &str) -> Option<&DiskSystemRow> {
        self.systems
            .iter()
            .find(|(_, regex)| regex.is_match(url))
            .map(|(row, _)| row)
    }

    pub fn get(&self, name: &str) -> Option<&DiskSystemRow> {
        self.systems
            .iter()
            .map(|(row, _)| row)
            .find(|row| row.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiskSystemRow> {
        self.systems.iter().map(|(row, _)| row)
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

// =============================================================================
// Media types and libraries
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewMediaType {
    pub name: String,
    pub cartridge: String,
    pub capacity_in_bytes: u64,
    pub primary_density_code: Option<u8>,
    pub secondary_density_code: Option<u8>,
    pub nb_wraps: Option<u32>,
    pub min_lpos: Option<u32>,
    pub max_lpos: Option<u32>,
    pub comment: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct MediaTypeRow {
    pub name: String,
    pub cartridge: String,
    #[sqlx(try_from = "i64")]
    pub capacity_in_bytes: u64,
    pub primary_density_code: Option<u8>,
    pub secondary_density_code: Option<u8>,
    pub nb_wraps: Option<u32>,
    pub min_lpos: Option<u32>,
    pub max_lpos: Option<u32>,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPhysicalLibrary {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub library_type: Option<String>,
    pub gui_url: Option<String>,
    pub webcam_url: Option<String>,
    pub location: Option<String>,
    pub nb_physical_cartridge_slots: u32,
    pub nb_available_cartridge_slots: Option<u32>,
    pub nb_physical_drive_slots: u32,
    pub comment: Option<String>,
}

/// Field-granular change to a physical library; only the set fields are applied.
#[derive(Debug, Clone, Default)]
pub struct PhysicalLibraryUpdate {
    pub name: String,
    pub library_type: Option<String>,
    pub gui_url: Option<String>,
    pub webcam_url: Option<String>,
    pub location: Option<String>,
    pub nb_physical_cartridge_slots: Option<u32>,
    pub nb_available_cartridge_slots: Option<u32>,
    pub nb_physical_drive_slots: Option<u32>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PhysicalLibraryRow {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub library_type: Option<String>,
    pub gui_url: Option<String>,
    pub webcam_url: Option<String>,
    pub location: Option<String>,
    pub nb_physical_cartridge_slots: u32,
    pub nb_available_cartridge_slots: Option<u32>,
    pub nb_physical_drive_slots: u32,
    pub comment: Option<String>,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewLogicalLibrary {
    pub name: String,
    pub is_disabled: bool,
    pub physical_library_name: Option<String>,
    pub comment: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct LogicalLibraryRow {
    pub name: String,
    pub is_disabled: bool,
    pub disabled_reason: Option<String>,
    pub physical_library_name: Option<String>,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

// =============================================================================
// Tape pools and tapes
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewTapePool {
    pub name: String,
    pub vo: String,
    pub nb_partial_tapes: u64,
    pub encryption: bool,
    pub encryption_key_name: Option<String>,
    /// Ordered names of the pools this pool is replenished from.
    pub supply: Vec<String>,
    pub comment: String,
}

/// A tape pool with counters aggregated over its member tapes.
#[derive(Debug, Clone, FromRow)]
pub struct TapePoolRow {
    pub name: String,
    pub vo: String,
    #[sqlx(try_from = "i64")]
    pub nb_partial_tapes: u64,
    pub encryption: bool,
    pub encryption_key_name: Option<String>,
    #[sqlx(try_from = "i64")]
    pub nb_tapes: u64,
    #[sqlx(try_from = "i64")]
    pub nb_empty_tapes: u64,
    #[sqlx(try_from = "i64")]
    pub nb_disabled_tapes: u64,
    #[sqlx(try_from = "i64")]
    pub nb_full_tapes: u64,
    #[sqlx(try_from = "i64")]
    pub nb_writable_tapes: u64,
    #[sqlx(try_from = "i64")]
    pub capacity_bytes: u64,
    #[sqlx(try_from = "i64")]
    pub data_bytes: u64,
    #[sqlx(try_from = "i64")]
    pub nb_physical_files: u64,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
    /// Pools this pool is replenished from, in configured order.
    #[sqlx(skip)]
    pub supply_sources: Vec<String>,
    /// Pools that name this pool as a supply source, by name.
    #[sqlx(skip)]
    pub supply_destinations: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TapePoolSearchCriteria {
    pub name: Option<String>,
    pub vo: Option<String>,
    pub encrypted: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewTape {
    pub vid: String,
    pub media_type: String,
    pub vendor: String,
    pub logical_library: String,
    pub tape_pool: String,
    pub full: bool,
    pub state: TapeState,
    pub state_reason: Option<String>,
    pub purchase_order: Option<String>,
    pub comment: Option<String>,
}

impl NewTape {
    /// An empty, active, not-full tape.
    pub fn active(
        vid: impl Into<String>,
        media_type: impl Into<String>,
        vendor: impl Into<String>,
        logical_library: impl Into<String>,
        tape_pool: impl Into<String>,
    ) -> Self {
        Self {
            vid: vid.into(),
            media_type: media_type.into(),
            vendor: vendor.into(),
            logical_library: logical_library.into(),
            tape_pool: tape_pool.into(),
            full: false,
            state: TapeState::Active,
            state_reason: None,
            purchase_order: None,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TapeRow {
    pub vid: String,
    pub media_type: String,
    pub vendor: String,
    pub logical_library: String,
    pub tape_pool: String,
    pub vo: String,
    pub encryption_key_name: Option<String>,
    #[sqlx(try_from = "i64")]
    pub capacity_in_bytes: u64,
    #[sqlx(try_from = "i64")]
    pub data_in_bytes: u64,
    #[sqlx(try_from = "i64")]
    pub last_fseq: u64,
    #[sqlx(try_from = "i64")]
    pub nb_master_files: u64,
    #[sqlx(try_from = "i64")]
    pub master_data_in_bytes: u64,
    pub full: bool,
    pub read_only: bool,
    pub dirty: bool,
    #[sqlx(try_from = "String")]
    pub state: TapeState,
    pub state_reason: Option<String>,
    pub state_update_time: OffsetDateTime,
    pub state_modified_by: String,
    pub verification_status: Option<String>,
    pub purchase_order: Option<String>,
    pub label_drive: Option<String>,
    pub label_time: Option<OffsetDateTime>,
    pub last_read_drive: Option<String>,
    pub last_read_time: Option<OffsetDateTime>,
    pub last_write_drive: Option<String>,
    pub last_write_time: Option<OffsetDateTime>,
    #[sqlx(try_from = "i64")]
    pub read_mount_count: u64,
    #[sqlx(try_from = "i64")]
    pub write_mount_count: u64,
    pub comment: Option<String>,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct TapeSearchCriteria {
    pub vid: Option<String>,
    pub media_type: Option<String>,
    pub vendor: Option<String>,
    pub logical_library: Option<String>,
    pub tape_pool: Option<String>,
    pub vo: Option<String>,
    pub full: Option<bool>,
    pub state: Option<TapeState>,
    pub purchase_order: Option<String>,
}

// =============================================================================
// Storage classes and archive routes
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewStorageClass {
    pub name: String,
    pub nb_copies: u64,
    pub vo: String,
    pub comment: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct StorageClassRow {
    pub name: String,
    #[sqlx(try_from = "i64")]
    pub nb_copies: u64,
    pub vo: String,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewArchiveRoute {
    pub storage_class_name: String,
    pub copy_nb: u32,
    pub route_type: ArchiveRouteType,
    pub tape_pool_name: String,
    pub comment: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ArchiveRouteRow {
    pub storage_class_name: String,
    pub copy_nb: u32,
    #[sqlx(try_from = "String")]
    pub route_type: ArchiveRouteType,
    pub tape_pool_name: String,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

// =============================================================================
// Mount policies and requester rules
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewMountPolicy {
    pub name: String,
    pub archive_priority: u64,
    pub archive_min_request_age: u64,
    pub retrieve_priority: u64,
    pub retrieve_min_request_age: u64,
    pub comment: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct MountPolicyRow {
    pub name: String,
    #[sqlx(try_from = "i64")]
    pub archive_priority: u64,
    #[sqlx(try_from = "i64")]
    pub archive_min_request_age: u64,
    #[sqlx(try_from = "i64")]
    pub retrieve_priority: u64,
    #[sqlx(try_from = "i64")]
    pub retrieve_min_request_age: u64,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

/// Which requester attribute a mount rule keys on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequesterRuleKey {
    /// A requester by name.
    Requester { requester_name: String },
    /// A requester group by name.
    Group { group_name: String },
    /// A requester issuing requests whose activity matches a regex.
    Activity {
        requester_name: String,
        activity_regex: String,
    },
}

impl RequesterRuleKey {
    pub fn kind(&self) -> &'static str {
        match self {
            RequesterRuleKey::Requester { .. } => "requester mount rule",
            RequesterRuleKey::Group { .. } => "requester group mount rule",
            RequesterRuleKey::Activity { .. } => "requester activity mount rule",
        }
    }

    pub fn describe(&self, disk_instance_name: &str) -> String {
        match self {
            RequesterRuleKey::Requester { requester_name } => {
                format!("{disk_instance_name}:{requester_name}")
            }
            RequesterRuleKey::Group { group_name } => format!("{disk_instance_name}:{group_name}"),
            RequesterRuleKey::Activity {
                requester_name,
                activity_regex,
            } => format!("{disk_instance_name}:{requester_name}:{activity_regex}"),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RequesterMountRuleRow {
    pub disk_instance_name: String,
    pub requester_name: String,
    pub mount_policy_name: String,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct RequesterGroupMountRuleRow {
    pub disk_instance_name: String,
    pub requester_group_name: String,
    pub mount_policy_name: String,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct RequesterActivityMountRuleRow {
    pub disk_instance_name: String,
    pub requester_name: String,
    pub activity_regex: String,
    pub mount_policy_name: String,
    pub comment: String,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

// =============================================================================
// Drives
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewTapeDrive {
    pub drive_name: String,
    pub host: String,
    pub logical_library: String,
    pub dev_file_name: Option<String>,
    pub raw_library_slot: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TapeDriveRow {
    pub drive_name: String,
    pub host: String,
    pub logical_library: String,
    #[sqlx(try_from = "String")]
    pub mount_type: MountType,
    #[sqlx(try_from = "String")]
    pub drive_status: DriveStatus,
    pub desired_up: bool,
    pub desired_force_down: bool,
    pub reason_up_down: Option<String>,
    pub current_vid: Option<String>,
    pub current_tape_pool: Option<String>,
    pub session_id: Option<i64>,
    #[sqlx(try_from = "i64")]
    pub bytes_transferred: u64,
    #[sqlx(try_from = "i64")]
    pub files_transferred: u64,
    pub dev_file_name: Option<String>,
    pub raw_library_slot: Option<String>,
    pub comment: Option<String>,
    pub creation_log_user_name: String,
    pub creation_log_host_name: String,
    pub creation_log_time: OffsetDateTime,
    pub last_update_user_name: String,
    pub last_update_host_name: String,
    pub last_update_time: OffsetDateTime,
}

/// A status report from a drive daemon.
#[derive(Debug, Clone)]
pub struct DriveStatusUpdate {
    pub status: DriveStatus,
    pub mount_type: MountType,
    pub current_vid: Option<String>,
    pub current_tape_pool: Option<String>,
    pub session_id: Option<i64>,
    pub bytes_transferred: u64,
    pub files_transferred: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DriveConfigRow {
    pub drive_name: String,
    pub key_name: String,
    pub category: String,
    pub value: String,
    pub source: String,
}

// =============================================================================
// Archive files, tape files and the recycle log
// =============================================================================

/// A file copy that has just been written to tape.
#[derive(Debug, Clone)]
pub struct TapeFileWritten {
    pub archive_file_id: u64,
    pub disk_instance_name: String,
    pub disk_file_id: String,
    pub disk_file_owner_uid: u32,
    pub disk_file_gid: u32,
    pub size_in_bytes: u64,
    pub checksum_adler32: String,
    pub storage_class_name: String,
    pub vid: String,
    pub fseq: u64,
    pub block_id: u64,
    pub copy_nb: u32,
}

#[derive(Debug, Clone, FromRow)]
pub struct TapeFileRow {
    #[sqlx(try_from = "i64")]
    pub archive_file_id: u64,
    pub vid: String,
    #[sqlx(try_from = "i64")]
    pub fseq: u64,
    #[sqlx(try_from = "i64")]
    pub block_id: u64,
    #[sqlx(try_from = "i64")]
    pub logical_size_in_bytes: u64,
    pub copy_nb: u32,
    pub creation_time: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct ArchiveFileRow {
    #[sqlx(try_from = "i64")]
    pub archive_file_id: u64,
    pub disk_instance_name: String,
    pub disk_file_id: String,
    pub disk_file_owner_uid: u32,
    pub disk_file_gid: u32,
    #[sqlx(try_from = "i64")]
    pub size_in_bytes: u64,
    pub checksum_adler32: String,
    pub storage_class_name: String,
    pub creation_time: OffsetDateTime,
    pub reconciliation_time: OffsetDateTime,
    /// Tape copies of this file, ordered by copy number.
    #[sqlx(skip)]
    pub tape_files: Vec<TapeFileRow>,
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveFileSearchCriteria {
    pub archive_file_id: Option<u64>,
    pub disk_instance: Option<String>,
    pub vid: Option<String>,
    pub storage_class: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct FileRecycleLogRow {
    #[sqlx(try_from = "i64")]
    pub file_recycle_log_id: u64,
    pub vid: String,
    #[sqlx(try_from = "i64")]
    pub fseq: u64,
    #[sqlx(try_from = "i64")]
    pub block_id: u64,
    pub copy_nb: u32,
    #[sqlx(try_from = "i64")]
    pub archive_file_id: u64,
    pub disk_instance_name: String,
    pub disk_file_id: String,
    #[sqlx(try_from = "i64")]
    pub size_in_bytes: u64,
    pub checksum_adler32: String,
    pub storage_class_name: String,
    pub archive_file_creation_time: OffsetDateTime,
    pub reason_log: String,
    pub recycle_log_time: OffsetDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct RecycleLogSearchCriteria {
    pub vid: Option<String>,
    pub archive_file_id: Option<u64>,
    pub disk_instance: Option<String>,
}

entry_logs!(
    AdminUserRow,
    VirtualOrganizationRow,
    DiskInstanceRow,
    DiskInstanceSpaceRow,
    DiskSystemRow,
    MediaTypeRow,
    PhysicalLibraryRow,
    LogicalLibraryRow,
    TapePoolRow,
    TapeRow,
    StorageClassRow,
    ArchiveRouteRow,
    MountPolicyRow,
    RequesterMountRuleRow,
    RequesterGroupMountRuleRow,
    RequesterActivityMountRuleRow,
    TapeDriveRow,
);
