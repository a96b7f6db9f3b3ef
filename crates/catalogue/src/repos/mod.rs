//! Repository traits, one per entity kind.

pub mod admin_users;
pub mod archive_files;
pub mod archive_routes;
pub mod disk_instances;
pub mod disk_systems;
pub mod drives;
pub mod libraries;
pub mod media_types;
pub mod mount_policies;
pub mod storage_classes;
pub mod tape_pools;
pub mod tapes;
pub mod virtual_organizations;

pub use admin_users::AdminUserRepo;
pub use archive_files::{ArchiveFileRepo, FileRecycleLogRepo};
pub use archive_routes::ArchiveRouteRepo;
pub use disk_instances::{DiskInstanceRepo, DiskInstanceSpaceRepo};
pub use disk_systems::DiskSystemRepo;
pub use drives::{DiskSpaceReservations, DriveStateRepo};
pub use libraries::{LogicalLibraryRepo, PhysicalLibraryRepo};
pub use media_types::MediaTypeRepo;
pub use mount_policies::{MountPolicyRepo, RequesterMountRuleRepo, RequesterMountRules};
pub use storage_classes::StorageClassRepo;
pub use tape_pools::TapePoolRepo;
pub use tapes::TapeRepo;
pub use virtual_organizations::VirtualOrganizationRepo;
