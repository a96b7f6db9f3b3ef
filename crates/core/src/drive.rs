//! Tape drive mount types and statuses.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of mount a drive is serving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MountType {
    NoMount,
    ArchiveForUser,
    ArchiveForRepack,
    Retrieve,
    Label,
}

impl MountType {
    const ALL: [MountType; 5] = [
        MountType::NoMount,
        MountType::ArchiveForUser,
        MountType::ArchiveForRepack,
        MountType::Retrieve,
        MountType::Label,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MountType::NoMount => "NO_MOUNT",
            MountType::ArchiveForUser => "ARCHIVE_FOR_USER",
            MountType::ArchiveForRepack => "ARCHIVE_FOR_REPACK",
            MountType::Retrieve => "RETRIEVE",
            MountType::Label => "LABEL",
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, MountType::ArchiveForUser | MountType::ArchiveForRepack)
    }
}

impl fmt::Display for MountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MountType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidMountType(s.to_string()))
    }
}

impl TryFrom<String> for MountType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Reported status of a tape drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveStatus {
    Down,
    Up,
    Probing,
    Starting,
    Mounting,
    Transferring,
    Unloading,
    Unmounting,
    DrainingToDisk,
    CleaningUp,
    Shutdown,
    Unknown,
}

impl DriveStatus {
    const ALL: [DriveStatus; 12] = [
        DriveStatus::Down,
        DriveStatus::Up,
        DriveStatus::Probing,
        DriveStatus::Starting,
        DriveStatus::Mounting,
        DriveStatus::Transferring,
        DriveStatus::Unloading,
        DriveStatus::Unmounting,
        DriveStatus::DrainingToDisk,
        DriveStatus::CleaningUp,
        DriveStatus::Shutdown,
        DriveStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriveStatus::Down => "DOWN",
            DriveStatus::Up => "UP",
            DriveStatus::Probing => "PROBING",
            DriveStatus::Starting => "STARTING",
            DriveStatus::Mounting => "MOUNTING",
            DriveStatus::Transferring => "TRANSFERRING",
            DriveStatus::Unloading => "UNLOADING",
            DriveStatus::Unmounting => "UNMOUNTING",
            DriveStatus::DrainingToDisk => "DRAINING_TO_DISK",
            DriveStatus::CleaningUp => "CLEANING_UP",
            DriveStatus::Shutdown => "SHUTDOWN",
            DriveStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for DriveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriveStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DriveStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidDriveStatus(s.to_string()))
    }
}

impl TryFrom<String> for DriveStatus {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_type_round_trip() {
        for t in MountType::ALL {
            assert_eq!(t.as_str().parse::<MountType>().unwrap(), t);
        }
        assert!(MountType::ArchiveForRepack.is_archive());
        assert!(!MountType::Retrieve.is_archive());
    }

    #[test]
    fn test_unknown_drive_status_rejected() {
        assert_eq!(
            "DRAINING_TO_DISK".parse::<DriveStatus>().unwrap(),
            DriveStatus::DrainingToDisk
        );
        assert!("SLEEPING".parse::<DriveStatus>().is_err());
    }
}
