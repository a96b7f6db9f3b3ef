//! Tape lifecycle states and archive route types.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// State of a tape cartridge.
///
/// Every state other than [`TapeState::Active`] must be accompanied by a reason.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TapeState {
    Active,
    Disabled,
    Broken,
    Exported,
    Repacking,
}

impl TapeState {
    pub const ALL: [TapeState; 5] = [
        TapeState::Active,
        TapeState::Disabled,
        TapeState::Broken,
        TapeState::Exported,
        TapeState::Repacking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TapeState::Active => "ACTIVE",
            TapeState::Disabled => "DISABLED",
            TapeState::Broken => "BROKEN",
            TapeState::Exported => "EXPORTED",
            TapeState::Repacking => "REPACKING",
        }
    }

    pub fn requires_reason(&self) -> bool {
        !matches!(self, TapeState::Active)
    }
}

impl fmt::Display for TapeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TapeState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TapeState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| Error::InvalidTapeState(s.to_string()))
    }
}

impl TryFrom<String> for TapeState {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Whether an archive route serves normal archival or repack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArchiveRouteType {
    Default,
    Repack,
}

impl ArchiveRouteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveRouteType::Default => "DEFAULT",
            ArchiveRouteType::Repack => "REPACK",
        }
    }
}

impl fmt::Display for ArchiveRouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchiveRouteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DEFAULT" => Ok(ArchiveRouteType::Default),
            "REPACK" => Ok(ArchiveRouteType::Repack),
            other => Err(Error::InvalidRouteType(other.to_string())),
        }
    }
}

impl TryFrom<String> for ArchiveRouteType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}
