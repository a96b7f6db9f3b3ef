//! Parsing of disk instance space free-space query URLs.

use crate::error::ProbeError;
use reqwest::Url;
use std::fmt;
use std::str::FromStr;

const CONSTANT_PREFIX: &str = "constantFreeSpace:";
const EOS_SPACE_PREFIX: &str = "eosSpace:";

/// How the free space of a disk instance space is obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FreeSpaceQuery {
    /// `constantFreeSpace:<bytes>`: a fixed value, mostly for tests and small setups.
    Constant(u64),
    /// `eosSpace:<spaceName>`: asked of the external free disk space script.
    Script { space_name: String },
    /// `http://...` or `https://...`: a GET answering `{"freeSpace": <bytes>}`.
    Http(Url),
}

impl FreeSpaceQuery {
    pub fn parse(url: &str) -> Result<Self, ProbeError> {
        let invalid = |reason: &str| ProbeError::InvalidQueryUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        if let Some(bytes) = url.strip_prefix(CONSTANT_PREFIX) {
            return bytes
                .trim()
                .parse()
                .map(Self::Constant)
                .map_err(|_| invalid("constant free space must be a non-negative integer"));
        }
        if let Some(space_name) = url.strip_prefix(EOS_SPACE_PREFIX) {
            let space_name = space_name.trim();
            if space_name.is_empty() {
                return Err(invalid("missing space name"));
            }
            return Ok(Self::Script {
                space_name: space_name.to_string(),
            });
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return Url::parse(url)
                .map(Self::Http)
                .map_err(|e| invalid(&e.to_string()));
        }
        Err(invalid(
            "expected constantFreeSpace:, eosSpace:, http:// or https://",
        ))
    }

    /// Short label used in logs and metrics.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Constant(_) => "constant",
            Self::Script { .. } => "script",
            Self::Http(_) => "http",
        }
    }
}

impl FromStr for FreeSpaceQuery {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FreeSpaceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(bytes) => write!(f, "{CONSTANT_PREFIX}{bytes}"),
            Self::Script { space_name } => write!(f, "{EOS_SPACE_PREFIX}{space_name}"),
            Self::Http(url) => write!(f, "{url}"),
        }
    }
}
