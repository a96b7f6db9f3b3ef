//! Acting identities and the entry logs recorded against every catalogue row.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The operator or service performing a mutating catalogue call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityIdentity {
    pub username: String,
    pub host: String,
}

impl SecurityIdentity {
    pub fn new(username: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            host: host.into(),
        }
    }

    /// Build the entry log for a write happening now.
    pub fn log_now(&self) -> EntryLog {
        EntryLog {
            username: self.username.clone(),
            host: self.host.clone(),
            time: OffsetDateTime::now_utc(),
        }
    }
}

impl std::fmt::Display for SecurityIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.username, self.host)
    }
}

/// Who changed a row, from where, and when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLog {
    pub username: String,
    pub host: String,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_now_copies_identity() {
        let admin = SecurityIdentity::new("admin", "ops01");
        let before = OffsetDateTime::now_utc();
        let log = admin.log_now();
        assert_eq!(log.username, "admin");
        assert_eq!(log.host, "ops01");
        assert!(log.time >= before);
        assert_eq!(admin.to_string(), "admin@ops01");
    }
}
