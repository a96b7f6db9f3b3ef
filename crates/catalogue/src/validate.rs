//! Field-level checks shared by every repository.

use crate::error::{CatalogueError, CatalogueResult};
use tapecat_core::MAX_COMMENT_LENGTH;

/// Reject an empty string field.
pub fn non_empty(field: &'static str, value: &str) -> CatalogueResult<()> {
    if value.is_empty() {
        return Err(CatalogueError::empty(field));
    }
    Ok(())
}

/// Reject a zero numeric field.
pub fn non_zero(field: &'static str, value: u64) -> CatalogueResult<()> {
    if value == 0 {
        return Err(CatalogueError::zero(field));
    }
    Ok(())
}

/// Reject an optional string field that is set but empty.
pub fn non_empty_if_set(field: &'static str, value: Option<&str>) -> CatalogueResult<()> {
    match value {
        Some(v) => non_empty(field, v),
        None => Ok(()),
    }
}

/// Convert an unsigned value to the signed column type.
pub fn to_db(field: &'static str, value: u64) -> CatalogueResult<i64> {
    i64::try_from(value)
        .map_err(|_| CatalogueError::invalid(field, format!("{value} exceeds {}", i64::MAX)))
}

/// Check that a regular expression compiles.
pub fn regex(field: &'static str, pattern: &str) -> CatalogueResult<()> {
    non_empty(field, pattern)?;
    regex::Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| CatalogueError::invalid(field, e.to_string()))
}

/// Validate a mandatory comment and cut it to the stored length.
pub fn comment(field: &'static str, value: &str) -> CatalogueResult<String> {
    non_empty(field, value)?;
    Ok(truncate(field, value))
}

/// Cut a free-text value to the stored length, logging when it was too long.
pub fn truncate(field: &'static str, value: &str) -> String {
    if value.chars().count() <= MAX_COMMENT_LENGTH {
        return value.to_string();
    }
    tracing::warn!(
        field,
        length = value.chars().count(),
        max = MAX_COMMENT_LENGTH,
        "Truncating over-long value"
    );
    value.chars().take(MAX_COMMENT_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_non_empty_names_field() {
        let err = non_empty("name", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("name"));
        assert!(non_empty("name", "pool").is_ok());
    }

    #[test]
    fn test_non_zero() {
        assert!(non_zero("nb_copies", 0).is_err());
        assert!(non_zero("nb_copies", 1).is_ok());
    }

    #[test]
    fn test_to_db_rejects_overflow() {
        assert_eq!(to_db("capacity", 10).unwrap(), 10);
        assert!(to_db("capacity", u64::MAX).is_err());
    }

    #[test]
    fn test_regex_must_compile() {
        assert!(regex("file_regexp", "^root://eos/").is_ok());
        let err = regex("file_regexp", "([unclosed").unwrap_err();
        assert!(err.to_string().contains("file_regexp"));
        assert!(matches!(
            regex("file_regexp", "").unwrap_err(),
            CatalogueError::EmptyField { .. }
        ));
    }

    #[test]
    fn test_comment_truncated() {
        let long = "x".repeat(MAX_COMMENT_LENGTH + 20);
        let stored = comment("comment", &long).unwrap();
        assert_eq!(stored.len(), MAX_COMMENT_LENGTH);
        assert!(comment("comment", "").is_err());
        assert_eq!(truncate("comment", "short"), "short");
    }
}
