//! Shared validation utilities
//!
//! ```rust,ignore
//! use trailhub_server::features::shared::validation::{normalize_source, parse_object_id};
//!
//! let id = parse_object_id("6756f47af9096fa27c21d567")?;
//! assert_eq!(normalize_source(" Billing API ", true), "billingapi");
//! ```

use bson::oid::ObjectId;
use thiserror::Error;

/// Errors that can occur during identifier validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdValidationError {
    #[error("Identifier is required and cannot be empty")]
    Required,

    #[error("'{0}' is not a valid identifier: expected 24 hexadecimal characters")]
    InvalidFormat(String),
}

/// Parse a document identifier from its 24-character hex form
pub fn parse_object_id(raw: &str) -> Result<ObjectId, IdValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdValidationError::Required);
    }

    ObjectId::parse_str(trimmed).map_err(|_| IdValidationError::InvalidFormat(raw.to_string()))
}

/// Canonical form of a source label
///
/// Lower-cased; with `strip_spaces` every whitespace character is removed,
/// otherwise only the ends are trimmed. Applied identically to stored values
/// and to `source` filters so the two always compare equal.
pub fn normalize_source(raw: &str, strip_spaces: bool) -> String {
    if strip_spaces {
        raw.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    } else {
        raw.trim().to_lowercase()
    }
}

/// `Some(trimmed)` unless the value is missing or blank
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
