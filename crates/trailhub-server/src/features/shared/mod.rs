//! Shared utilities and types for feature modules
//!
//! # Contents
//!
//! - **pagination**: Page request parameters and the page envelope
//! - **validation**: Identifier parsing and source normalization
//! - **test_helpers**: In-memory store and fixtures (test-only)

pub mod pagination;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

// Re-export commonly used types
pub use pagination::{LogPage, Page, PaginationParams};
pub use validation::{non_blank, normalize_source, parse_object_id, IdValidationError};
