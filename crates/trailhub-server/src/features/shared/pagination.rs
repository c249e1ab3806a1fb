//! Shared pagination utilities
//!
//! Page numbers are 1-indexed. `size` defaults to 50 and may not exceed 100.
//!
//! # Examples
//!
//! ```rust,ignore
//! use trailhub_server::features::shared::pagination::{Page, PaginationParams};
//!
//! let params = PaginationParams::new(Some(2), Some(20));
//! let skip = params.skip();
//!
//! // After fetching data...
//! let page = Page::from_items(items, &params, total);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::logs::LogRecord;

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Common pagination request parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page. Defaults to 50.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        Self { page, size }
    }

    /// Get the page number (1-indexed), defaulting to 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get items per page, defaulting to 50 and clamped to 1-100
    pub fn size(&self) -> i64 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Number of documents to skip before the current page
    ///
    /// Saturates at `i64::MAX`; [`validate`](Self::validate) rejects such pages.
    pub fn skip(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.size()) as u64
    }

    /// Reject out-of-range values instead of silently clamping them
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(page) = self.page {
            if page < 1 {
                return Err("Page must be greater than 0");
            }
        }
        if let Some(size) = self.size {
            if !(1..=MAX_PAGE_SIZE).contains(&size) {
                return Err("Size must be between 1 and 100");
            }
        }
        // the store takes the skip as a signed 64-bit count
        if (self.page() - 1).checked_mul(self.size()).is_none() {
            return Err("Page is out of range");
        }
        Ok(())
    }
}

/// A bounded slice of a result set plus paging metadata
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[aliases(LogPage = Page<LogRecord>)]
pub struct Page<T> {
    /// Items on the current page
    pub items: Vec<T>,

    /// Number of matching items across all pages
    pub total: u64,

    /// Current page number (1-indexed)
    pub page: i64,

    /// Requested page size
    pub size: i64,

    /// Total number of pages
    pub pages: u64,
}

impl<T> Page<T> {
    /// Create a page from items, params and total count
    pub fn from_items(items: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        let size = params.size();
        Self {
            items,
            total,
            page: params.page(),
            size,
            pages: total.div_ceil(size as u64),
        }
    }

    /// Map items to a different type
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
            pages: self.pages,
        }
    }
}
