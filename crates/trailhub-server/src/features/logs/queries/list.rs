//! List logs query
//!
//! Supports equality filters on the stored fields, a sort direction on `created`
//! and page-based pagination.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::features::logs::filter::FilterMode;
use crate::features::logs::store::{LogStore, PageRequest, StoreError};
use crate::features::logs::types::{LogFilter, LogRecord, SortOrder};
use crate::features::shared::pagination::{Page, PaginationParams};
use crate::features::shared::validation::normalize_source;

/// Query string of `GET /logs`
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLogsQuery {
    /// Matched after the same normalization as stored sources
    pub source: Option<String>,
    pub user_id: Option<String>,
    pub device: Option<String>,
    pub os: Option<String>,
    pub is_tablet: Option<bool>,
    pub is_mobile: Option<bool>,
    pub is_pc: Option<bool>,
    pub is_bot: Option<bool>,
    pub anonymous: Option<bool>,
    /// Exact creation time (RFC 3339)
    pub created: Option<DateTime<Utc>>,
    /// Direction on `created`; defaults to `asc`
    pub sort: Option<SortOrder>,
    /// Page number (1-indexed)
    #[param(minimum = 1)]
    pub page: Option<i64>,
    /// Items per page
    #[param(minimum = 1, maximum = 100)]
    pub size: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListLogsError {
    #[error("{0}")]
    Pagination(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<Page<LogRecord>, ListLogsError>> for ListLogsQuery {}

impl ListLogsQuery {
    pub fn validate(&self) -> Result<(), ListLogsError> {
        self.pagination().validate().map_err(ListLogsError::Pagination)
    }

    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.size)
    }

    /// Filter with `source` normalized
    ///
    /// A supplied but empty string stays a constraint and matches no stored value.
    pub fn filter(&self, strip_source_spaces: bool) -> LogFilter {
        LogFilter {
            source: self
                .source
                .as_deref()
                .map(|s| normalize_source(s, strip_source_spaces)),
            user_id: self.user_id.clone(),
            device: self.device.clone(),
            os: self.os.clone(),
            is_tablet: self.is_tablet,
            is_mobile: self.is_mobile,
            is_pc: self.is_pc,
            is_bot: self.is_bot,
            anonymous: self.anonymous,
            created: self.created,
        }
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn LogStore,
    query: ListLogsQuery,
    strip_source_spaces: bool,
    mode: FilterMode,
) -> Result<Page<LogRecord>, ListLogsError> {
    query.validate()?;

    let pagination = query.pagination();
    let filter = query.filter(strip_source_spaces).to_document(mode);

    let stored = store
        .find_page(PageRequest {
            filter,
            sort: query.sort.unwrap_or_default(),
            skip: pagination.skip(),
            limit: pagination.size(),
        })
        .await?;

    tracing::debug!(
        count = stored.documents.len(),
        total = stored.total,
        "Logs listed"
    );

    Ok(Page::from_items(stored.documents, &pagination, stored.total).map(LogRecord::from))
}
