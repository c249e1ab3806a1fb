//! Create log command
//!
//! The payload carries only `source`, `message` and `user_id`; client metadata is
//! collected from the request by the route and passed in as [`ClientInfo`].

use mediator::Request;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::client_info::ClientInfo;
use crate::features::logs::store::{LogStore, StoreError};
use crate::features::logs::types::{LogDocument, LogRecord};
use crate::features::shared::validation::{non_blank, normalize_source};

/// Payload of `POST /logs`
///
/// ```rust,ignore
/// let command = CreateLogCommand {
///     source: "Billing API".to_string(),
///     message: "Invoice 2024-118 exported".to_string(),
///     user_id: Some("u-42".to_string()),
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateLogCommand {
    /// Originating system or component
    #[schema(example = "Billing API")]
    pub source: String,

    #[schema(example = "Invoice 2024-118 exported")]
    pub message: String,

    /// Acting user; omit for anonymous events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateLogError {
    #[error("Field 'source' is required and cannot be blank")]
    SourceRequired,

    #[error("Field 'message' is required and cannot be blank")]
    MessageRequired,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<LogRecord, CreateLogError>> for CreateLogCommand {}

impl CreateLogCommand {
    pub fn validate(&self) -> Result<(), CreateLogError> {
        if self.source.trim().is_empty() {
            return Err(CreateLogError::SourceRequired);
        }
        if self.message.trim().is_empty() {
            return Err(CreateLogError::MessageRequired);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(store, command, client), fields(source = %command.source))]
pub async fn handle(
    store: &dyn LogStore,
    command: CreateLogCommand,
    client: ClientInfo,
    strip_source_spaces: bool,
) -> Result<LogRecord, CreateLogError> {
    command.validate()?;

    let document = LogDocument::new(
        normalize_source(&command.source, strip_source_spaces),
        command.message,
        non_blank(command.user_id.as_deref()),
        client,
    );

    let stored = store.insert(document).await?;

    tracing::info!(
        log_id = %stored.id,
        source = %stored.source,
        anonymous = stored.anonymous,
        "Log created"
    );

    Ok(stored.into())
}
