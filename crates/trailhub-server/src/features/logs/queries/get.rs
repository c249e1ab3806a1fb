use bson::oid::ObjectId;
use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::features::logs::store::{LogStore, StoreError};
use crate::features::logs::types::LogRecord;
use crate::features::shared::validation::{parse_object_id, IdValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetLogQuery {
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetLogError {
    #[error(transparent)]
    InvalidId(#[from] IdValidationError),

    /// Carries the identifier exactly as requested
    #[error("Document with '{0}' not found.")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Request<Result<LogRecord, GetLogError>> for GetLogQuery {}

impl GetLogQuery {
    pub fn validate(&self) -> Result<ObjectId, GetLogError> {
        Ok(parse_object_id(&self.id)?)
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(store: &dyn LogStore, query: GetLogQuery) -> Result<LogRecord, GetLogError> {
    let id = query.validate()?;

    let document = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| GetLogError::NotFound(query.id.clone()))?;

    Ok(document.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{MemoryStore, TestLog};

    #[test]
    fn test_validation_failure_malformed_id() {
        let query = GetLogQuery {
            id: "12345".to_string(),
        };
        assert!(matches!(query.validate(), Err(GetLogError::InvalidId(_))));
    }

    #[tokio::test]
    async fn test_handle_found() {
        let store = MemoryStore::default();
        let stored = TestLog::new("billing", "exported").with_user("u-1").insert(&store).await;

        let record = handle(&store, GetLogQuery { id: stored.id.to_hex() }).await.unwrap();

        assert_eq!(record.id, stored.id.to_hex());
        assert_eq!(record.message, "exported");
        assert_eq!(record.user_id.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn test_handle_not_found_names_id() {
        let store = MemoryStore::default();
        let id = ObjectId::new().to_hex();

        let err = handle(&store, GetLogQuery { id: id.clone() }).await.unwrap_err();

        match err {
            GetLogError::NotFound(missing) => assert_eq!(missing, id),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_handle_malformed_id_is_not_not_found() {
        let store = MemoryStore::default();

        let err = handle(&store, GetLogQuery { id: "nope".to_string() }).await.unwrap_err();

        assert!(matches!(err, GetLogError::InvalidId(_)));
    }
}
