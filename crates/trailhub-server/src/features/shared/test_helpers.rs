//! Test helpers and fixtures for handler tests
//!
//! ```rust,ignore
//! use crate::features::shared::test_helpers::*;
//!
//! let store = MemoryStore::default();
//! let doc = TestLog::new("billing", "exported").with_user("u-1").insert(&store).await;
//! ```

use async_trait::async_trait;
use bson::{oid::ObjectId, Document};
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

use crate::client_info::ClientInfo;
use crate::features::logs::store::{LogStore, PageRequest, StoreError, StoredPage};
use crate::features::logs::types::{LogDocument, SortOrder};

/// `LogStore` backed by a vector, with equality-only filtering
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<LogDocument>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }
}

fn matches(document: &LogDocument, filter: &Document) -> bool {
    let stored = bson::to_document(document).unwrap();
    filter.iter().all(|(key, value)| stored.get(key) == Some(value))
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn insert(&self, document: LogDocument) -> Result<LogDocument, StoreError> {
        self.documents.lock().unwrap().push(document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<LogDocument>, StoreError> {
        Ok(self.documents.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    async fn find_page(&self, request: PageRequest) -> Result<StoredPage, StoreError> {
        let mut found: Vec<LogDocument> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| matches(d, &request.filter))
            .cloned()
            .collect();

        found.sort_by_key(|d| d.created);
        if request.sort == SortOrder::Desc {
            found.reverse();
        }

        let total = found.len() as u64;
        let documents = found
            .into_iter()
            .skip(request.skip as usize)
            .take(request.limit as usize)
            .collect();

        Ok(StoredPage { documents, total })
    }
}

/// Builder for stored log documents
#[derive(Debug, Clone)]
pub struct TestLog {
    source: String,
    message: String,
    user_id: Option<String>,
    created: Option<DateTime<Utc>>,
}

impl TestLog {
    pub fn new(source: &str, message: &str) -> Self {
        Self {
            source: source.to_string(),
            message: message.to_string(),
            user_id: None,
            created: None,
        }
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Shift `created` by whole minutes from now
    pub fn minutes_ago(mut self, minutes: i64) -> Self {
        self.created = Some(Utc::now() - Duration::minutes(minutes));
        self
    }

    pub fn build(self) -> LogDocument {
        let mut doc = LogDocument::new(self.source, self.message, self.user_id, ClientInfo::default());
        if let Some(created) = self.created {
            doc.created = bson::DateTime::from_chrono(created).to_chrono();
        }
        doc
    }

    pub async fn insert(self, store: &MemoryStore) -> LogDocument {
        store.insert(self.build()).await.unwrap()
    }
}
