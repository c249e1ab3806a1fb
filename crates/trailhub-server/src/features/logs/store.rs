//! Persistence seam for log documents
//!
//! Handlers only depend on [`LogStore`]. [`MongoLogStore`] is the production
//! implementation and bounds every driver call with a timeout.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::{options::FindOptions, Collection, Database, IndexModel};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::types::{LogDocument, SortOrder};

/// Fields the list and get queries rely on.
pub const INDEXED_FIELDS: [&str; 4] = ["created", "source", "user_id", "anonymous"];

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },
}

/// One page of a filtered, sorted scan
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub filter: Document,
    pub sort: SortOrder,
    pub skip: u64,
    pub limit: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredPage {
    pub documents: Vec<LogDocument>,
    pub total: u64,
}

#[async_trait]
pub trait LogStore: Send + Sync {
    /// Persist a new document and return it as stored
    async fn insert(&self, document: LogDocument) -> Result<LogDocument, StoreError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<LogDocument>, StoreError>;

    /// Documents matching `filter`, sorted on `created`, plus the total match count
    async fn find_page(&self, request: PageRequest) -> Result<StoredPage, StoreError>;
}

#[derive(Clone)]
pub struct MongoLogStore {
    collection: Collection<LogDocument>,
    timeout: Duration,
}

impl MongoLogStore {
    pub fn new(database: &Database, collection: &str, timeout: Duration) -> Self {
        Self {
            collection: database.collection(collection),
            timeout,
        }
    }

    /// Create the indexes used by the log queries
    ///
    /// Must run once after the gateway connected and before the router serves.
    #[tracing::instrument(skip(self), fields(collection = %self.collection.name()))]
    pub async fn register_schema(&self) -> Result<(), StoreError> {
        let indexes = INDEXED_FIELDS.iter().map(|field| {
            let mut keys = Document::new();
            keys.insert(*field, 1);
            IndexModel::builder().keys(keys).build()
        });

        let result = self
            .bounded("create_indexes", self.collection.create_indexes(indexes, None))
            .await?;

        info!(indexes = ?result.index_names, "Log schema registered");
        Ok(())
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = mongodb::error::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout {
                operation,
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl LogStore for MongoLogStore {
    #[tracing::instrument(skip(self, document), fields(source = %document.source))]
    async fn insert(&self, document: LogDocument) -> Result<LogDocument, StoreError> {
        let result = self
            .bounded("insert_one", self.collection.insert_one(&document, None))
            .await?;

        debug!(inserted_id = %result.inserted_id, "Log document inserted");
        Ok(document)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<LogDocument>, StoreError> {
        self.bounded("find_one", self.collection.find_one(doc! { "_id": id }, None))
            .await
    }

    #[tracing::instrument(skip(self), fields(filter = %request.filter))]
    async fn find_page(&self, request: PageRequest) -> Result<StoredPage, StoreError> {
        let options = FindOptions::builder()
            .sort(doc! { "created": request.sort.direction() })
            .skip(request.skip)
            .limit(request.limit)
            .build();

        let count = self.bounded(
            "count_documents",
            self.collection.count_documents(request.filter.clone(), None),
        );
        let find = self.bounded("find", async {
            let cursor = self.collection.find(request.filter.clone(), options).await?;
            cursor.try_collect::<Vec<_>>().await
        });

        let (total, documents) = tokio::try_join!(count, find)?;

        Ok(StoredPage { documents, total })
    }
}
