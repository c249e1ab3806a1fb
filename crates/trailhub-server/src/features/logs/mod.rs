pub mod commands;
pub mod filter;
pub mod queries;
pub mod routes;
pub mod store;
pub mod types;

pub use commands::{CreateLogCommand, CreateLogError};
pub use filter::FilterMode;
pub use queries::{GetLogError, GetLogQuery, ListLogsError, ListLogsQuery};
pub use routes::logs_routes;
pub use store::{LogStore, MongoLogStore, PageRequest, StoreError, StoredPage};
pub use types::{LogDocument, LogFilter, LogRecord, SortOrder};
