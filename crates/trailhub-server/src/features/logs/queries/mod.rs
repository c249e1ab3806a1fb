pub mod get;
pub mod list;

pub use get::{GetLogError, GetLogQuery};
pub use list::{ListLogsError, ListLogsQuery};
