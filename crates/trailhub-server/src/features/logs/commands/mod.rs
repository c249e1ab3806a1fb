pub mod create;

pub use create::{CreateLogCommand, CreateLogError};
