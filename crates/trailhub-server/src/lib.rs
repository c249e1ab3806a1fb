//! TrailHub Server Library
//!
//! HTTP service that records activity logs and lets consumers query them.
//!
//! # Overview
//!
//! - **Ingestion**: `POST /logs` stores an event together with request-derived client
//!   metadata (IP, MAC, device, OS, browser)
//! - **Queries**: `GET /logs` (filters, sort, pagination) and `GET /logs/{id}`
//! - **Access control**: bearer credentials checked against an external authorization
//!   service
//! - **Storage**: MongoDB behind the [`features::logs::LogStore`] trait
//!
//! # Architecture
//!
//! Features are vertical slices (`features/<name>/{commands,queries,routes.rs}`).
//! Commands and queries are plain async `handle` functions with their own error enums;
//! routes convert those errors into [`AppError`], the single error renderer.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use trailhub_server::{api, auth::HttpAccessVerifier, client_info::SystemMacResolver};
//! use trailhub_server::config::Config;
//! use trailhub_server::db::MongoGateway;
//! use trailhub_server::features::{logs::MongoLogStore, FeatureState, LogsPolicy};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let gateway = MongoGateway::new(config.database.clone(), &config.app.name);
//!     let store = MongoLogStore::new(&gateway.database().await?, &config.database.collection, config.database.timeout());
//!     store.register_schema().await?;
//!
//!     let state = FeatureState {
//!         store: Arc::new(store),
//!         verifier: Arc::new(HttpAccessVerifier::from_config(&config.auth)?),
//!         mac_resolver: Arc::new(SystemMacResolver::default()),
//!         policy: LogsPolicy::from_config(&config),
//!     };
//!     let app = api::create_router(state, &config);
//!     # let _ = app;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client_info;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;

// Re-export commonly used types
pub use error::{AppError, AppResult};
