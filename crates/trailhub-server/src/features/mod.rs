//! Feature modules implementing the TrailHub API
//!
//! # Features
//!
//! - **logs**: Recording and querying activity logs
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions
//! - `types.rs` - Shared types

pub mod logs;
pub mod shared;

use axum::Router;
use std::sync::Arc;

use crate::auth::AccessVerifier;
use crate::client_info::MacResolver;
use crate::config::Config;
use logs::{FilterMode, LogStore};

/// Shared state for all feature routes
///
/// Everything is behind an `Arc` and read-only once the router is built.
#[derive(Clone)]
pub struct FeatureState {
    pub store: Arc<dyn LogStore>,
    pub verifier: Arc<dyn AccessVerifier>,
    pub mac_resolver: Arc<dyn MacResolver>,
    pub policy: LogsPolicy,
}

/// Request-independent switches for the log endpoints
#[derive(Debug, Clone)]
pub struct LogsPolicy {
    /// When false, `POST /logs` requires a valid credential
    pub allow_anonymous_push: bool,
    pub strip_source_spaces: bool,
    pub filter_mode: FilterMode,
    /// Permissions the read endpoints demand
    pub read_permissions: Vec<String>,
}

impl LogsPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            allow_anonymous_push: config.logs.allow_anonymous_push,
            strip_source_spaces: config.logs.strip_source_spaces,
            filter_mode: config.logs.filter_mode,
            read_permissions: vec![config.auth.read_permission.clone()],
        }
    }
}

/// Creates the feature router with all feature routes mounted
///
/// - `/logs` - Log ingestion and queries
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest("/logs", logs::logs_routes(state))
}
