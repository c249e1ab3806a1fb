//! Log API routes
//!
//! # Route Structure
//!
//! - `POST /logs` - Record a log event (credential required unless anonymous push is allowed)
//! - `GET /logs` - List logs with filters, sort and pagination (read permission required)
//! - `GET /logs/:id` - Get a single log by identifier (read permission required)
//!
//! ```rust,ignore
//! let app = Router::new().nest("/logs", logs_routes(state));
//! ```

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        ConnectInfo, Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;

use super::{
    commands::{self, CreateLogCommand, CreateLogError},
    queries::{self, GetLogError, GetLogQuery, ListLogsError, ListLogsQuery},
    types::LogRecord,
};
use crate::auth::AccessLayer;
use crate::client_info::ClientInfo;
use crate::error::{method_not_allowed, AppError, AppResult};
use crate::features::shared::pagination::Page;
use crate::features::FeatureState;

// ============================================================================
// Router Configuration
// ============================================================================

pub fn logs_routes(state: FeatureState) -> Router {
    let read_gate = AccessLayer::require_permissions(
        state.verifier.clone(),
        state.policy.read_permissions.clone(),
    );

    let mut create = post(create_log);
    if !state.policy.allow_anonymous_push {
        create = create.route_layer(AccessLayer::require_credential(state.verifier.clone()));
    }

    Router::new()
        .route(
            "/",
            create
                .merge(get(list_logs).route_layer(read_gate.clone()))
                .fallback(method_not_allowed),
        )
        .route(
            "/:id",
            get(get_log).route_layer(read_gate).fallback(method_not_allowed),
        )
        .with_state(state)
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Record a log event
///
/// Client metadata (IP, MAC, device, OS, browser) is taken from the request,
/// never from the body.
#[utoipa::path(
    post,
    path = "/logs",
    tag = "LOGS",
    request_body = CreateLogCommand,
    responses(
        (status = 201, description = "Log created", body = LogRecord),
        (status = 401, description = "Missing or rejected credential", body = ErrorEnvelope),
        (status = 422, description = "Invalid payload", body = ErrorEnvelope),
        (status = 500, description = "Store failure", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_log(
    State(state): State<FeatureState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<CreateLogCommand>, JsonRejection>,
) -> AppResult<(StatusCode, Json<LogRecord>)> {
    let Json(command) = payload?;

    let client = ClientInfo::collect(
        &headers,
        connect_info.map(|ConnectInfo(addr)| addr),
        state.mac_resolver.as_ref(),
    )
    .await;

    let record = commands::create::handle(
        state.store.as_ref(),
        command,
        client,
        state.policy.strip_source_spaces,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// List logs
///
/// All supplied filters must match. Results are ordered on `created`.
#[utoipa::path(
    get,
    path = "/logs",
    tag = "LOGS",
    params(ListLogsQuery),
    responses(
        (status = 200, description = "One page of logs", body = LogPage),
        (status = 401, description = "Missing or rejected credential", body = ErrorEnvelope),
        (status = 403, description = "Missing read permission", body = ErrorEnvelope),
        (status = 422, description = "Invalid query string", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_logs(
    State(state): State<FeatureState>,
    query: Result<Query<ListLogsQuery>, QueryRejection>,
) -> AppResult<Json<Page<LogRecord>>> {
    let Query(query) = query?;

    let page = queries::list::handle(
        state.store.as_ref(),
        query,
        state.policy.strip_source_spaces,
        state.policy.filter_mode,
    )
    .await?;

    Ok(Json(page))
}

/// Get a log by identifier
#[utoipa::path(
    get,
    path = "/logs/{id}",
    tag = "LOGS",
    params(("id" = String, Path, description = "24-character hexadecimal identifier")),
    responses(
        (status = 200, description = "Log found", body = LogRecord),
        (status = 401, description = "Missing or rejected credential", body = ErrorEnvelope),
        (status = 403, description = "Missing read permission", body = ErrorEnvelope),
        (status = 404, description = "Log not found", body = ErrorEnvelope),
        (status = 422, description = "Malformed identifier", body = ErrorEnvelope)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_log(
    State(state): State<FeatureState>,
    id: Result<Path<String>, PathRejection>,
) -> AppResult<Json<LogRecord>> {
    let Path(id) = id?;

    let record = queries::get::handle(state.store.as_ref(), GetLogQuery { id }).await?;

    Ok(Json(record))
}

// ============================================================================
// Error Handling
// ============================================================================

impl From<CreateLogError> for AppError {
    fn from(err: CreateLogError) -> Self {
        match err {
            CreateLogError::SourceRequired | CreateLogError::MessageRequired => {
                AppError::Validation(err.to_string())
            },
            CreateLogError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<ListLogsError> for AppError {
    fn from(err: ListLogsError) -> Self {
        match err {
            ListLogsError::Pagination(message) => AppError::Validation(message.to_string()),
            ListLogsError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<GetLogError> for AppError {
    fn from(err: GetLogError) -> Self {
        match err {
            GetLogError::InvalidId(e) => AppError::Validation(e.to_string()),
            GetLogError::NotFound(id) => AppError::DocumentNotFound(id),
            GetLogError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
