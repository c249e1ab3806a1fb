//! OpenAPI document served at `/trailhub/openapi.json` and rendered by Redoc

use utoipa::OpenApi;

use crate::error::ErrorEnvelope;
use crate::features::logs::{routes, CreateLogCommand, LogRecord, SortOrder};
use crate::features::shared::pagination::LogPage;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TrailHub",
        description = "A system for logging actions performed on your system."
    ),
    paths(super::ping, routes::create_log, routes::list_logs, routes::get_log),
    components(schemas(LogRecord, CreateLogCommand, LogPage, SortOrder, ErrorEnvelope, super::Pong)),
    tags(
        (name = "LOGS", description = "Record and query activity logs"),
        (name = "DEFAULT", description = "Service endpoints")
    )
)]
pub struct ApiDoc;

/// The document with the configured application name as title
pub fn openapi(app_name: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = format!("UNSTA: {}", app_name);
    doc
}
