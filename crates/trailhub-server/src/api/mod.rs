pub mod docs;

use axum::{
    response::{IntoResponse, Redirect},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_redoc::{Redoc, Servable};

use crate::config::Config;
use crate::error::{method_not_allowed, route_not_found};
use crate::features::{self, FeatureState};
use crate::middleware;

pub const DOCS_PATH: &str = "/trailhub/docs";
pub const OPENAPI_PATH: &str = "/trailhub/openapi.json";
pub const PING_PATH: &str = "/trailhub/@ping";

/// Build the full application router: service endpoints, docs, features and layers
///
/// Unknown paths, unsupported methods and handler panics all answer with the
/// error envelope.
pub fn create_router(state: FeatureState, config: &Config) -> Router {
    let openapi = docs::openapi(&config.app.name);
    let openapi_json = openapi.clone();

    let router = Router::new()
        .route("/", get(root).fallback(method_not_allowed))
        .route(PING_PATH, get(ping).fallback(method_not_allowed))
        .route(
            OPENAPI_PATH,
            get(move || {
                let doc = openapi_json.clone();
                async move { Json(doc) }
            })
            .fallback(method_not_allowed),
        )
        .merge(Redoc::with_url(DOCS_PATH, openapi))
        .merge(features::router(state))
        .fallback(route_not_found)
        .layer(middleware::catch_panic_layer());

    let router = if config.app.access_log {
        router.layer(middleware::tracing_layer())
    } else {
        router
    };

    router.layer(middleware::cors_layer(&config.cors))
}

async fn root() -> impl IntoResponse {
    Redirect::temporary(DOCS_PATH)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Pong {
    #[schema(example = "pong !")]
    pub message: String,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/trailhub/@ping",
    tag = "DEFAULT",
    responses((status = 200, description = "Service is up", body = Pong))
)]
pub async fn ping() -> Json<Pong> {
    Json(Pong {
        message: "pong !".to_string(),
    })
}
