use axum::{
    middleware,
    routing::{get, MethodRouter},
    Json, Router,
};
use configs::PaginationConfig;
use models::RequestStatus;
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use service::pagination::{ListParams, Page};

use crate::auth::{self, ServerState};

pub mod assets;
pub mod education;
pub mod expenses;
pub mod maintenance;
pub mod sick_leave;
pub mod travel;
pub mod users;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::healthy())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(crate::openapi::ApiDoc::openapi())
}

/// `skip`/`limit`/`status` query shared by the request-like list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<RequestStatus>,
}

impl ListQuery {
    pub fn page(&self, cfg: &PaginationConfig) -> Page {
        ListParams::new(self.skip, self.limit).normalize(cfg)
    }
}

/// Register `path` both with and without the trailing slash.
pub(crate) fn both(router: Router<ServerState>, path: &str, handler: MethodRouter<ServerState>) -> Router<ServerState> {
    router.route(path, handler.clone()).route(&format!("{path}/"), handler)
}

/// Build the full application router: public, authenticated and docs routes.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(users::router())
        .merge(expenses::router())
        .merge(sick_leave::router())
        .merge(education::router())
        .merge(assets::router())
        .merge(maintenance::router())
        .merge(travel::router())
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
