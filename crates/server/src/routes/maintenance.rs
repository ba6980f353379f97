use axum::{extract::State, http::StatusCode, routing::{get, post}, Extension, Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use models::maintenance_issue;
use service::maintenance_service::{self, IssuePatch, NewIssue};
use service::pagination::ListParams;
use service::Caller;

use crate::auth::ServerState;
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::both;

/// Issue status is free text, so the filter is too.
#[derive(Debug, Default, Deserialize)]
pub struct IssueListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
}

pub fn router() -> Router<ServerState> {
    let r = Router::new();
    let r = both(r, "/api/maintenance", post(create).get(list));
    let r = both(r, "/api/maintenance/me", get(list_mine));
    both(r, "/api/maintenance/:id", get(get_one).put(update).delete(remove))
}

#[utoipa::path(post, path = "/api/maintenance/", tag = "maintenance", request_body = crate::openapi::NewIssueDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiJson(input): ApiJson<NewIssue>,
) -> Result<(StatusCode, Json<maintenance_issue::Model>), JsonApiError> {
    let created = maintenance_service::create_issue(&state.db, &caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/maintenance/", tag = "maintenance",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("status" = Option<String>, Query, description = "Exact status match")),
    responses((status = 200, description = "Issue records visible to the caller")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<IssueListQuery>,
) -> Result<Json<Vec<maintenance_issue::Model>>, JsonApiError> {
    let page = ListParams::new(q.skip, q.limit).normalize(&state.pagination);
    Ok(Json(maintenance_service::list_issues(&state.db, &caller, q.status, page).await?))
}

#[utoipa::path(get, path = "/api/maintenance/me", tag = "maintenance",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("status" = Option<String>, Query, description = "Exact status match")),
    responses((status = 200, description = "Caller's own issue records")))]
pub async fn list_mine(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<IssueListQuery>,
) -> Result<Json<Vec<maintenance_issue::Model>>, JsonApiError> {
    let page = ListParams::new(q.skip, q.limit).normalize(&state.pagination);
    Ok(Json(maintenance_service::list_my_issues(&state.db, &caller, q.status, page).await?))
}

#[utoipa::path(get, path = "/api/maintenance/{id}", tag = "maintenance", params(("id" = Uuid, Path, description = "Issue id")),
    responses((status = 200, description = "Issue"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<maintenance_issue::Model>, JsonApiError> {
    Ok(Json(maintenance_service::get_issue(&state.db, &caller, id).await?))
}

#[utoipa::path(put, path = "/api/maintenance/{id}", tag = "maintenance", request_body = crate::openapi::IssuePatchDoc,
    params(("id" = Uuid, Path, description = "Issue id")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<IssuePatch>,
) -> Result<Json<maintenance_issue::Model>, JsonApiError> {
    Ok(Json(maintenance_service::update_issue(&state.db, &caller, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/maintenance/{id}", tag = "maintenance", params(("id" = Uuid, Path, description = "Issue id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn remove(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    maintenance_service::delete_issue(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
