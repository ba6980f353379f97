use axum::{extract::State, http::StatusCode, routing::{get, post}, Extension, Json, Router};
use uuid::Uuid;

use models::sick_leave;
use service::sick_leave_service::{self, NewSickLeave, SickLeavePatch};
use service::Caller;

use crate::auth::ServerState;
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::{both, ListQuery};

pub fn router() -> Router<ServerState> {
    let r = Router::new();
    let r = both(r, "/api/sick-leave", post(create).get(list));
    let r = both(r, "/api/sick-leave/me", get(list_mine));
    both(r, "/api/sick-leave/:id", get(get_one).put(update).delete(remove))
}

#[utoipa::path(post, path = "/api/sick-leave/", tag = "sick-leave", request_body = crate::openapi::NewSickLeaveDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiJson(input): ApiJson<NewSickLeave>,
) -> Result<(StatusCode, Json<sick_leave::Model>), JsonApiError> {
    let created = sick_leave_service::create_sick_leave(&state.db, &caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/sick-leave/", tag = "sick-leave",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("status" = Option<String>, Query, description = "Status filter")),
    responses((status = 200, description = "Sick leave records visible to the caller")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<Vec<sick_leave::Model>>, JsonApiError> {
    let page = q.page(&state.pagination);
    Ok(Json(sick_leave_service::list_sick_leaves(&state.db, &caller, q.status, page).await?))
}

#[utoipa::path(get, path = "/api/sick-leave/me", tag = "sick-leave",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("status" = Option<String>, Query, description = "Status filter")),
    responses((status = 200, description = "Caller's own sick leave records")))]
pub async fn list_mine(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<Vec<sick_leave::Model>>, JsonApiError> {
    let page = q.page(&state.pagination);
    Ok(Json(sick_leave_service::list_my_sick_leaves(&state.db, &caller, q.status, page).await?))
}

#[utoipa::path(get, path = "/api/sick-leave/{id}", tag = "sick-leave", params(("id" = Uuid, Path, description = "Sick leave id")),
    responses((status = 200, description = "Sick leave"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<sick_leave::Model>, JsonApiError> {
    Ok(Json(sick_leave_service::get_sick_leave(&state.db, &caller, id).await?))
}

#[utoipa::path(put, path = "/api/sick-leave/{id}", tag = "sick-leave", request_body = crate::openapi::SickLeavePatchDoc,
    params(("id" = Uuid, Path, description = "Sick leave id")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<SickLeavePatch>,
) -> Result<Json<sick_leave::Model>, JsonApiError> {
    Ok(Json(sick_leave_service::update_sick_leave(&state.db, &caller, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/sick-leave/{id}", tag = "sick-leave", params(("id" = Uuid, Path, description = "Sick leave id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn remove(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    sick_leave_service::delete_sick_leave(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
