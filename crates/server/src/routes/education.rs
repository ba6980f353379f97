use axum::{extract::State, http::StatusCode, routing::{get, post}, Extension, Json, Router};
use models::{activity_registration, education_activity, RequestStatus};
use serde::Deserialize;
use uuid::Uuid;

use service::education_service::{self, ActivityPatch, NewActivity, NewRegistration, RegistrationFilter, RegistrationPatch};
use service::pagination::ListParams;
use service::Caller;

use crate::auth::ServerState;
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::both;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<RequestStatus>,
    pub activity_id: Option<Uuid>,
}

impl RegistrationListQuery {
    fn filter(&self) -> RegistrationFilter {
        RegistrationFilter { status: self.status, activity_id: self.activity_id }
    }
}

pub fn router() -> Router<ServerState> {
    let r = Router::new();
    let r = both(r, "/api/education/activities", post(create_activity).get(list_activities));
    let r = both(
        r,
        "/api/education/activities/:id",
        get(get_activity).put(update_activity).delete(remove_activity),
    );
    let r = both(r, "/api/education/registrations", post(create_registration).get(list_registrations));
    let r = both(r, "/api/education/registrations/me", get(list_my_registrations));
    both(
        r,
        "/api/education/registrations/:id",
        get(get_registration).put(update_registration).delete(remove_registration),
    )
}

#[utoipa::path(post, path = "/api/education/activities/", tag = "education", request_body = crate::openapi::NewActivityDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")))]
pub async fn create_activity(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiJson(input): ApiJson<NewActivity>,
) -> Result<(StatusCode, Json<education_activity::Model>), JsonApiError> {
    let created = education_service::create_activity(&state.db, &caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/education/activities/", tag = "education",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100")),
    responses((status = 200, description = "Activities")))]
pub async fn list_activities(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<ActivityListQuery>,
) -> Result<Json<Vec<education_activity::Model>>, JsonApiError> {
    let page = ListParams::new(q.skip, q.limit).normalize(&state.pagination);
    Ok(Json(education_service::list_activities(&state.db, &caller, page).await?))
}

#[utoipa::path(get, path = "/api/education/activities/{id}", tag = "education", params(("id" = Uuid, Path, description = "Activity id")),
    responses((status = 200, description = "Activity"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn get_activity(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<education_activity::Model>, JsonApiError> {
    Ok(Json(education_service::get_activity(&state.db, &caller, id).await?))
}

#[utoipa::path(put, path = "/api/education/activities/{id}", tag = "education", request_body = crate::openapi::ActivityPatchDoc,
    params(("id" = Uuid, Path, description = "Activity id")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn update_activity(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ActivityPatch>,
) -> Result<Json<education_activity::Model>, JsonApiError> {
    Ok(Json(education_service::update_activity(&state.db, &caller, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/education/activities/{id}", tag = "education", params(("id" = Uuid, Path, description = "Activity id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn remove_activity(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    education_service::delete_activity(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/api/education/registrations/", tag = "education", request_body = crate::openapi::NewRegistrationDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")))]
pub async fn create_registration(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiJson(input): ApiJson<NewRegistration>,
) -> Result<(StatusCode, Json<activity_registration::Model>), JsonApiError> {
    let created = education_service::create_registration(&state.db, &caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/education/registrations/", tag = "education",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("status" = Option<String>, Query, description = "Status filter"), ("activity_id" = Option<Uuid>, Query, description = "Activity filter")),
    responses((status = 200, description = "Registration records visible to the caller")))]
pub async fn list_registrations(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<RegistrationListQuery>,
) -> Result<Json<Vec<activity_registration::Model>>, JsonApiError> {
    let page = ListParams::new(q.skip, q.limit).normalize(&state.pagination);
    Ok(Json(education_service::list_registrations(&state.db, &caller, q.filter(), page).await?))
}

#[utoipa::path(get, path = "/api/education/registrations/me", tag = "education",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("status" = Option<String>, Query, description = "Status filter"), ("activity_id" = Option<Uuid>, Query, description = "Activity filter")),
    responses((status = 200, description = "Caller's own registration records")))]
pub async fn list_my_registrations(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<RegistrationListQuery>,
) -> Result<Json<Vec<activity_registration::Model>>, JsonApiError> {
    let page = ListParams::new(q.skip, q.limit).normalize(&state.pagination);
    Ok(Json(education_service::list_my_registrations(&state.db, &caller, q.filter(), page).await?))
}

#[utoipa::path(get, path = "/api/education/registrations/{id}", tag = "education", params(("id" = Uuid, Path, description = "Registration id")),
    responses((status = 200, description = "Registration"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn get_registration(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<activity_registration::Model>, JsonApiError> {
    Ok(Json(education_service::get_registration(&state.db, &caller, id).await?))
}

#[utoipa::path(put, path = "/api/education/registrations/{id}", tag = "education", request_body = crate::openapi::RegistrationPatchDoc,
    params(("id" = Uuid, Path, description = "Registration id")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn update_registration(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<RegistrationPatch>,
) -> Result<Json<activity_registration::Model>, JsonApiError> {
    Ok(Json(education_service::update_registration(&state.db, &caller, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/education/registrations/{id}", tag = "education", params(("id" = Uuid, Path, description = "Registration id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn remove_registration(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    education_service::delete_registration(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
