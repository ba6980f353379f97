use axum::{extract::State, http::StatusCode, routing::{get, post}, Extension, Json, Router};
use models::{travel_booking, travel_request};
use uuid::Uuid;

use service::travel_service::{self, NewTravelBooking, NewTravelRequest, TravelBookingPatch, TravelRequestPatch};
use service::Caller;

use crate::auth::ServerState;
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::{both, ListQuery};

pub fn router() -> Router<ServerState> {
    let r = Router::new();
    let r = both(r, "/api/travel/requests", post(create_request).get(list_requests));
    let r = both(r, "/api/travel/requests/me", get(list_my_requests));
    let r = both(r, "/api/travel/requests/:id", get(get_request).put(update_request).delete(remove_request));
    let r = both(r, "/api/travel/requests/:id/bookings", get(list_bookings_for_request));
    let r = both(r, "/api/travel/bookings", post(create_booking));
    both(r, "/api/travel/bookings/:id", get(get_booking).put(update_booking).delete(remove_booking))
}

#[utoipa::path(post, path = "/api/travel/requests/", tag = "travel", request_body = crate::openapi::NewTravelRequestDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")))]
pub async fn create_request(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiJson(input): ApiJson<NewTravelRequest>,
) -> Result<(StatusCode, Json<travel_request::Model>), JsonApiError> {
    let created = travel_service::create_request(&state.db, &caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/travel/requests/", tag = "travel",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("status" = Option<String>, Query, description = "Status filter")),
    responses((status = 200, description = "Travel request records visible to the caller")))]
pub async fn list_requests(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<Vec<travel_request::Model>>, JsonApiError> {
    let page = q.page(&state.pagination);
    Ok(Json(travel_service::list_requests(&state.db, &caller, q.status, page).await?))
}

#[utoipa::path(get, path = "/api/travel/requests/me", tag = "travel",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("status" = Option<String>, Query, description = "Status filter")),
    responses((status = 200, description = "Caller's own travel request records")))]
pub async fn list_my_requests(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<Vec<travel_request::Model>>, JsonApiError> {
    let page = q.page(&state.pagination);
    Ok(Json(travel_service::list_my_requests(&state.db, &caller, q.status, page).await?))
}

#[utoipa::path(get, path = "/api/travel/requests/{id}", tag = "travel", params(("id" = Uuid, Path, description = "Travel request id")),
    responses((status = 200, description = "Travel request"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn get_request(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<travel_request::Model>, JsonApiError> {
    Ok(Json(travel_service::get_request(&state.db, &caller, id).await?))
}

#[utoipa::path(put, path = "/api/travel/requests/{id}", tag = "travel", request_body = crate::openapi::TravelRequestPatchDoc,
    params(("id" = Uuid, Path, description = "Travel request id")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn update_request(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<TravelRequestPatch>,
) -> Result<Json<travel_request::Model>, JsonApiError> {
    Ok(Json(travel_service::update_request(&state.db, &caller, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/travel/requests/{id}", tag = "travel", params(("id" = Uuid, Path, description = "Travel request id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn remove_request(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    travel_service::delete_request(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/travel/requests/{id}/bookings", tag = "travel", params(("id" = Uuid, Path, description = "Travel request id")),
    responses((status = 200, description = "Bookings of the request"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn list_bookings_for_request(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<travel_booking::Model>>, JsonApiError> {
    Ok(Json(travel_service::list_bookings_for_request(&state.db, &caller, id).await?))
}

#[utoipa::path(post, path = "/api/travel/bookings/", tag = "travel", request_body = crate::openapi::NewTravelBookingDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn create_booking(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiJson(input): ApiJson<NewTravelBooking>,
) -> Result<(StatusCode, Json<travel_booking::Model>), JsonApiError> {
    let created = travel_service::create_booking(&state.db, &caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/travel/bookings/{id}", tag = "travel", params(("id" = Uuid, Path, description = "Travel booking id")),
    responses((status = 200, description = "Travel booking"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn get_booking(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<travel_booking::Model>, JsonApiError> {
    Ok(Json(travel_service::get_booking(&state.db, &caller, id).await?))
}

#[utoipa::path(put, path = "/api/travel/bookings/{id}", tag = "travel", request_body = crate::openapi::TravelBookingPatchDoc,
    params(("id" = Uuid, Path, description = "Travel booking id")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn update_booking(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<TravelBookingPatch>,
) -> Result<Json<travel_booking::Model>, JsonApiError> {
    Ok(Json(travel_service::update_booking(&state.db, &caller, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/travel/bookings/{id}", tag = "travel", params(("id" = Uuid, Path, description = "Travel booking id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn remove_booking(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    travel_service::delete_booking(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
