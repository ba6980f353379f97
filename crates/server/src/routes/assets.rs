use axum::{extract::State, http::StatusCode, routing::{get, post}, Extension, Json, Router};
use models::{asset, asset_booking, RequestStatus};
use serde::Deserialize;
use uuid::Uuid;

use service::asset_service::{self, AssetBookingPatch, AssetPatch, BookingFilter, NewAsset, NewAssetBooking};
use service::pagination::ListParams;
use service::Caller;

use crate::auth::ServerState;
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::both;

#[derive(Debug, Default, Deserialize)]
pub struct AssetListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub available: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<RequestStatus>,
    pub asset_id: Option<Uuid>,
}

impl BookingListQuery {
    fn filter(&self) -> BookingFilter {
        BookingFilter { status: self.status, asset_id: self.asset_id }
    }
}

pub fn router() -> Router<ServerState> {
    let r = Router::new();
    let r = both(r, "/api/assets", post(create_asset).get(list_assets));
    let r = both(r, "/api/assets/:id", get(get_asset).put(update_asset).delete(remove_asset));
    let r = both(r, "/api/asset-bookings", post(create_booking).get(list_bookings));
    let r = both(r, "/api/asset-bookings/me", get(list_my_bookings));
    both(r, "/api/asset-bookings/:id", get(get_booking).put(update_booking).delete(remove_booking))
}

#[utoipa::path(post, path = "/api/assets/", tag = "assets", request_body = crate::openapi::NewAssetDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")))]
pub async fn create_asset(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiJson(input): ApiJson<NewAsset>,
) -> Result<(StatusCode, Json<asset::Model>), JsonApiError> {
    let created = asset_service::create_asset(&state.db, &caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/assets/", tag = "assets",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("available" = Option<bool>, Query, description = "Availability filter")),
    responses((status = 200, description = "Assets")))]
pub async fn list_assets(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<AssetListQuery>,
) -> Result<Json<Vec<asset::Model>>, JsonApiError> {
    let page = ListParams::new(q.skip, q.limit).normalize(&state.pagination);
    Ok(Json(asset_service::list_assets(&state.db, &caller, q.available, page).await?))
}

#[utoipa::path(get, path = "/api/assets/{id}", tag = "assets", params(("id" = Uuid, Path, description = "Asset id")),
    responses((status = 200, description = "Asset"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn get_asset(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<asset::Model>, JsonApiError> {
    Ok(Json(asset_service::get_asset(&state.db, &caller, id).await?))
}

#[utoipa::path(put, path = "/api/assets/{id}", tag = "assets", request_body = crate::openapi::AssetPatchDoc,
    params(("id" = Uuid, Path, description = "Asset id")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn update_asset(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<AssetPatch>,
) -> Result<Json<asset::Model>, JsonApiError> {
    Ok(Json(asset_service::update_asset(&state.db, &caller, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/assets/{id}", tag = "assets", params(("id" = Uuid, Path, description = "Asset id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn remove_asset(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    asset_service::delete_asset(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/api/asset-bookings/", tag = "assets", request_body = crate::openapi::NewAssetBookingDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")))]
pub async fn create_booking(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiJson(input): ApiJson<NewAssetBooking>,
) -> Result<(StatusCode, Json<asset_booking::Model>), JsonApiError> {
    let created = asset_service::create_booking(&state.db, &caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/asset-bookings/", tag = "assets",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("status" = Option<String>, Query, description = "Status filter"), ("asset_id" = Option<Uuid>, Query, description = "Asset filter")),
    responses((status = 200, description = "Booking records visible to the caller")))]
pub async fn list_bookings(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<BookingListQuery>,
) -> Result<Json<Vec<asset_booking::Model>>, JsonApiError> {
    let page = ListParams::new(q.skip, q.limit).normalize(&state.pagination);
    Ok(Json(asset_service::list_bookings(&state.db, &caller, q.filter(), page).await?))
}

#[utoipa::path(get, path = "/api/asset-bookings/me", tag = "assets",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("status" = Option<String>, Query, description = "Status filter"), ("asset_id" = Option<Uuid>, Query, description = "Asset filter")),
    responses((status = 200, description = "Caller's own booking records")))]
pub async fn list_my_bookings(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<BookingListQuery>,
) -> Result<Json<Vec<asset_booking::Model>>, JsonApiError> {
    let page = ListParams::new(q.skip, q.limit).normalize(&state.pagination);
    Ok(Json(asset_service::list_my_bookings(&state.db, &caller, q.filter(), page).await?))
}

#[utoipa::path(get, path = "/api/asset-bookings/{id}", tag = "assets", params(("id" = Uuid, Path, description = "Booking id")),
    responses((status = 200, description = "Booking"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn get_booking(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<asset_booking::Model>, JsonApiError> {
    Ok(Json(asset_service::get_booking(&state.db, &caller, id).await?))
}

#[utoipa::path(put, path = "/api/asset-bookings/{id}", tag = "assets", request_body = crate::openapi::AssetBookingPatchDoc,
    params(("id" = Uuid, Path, description = "Booking id")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"), (status = 409, description = "Conflict")))]
pub async fn update_booking(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<AssetBookingPatch>,
) -> Result<Json<asset_booking::Model>, JsonApiError> {
    Ok(Json(asset_service::update_booking(&state.db, &caller, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/asset-bookings/{id}", tag = "assets", params(("id" = Uuid, Path, description = "Booking id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn remove_booking(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    asset_service::delete_booking(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
