use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use models::user;
use service::auth::domain::{AuthSession, LoginInput};
use service::user_service::{self, NewUser, UserPatch};
use service::{Caller, ServiceError};

use crate::auth::{ServerState, AUTH_COOKIE};
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::both;
use service::pagination::ListParams;

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

pub fn router() -> Router<ServerState> {
    let r = Router::new();
    let r = both(r, "/api/users", post(create).get(list));
    let r = both(r, "/api/users/token", post(token));
    let r = both(r, "/api/users/me", get(me));
    both(r, "/api/users/:id", get(get_one).put(update).delete(remove))
}

#[utoipa::path(post, path = "/api/users/", tag = "users", request_body = crate::openapi::NewUserDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn create(
    State(state): State<ServerState>,
    requester: Option<Extension<Caller>>,
    ApiJson(input): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<user::Model>), JsonApiError> {
    let requester = requester.map(|Extension(c)| c);
    let created = user_service::create_user(&state.db, requester.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(post, path = "/api/users/token", tag = "users", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Token issued", body = crate::openapi::TokenResponse), (status = 401, description = "Unauthorized"), (status = 403, description = "Inactive account")))]
pub async fn token(
    State(state): State<ServerState>,
    jar: CookieJar,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<(CookieJar, Json<AuthSession>), JsonApiError> {
    let session = state.auth.login(input).await.map_err(ServiceError::from)?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.access_token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    info!(user_id = %session.user_id, "token_issued");
    Ok((jar.add(cookie), Json(session)))
}

#[utoipa::path(get, path = "/api/users/me", tag = "users", responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<ServerState>, Extension(caller): Extension<Caller>) -> Result<Json<user::Model>, JsonApiError> {
    Ok(Json(user_service::me(&state.db, &caller).await?))
}

#[utoipa::path(get, path = "/api/users/", tag = "users", responses((status = 200, description = "Users"), (status = 403, description = "Forbidden")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<UserListQuery>,
) -> Result<Json<Vec<user::Model>>, JsonApiError> {
    let page = ListParams::new(q.skip, q.limit).normalize(&state.pagination);
    Ok(Json(user_service::list_users(&state.db, &caller, page).await?))
}

#[utoipa::path(get, path = "/api/users/{id}", tag = "users", params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "User"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<user::Model>, JsonApiError> {
    Ok(Json(user_service::get_user(&state.db, &caller, id).await?))
}

#[utoipa::path(put, path = "/api/users/{id}", tag = "users", request_body = crate::openapi::UserPatchDoc,
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "Updated"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<user::Model>, JsonApiError> {
    Ok(Json(user_service::update_user(&state.db, &caller, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/users/{id}", tag = "users", params(("id" = Uuid, Path, description = "User id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn remove(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    user_service::delete_user(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
