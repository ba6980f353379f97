use axum::{extract::State, http::StatusCode, routing::{get, post}, Extension, Json, Router};
use uuid::Uuid;

use models::expense;
use service::expense_service::{self, ExpensePatch, NewExpense};
use service::Caller;

use crate::auth::ServerState;
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::{both, ListQuery};

pub fn router() -> Router<ServerState> {
    let r = Router::new();
    let r = both(r, "/api/expenses", post(create).get(list));
    let r = both(r, "/api/expenses/me", get(list_mine));
    both(r, "/api/expenses/:id", get(get_one).put(update).delete(remove))
}

#[utoipa::path(post, path = "/api/expenses/", tag = "expenses", request_body = crate::openapi::NewExpenseDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 401, description = "Unauthenticated")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiJson(input): ApiJson<NewExpense>,
) -> Result<(StatusCode, Json<expense::Model>), JsonApiError> {
    let created = expense_service::create_expense(&state.db, &caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/expenses/", tag = "expenses",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("status" = Option<String>, Query, description = "Status filter")),
    responses((status = 200, description = "Expenses visible to the caller")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<Vec<expense::Model>>, JsonApiError> {
    let page = q.page(&state.pagination);
    Ok(Json(expense_service::list_expenses(&state.db, &caller, q.status, page).await?))
}

#[utoipa::path(get, path = "/api/expenses/me", tag = "expenses",
    params(("skip" = Option<u64>, Query, description = "Offset, default 0"), ("limit" = Option<u64>, Query, description = "Page size, default 100"), ("status" = Option<String>, Query, description = "Status filter")),
    responses((status = 200, description = "Caller's own expenses")))]
pub async fn list_mine(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<Vec<expense::Model>>, JsonApiError> {
    let page = q.page(&state.pagination);
    Ok(Json(expense_service::list_my_expenses(&state.db, &caller, q.status, page).await?))
}

#[utoipa::path(get, path = "/api/expenses/{id}", tag = "expenses", params(("id" = Uuid, Path, description = "Expense id")),
    responses((status = 200, description = "Expense"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<expense::Model>, JsonApiError> {
    Ok(Json(expense_service::get_expense(&state.db, &caller, id).await?))
}

#[utoipa::path(put, path = "/api/expenses/{id}", tag = "expenses", request_body = crate::openapi::ExpensePatchDoc,
    params(("id" = Uuid, Path, description = "Expense id")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"), (status = 409, description = "Invalid transition")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ExpensePatch>,
) -> Result<Json<expense::Model>, JsonApiError> {
    Ok(Json(expense_service::update_expense(&state.db, &caller, id, patch).await?))
}

#[utoipa::path(delete, path = "/api/expenses/{id}", tag = "expenses", params(("id" = Uuid, Path, description = "Expense id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn remove(
    State(state): State<ServerState>,
    Extension(caller): Extension<Caller>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    expense_service::delete_expense(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
