use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait, TryIntoModel,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{expense, RequestStatus};
use crate::authz::{authorize, require_active, Action, Caller, ResourceRef};
use crate::errors::ServiceError;
use crate::pagination::Page;
use crate::store::{self, find_for_update};
use crate::workflow::authorize_patch;

#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    pub amount: f64,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_helpers::nullable")]
    pub receipt_url: Option<Option<String>>,
    pub status: Option<RequestStatus>,
}

impl ExpensePatch {
    fn has_payload(&self) -> bool {
        self.amount.is_some() || self.category.is_some() || self.description.is_some() || self.receipt_url.is_some()
    }
}

/// File an expense claim for the caller; it starts out `pending`.
#[instrument(skip(db, input), fields(caller_id = %caller.id))]
pub async fn create_expense(db: &DatabaseConnection, caller: &Caller, input: NewExpense) -> Result<expense::Model, ServiceError> {
    authorize(caller, Action::Create, &ResourceRef::owned_unlocked(caller.id))?;
    let now = store::now();
    let am = expense::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(caller.id),
        amount: Set(input.amount),
        category: Set(input.category),
        description: Set(input.description),
        status: Set(RequestStatus::Pending),
        receipt_url: Set(input.receipt_url),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.clone().try_into_model()?.validate()?;
    let created = am.insert(db).await?;
    info!(expense_id = %created.id, amount = created.amount, "expense_created");
    Ok(created)
}

pub async fn get_expense(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<expense::Model, ServiceError> {
    let found = store::find_one::<expense::Entity, _>(db, id, "expense").await?;
    authorize(caller, Action::Read, &ResourceRef::owned(found.user_id, found.status))?;
    Ok(found)
}

/// Everything for admins and managers, own claims for everyone else.
pub async fn list_expenses(
    db: &DatabaseConnection,
    caller: &Caller,
    status: Option<RequestStatus>,
    page: Page,
) -> Result<Vec<expense::Model>, ServiceError> {
    require_active(caller)?;
    let mut q = store::with_status(expense::Entity::find(), expense::Column::Status, status);
    if !caller.is_privileged() {
        q = q.filter(expense::Column::UserId.eq(caller.id));
    }
    Ok(store::page(q, expense::Column::CreatedAt, page).all(db).await?)
}

pub async fn list_my_expenses(
    db: &DatabaseConnection,
    caller: &Caller,
    status: Option<RequestStatus>,
    page: Page,
) -> Result<Vec<expense::Model>, ServiceError> {
    authorize(caller, Action::ReadOwn, &ResourceRef::owned_unlocked(caller.id))?;
    let q = store::with_status(expense::Entity::find(), expense::Column::Status, status)
        .filter(expense::Column::UserId.eq(caller.id));
    Ok(store::page(q, expense::Column::CreatedAt, page).all(db).await?)
}

#[instrument(skip(db, patch), fields(caller_id = %caller.id, expense_id = %id))]
pub async fn update_expense(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
    patch: ExpensePatch,
) -> Result<expense::Model, ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<expense::Entity, _>(&txn, id, "expense").await?;
    let change = authorize_patch(caller, current.user_id, current.status, patch.has_payload(), patch.status)?;

    let mut am: expense::ActiveModel = current.clone().into();
    if let Some(v) = patch.amount { am.amount = Set(v); }
    if let Some(v) = patch.category { am.category = Set(v); }
    if let Some(v) = patch.description { am.description = Set(v); }
    if let Some(v) = patch.receipt_url { am.receipt_url = Set(v); }
    if let Some(s) = change { am.status = Set(s); }

    if !am.is_changed() {
        txn.commit().await?;
        return Ok(current);
    }
    am.clone().try_into_model()?.validate()?;
    am.updated_at = Set(store::now());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    match change {
        Some(s) => info!(expense_id = %updated.id, from = %current.status, to = %s, "status_changed"),
        None => info!(expense_id = %updated.id, "expense_updated"),
    }
    Ok(updated)
}

pub async fn delete_expense(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<expense::Entity, _>(&txn, id, "expense").await?;
    authorize(caller, Action::Delete, &ResourceRef::owned(current.user_id, current.status))?;
    expense::Entity::delete_by_id(current.id).exec(&txn).await?;
    txn.commit().await?;
    info!(expense_id = %id, "expense_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::DenyReason;
    use crate::test_support::{get_db, seed_user};
    use models::UserRole;

    fn taxi() -> NewExpense {
        NewExpense { amount: 50.0, category: "travel".into(), description: "taxi".into(), receipt_url: None }
    }

    fn page() -> Page {
        Page { offset: 0, limit: 100 }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let created = create_expense(&db, &a, taxi()).await?;
        assert_eq!(created.status, RequestStatus::Pending);
        assert_eq!(created.user_id, a.id);

        let found = get_expense(&db, &a, created.id).await?;
        assert_eq!(found, created);
        assert_eq!(found.amount, 50.0);
        assert_eq!(found.category, "travel");
        Ok(())
    }

    #[tokio::test]
    async fn negative_amount_is_rejected() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let res = create_expense(&db, &a, NewExpense { amount: -1.0, ..taxi() }).await;
        assert!(res.unwrap_err().is_validation());
        Ok(())
    }

    #[tokio::test]
    async fn approval_locks_owner_edits() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let b = seed_user(&db, UserRole::Employee).await?;
        let admin = seed_user(&db, UserRole::Admin).await?;
        let e = create_expense(&db, &a, taxi()).await?;

        let res = get_expense(&db, &b, e.id).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::NotOwner))));

        let approve = ExpensePatch { status: Some(RequestStatus::Approved), ..Default::default() };
        let approved = update_expense(&db, &admin, e.id, approve).await?;
        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.description, "taxi");

        let edit = ExpensePatch { description: Some("x".into()), ..Default::default() };
        let res = update_expense(&db, &a, e.id, edit).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::StatusLocked))));
        Ok(())
    }

    #[tokio::test]
    async fn partial_patch_keeps_absent_fields() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let e = create_expense(&db, &a, taxi()).await?;

        let same = update_expense(&db, &a, e.id, ExpensePatch::default()).await?;
        assert_eq!(same, e);

        let patched = update_expense(&db, &a, e.id, ExpensePatch { amount: Some(75.5), ..Default::default() }).await?;
        assert_eq!(patched.amount, 75.5);
        assert_eq!(patched.category, "travel");
        assert_eq!(patched.description, "taxi");
        Ok(())
    }

    #[tokio::test]
    async fn null_receipt_clears_it_and_absent_keeps_it() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let e = create_expense(&db, &a, NewExpense { receipt_url: Some("https://r/1.pdf".into()), ..taxi() }).await?;

        let keep: ExpensePatch = serde_json::from_str(r#"{"amount": 60.0}"#)?;
        let kept = update_expense(&db, &a, e.id, keep).await?;
        assert_eq!(kept.receipt_url.as_deref(), Some("https://r/1.pdf"));

        let clear: ExpensePatch = serde_json::from_str(r#"{"receipt_url": null}"#)?;
        let cleared = update_expense(&db, &a, e.id, clear).await?;
        assert_eq!(cleared.receipt_url, None);
        assert_eq!(cleared.amount, 60.0);
        Ok(())
    }

    #[tokio::test]
    async fn owner_cancels_but_cannot_approve() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let e = create_expense(&db, &a, taxi()).await?;

        let approve = ExpensePatch { status: Some(RequestStatus::Approved), ..Default::default() };
        let res = update_expense(&db, &a, e.id, approve).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::Role))));

        let cancel = ExpensePatch { status: Some(RequestStatus::Cancelled), ..Default::default() };
        let cancelled = update_expense(&db, &a, e.id, cancel).await?;
        assert_eq!(cancelled.status, RequestStatus::Cancelled);

        let admin = seed_user(&db, UserRole::Admin).await?;
        let reject = ExpensePatch { status: Some(RequestStatus::Rejected), ..Default::default() };
        assert!(matches!(update_expense(&db, &admin, e.id, reject).await, Err(ServiceError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_scoped_by_role() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let b = seed_user(&db, UserRole::Employee).await?;
        let m = seed_user(&db, UserRole::Manager).await?;
        create_expense(&db, &a, taxi()).await?;
        let eb = create_expense(&db, &b, taxi()).await?;
        update_expense(&db, &m, eb.id, ExpensePatch { status: Some(RequestStatus::Approved), ..Default::default() }).await?;

        assert_eq!(list_expenses(&db, &a, None, page()).await?.len(), 1);
        assert_eq!(list_expenses(&db, &m, None, page()).await?.len(), 2);
        assert_eq!(list_expenses(&db, &m, Some(RequestStatus::Approved), page()).await?.len(), 1);
        assert!(list_my_expenses(&db, &m, None, page()).await?.is_empty());
        assert_eq!(list_expenses(&db, &m, None, Page { offset: 1, limit: 100 }).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn inactive_owner_is_locked_out() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let e = create_expense(&db, &a, taxi()).await?;
        let off = Caller { active: false, ..a };
        assert!(matches!(get_expense(&db, &off, e.id).await, Err(ServiceError::Forbidden(DenyReason::Inactive))));
        assert!(matches!(delete_expense(&db, &off, e.id).await, Err(ServiceError::Forbidden(DenyReason::Inactive))));
        assert!(matches!(list_my_expenses(&db, &off, None, page()).await, Err(ServiceError::Forbidden(DenyReason::Inactive))));
        Ok(())
    }

    #[tokio::test]
    async fn owner_deletes_missing_is_not_found() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let e = create_expense(&db, &a, taxi()).await?;
        delete_expense(&db, &a, e.id).await?;
        assert!(matches!(get_expense(&db, &a, e.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(delete_expense(&db, &a, e.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
