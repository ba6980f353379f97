use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait, TryIntoModel,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{sick_leave, RequestStatus};
use crate::authz::{authorize, require_active, Action, Caller, ResourceRef};
use crate::errors::ServiceError;
use crate::pagination::Page;
use crate::store::{self, find_for_update, utc};
use crate::workflow::authorize_patch;

#[derive(Debug, Clone, Deserialize)]
pub struct NewSickLeave {
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub reason: String,
    #[serde(default)]
    pub document_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SickLeavePatch {
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_helpers::nullable")]
    pub document_url: Option<Option<String>>,
    pub status: Option<RequestStatus>,
}

impl SickLeavePatch {
    fn has_payload(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some() || self.reason.is_some() || self.document_url.is_some()
    }
}

#[instrument(skip(db, input), fields(caller_id = %caller.id))]
pub async fn create_sick_leave(
    db: &DatabaseConnection,
    caller: &Caller,
    input: NewSickLeave,
) -> Result<sick_leave::Model, ServiceError> {
    authorize(caller, Action::Create, &ResourceRef::owned_unlocked(caller.id))?;
    let now = store::now();
    let am = sick_leave::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(caller.id),
        start_date: Set(utc(input.start_date)),
        end_date: Set(utc(input.end_date)),
        reason: Set(input.reason),
        status: Set(RequestStatus::Pending),
        document_url: Set(input.document_url),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.clone().try_into_model()?.validate()?;
    let created = am.insert(db).await?;
    info!(sick_leave_id = %created.id, "sick_leave_created");
    Ok(created)
}

pub async fn get_sick_leave(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<sick_leave::Model, ServiceError> {
    let found = store::find_one::<sick_leave::Entity, _>(db, id, "sick leave").await?;
    authorize(caller, Action::Read, &ResourceRef::owned(found.user_id, found.status))?;
    Ok(found)
}

pub async fn list_sick_leaves(
    db: &DatabaseConnection,
    caller: &Caller,
    status: Option<RequestStatus>,
    page: Page,
) -> Result<Vec<sick_leave::Model>, ServiceError> {
    require_active(caller)?;
    let mut q = store::with_status(sick_leave::Entity::find(), sick_leave::Column::Status, status);
    if !caller.is_privileged() {
        q = q.filter(sick_leave::Column::UserId.eq(caller.id));
    }
    Ok(store::page(q, sick_leave::Column::CreatedAt, page).all(db).await?)
}

pub async fn list_my_sick_leaves(
    db: &DatabaseConnection,
    caller: &Caller,
    status: Option<RequestStatus>,
    page: Page,
) -> Result<Vec<sick_leave::Model>, ServiceError> {
    authorize(caller, Action::ReadOwn, &ResourceRef::owned_unlocked(caller.id))?;
    let q = store::with_status(sick_leave::Entity::find(), sick_leave::Column::Status, status)
        .filter(sick_leave::Column::UserId.eq(caller.id));
    Ok(store::page(q, sick_leave::Column::CreatedAt, page).all(db).await?)
}

#[instrument(skip(db, patch), fields(caller_id = %caller.id, sick_leave_id = %id))]
pub async fn update_sick_leave(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
    patch: SickLeavePatch,
) -> Result<sick_leave::Model, ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<sick_leave::Entity, _>(&txn, id, "sick leave").await?;
    let change = authorize_patch(caller, current.user_id, current.status, patch.has_payload(), patch.status)?;

    let mut am: sick_leave::ActiveModel = current.clone().into();
    if let Some(v) = patch.start_date { am.start_date = Set(utc(v)); }
    if let Some(v) = patch.end_date { am.end_date = Set(utc(v)); }
    if let Some(v) = patch.reason { am.reason = Set(v); }
    if let Some(v) = patch.document_url { am.document_url = Set(v); }
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
        Some(s) => info!(sick_leave_id = %updated.id, from = %current.status, to = %s, "status_changed"),
        None => info!(sick_leave_id = %updated.id, "sick_leave_updated"),
    }
    Ok(updated)
}

pub async fn delete_sick_leave(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<sick_leave::Entity, _>(&txn, id, "sick leave").await?;
    authorize(caller, Action::Delete, &ResourceRef::owned(current.user_id, current.status))?;
    sick_leave::Entity::delete_by_id(current.id).exec(&txn).await?;
    txn.commit().await?;
    info!(sick_leave_id = %id, "sick_leave_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::DenyReason;
    use crate::test_support::{at, get_db, seed_user};
    use models::UserRole;

    fn flu() -> NewSickLeave {
        NewSickLeave { start_date: at(3, 0), end_date: at(5, 0), reason: "flu".into(), document_url: None }
    }

    #[tokio::test]
    async fn reversed_dates_are_rejected() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let res = create_sick_leave(&db, &a, NewSickLeave { start_date: at(6, 0), ..flu() }).await;
        assert!(res.unwrap_err().is_validation());

        let same_day = NewSickLeave { start_date: at(3, 0), end_date: at(3, 0), ..flu() };
        assert!(create_sick_leave(&db, &a, same_day).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn patch_revalidates_merged_dates() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let s = create_sick_leave(&db, &a, flu()).await?;
        let res = update_sick_leave(&db, &a, s.id, SickLeavePatch { end_date: Some(at(1, 0)), ..Default::default() }).await;
        assert!(res.unwrap_err().is_validation());

        let ok = update_sick_leave(&db, &a, s.id, SickLeavePatch { end_date: Some(at(7, 0)), ..Default::default() }).await?;
        assert_eq!(ok.end_date, at(7, 0));
        assert_eq!(ok.reason, "flu");
        Ok(())
    }

    #[tokio::test]
    async fn manager_rejects_and_owner_is_locked() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let m = seed_user(&db, UserRole::Manager).await?;
        let s = create_sick_leave(&db, &a, flu()).await?;

        let rejected = update_sick_leave(&db, &m, s.id, SickLeavePatch { status: Some(RequestStatus::Rejected), ..Default::default() }).await?;
        assert_eq!(rejected.status, RequestStatus::Rejected);

        let res = update_sick_leave(&db, &a, s.id, SickLeavePatch { reason: Some("cold".into()), ..Default::default() }).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::StatusLocked))));
        assert_eq!(list_my_sick_leaves(&db, &a, Some(RequestStatus::Rejected), Page { offset: 0, limit: 10 }).await?.len(), 1);
        Ok(())
    }
}
