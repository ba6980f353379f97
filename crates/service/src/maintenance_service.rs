//! Maintenance issue reports.
//!
//! Reports are not status-locked: the reporter (or an admin) may keep
//! editing them. The free-text `status` is moved by admins and managers.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait, TryIntoModel,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::maintenance_issue;
use crate::authz::{authorize, require_active, Action, Caller, ResourceRef};
use crate::errors::ServiceError;
use crate::pagination::Page;
use crate::store::{self, find_for_update};

#[derive(Debug, Clone, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub location: String,
    pub priority: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_helpers::nullable")]
    pub image_url: Option<Option<String>>,
    pub status: Option<String>,
}

impl IssuePatch {
    fn has_payload(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.location.is_some()
            || self.priority.is_some()
            || self.image_url.is_some()
    }
}

#[instrument(skip(db, input), fields(caller_id = %caller.id))]
pub async fn create_issue(db: &DatabaseConnection, caller: &Caller, input: NewIssue) -> Result<maintenance_issue::Model, ServiceError> {
    authorize(caller, Action::Create, &ResourceRef::owned_unlocked(caller.id))?;
    let now = store::now();
    let am = maintenance_issue::ActiveModel {
        id: Set(Uuid::new_v4()),
        reporter_id: Set(caller.id),
        title: Set(input.title),
        description: Set(input.description),
        location: Set(input.location),
        priority: Set(input.priority),
        status: Set(maintenance_issue::DEFAULT_STATUS.to_string()),
        image_url: Set(input.image_url),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.clone().try_into_model()?.validate()?;
    let created = am.insert(db).await?;
    info!(issue_id = %created.id, priority = %created.priority, "maintenance_issue_created");
    Ok(created)
}

pub async fn get_issue(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<maintenance_issue::Model, ServiceError> {
    let found = store::find_one::<maintenance_issue::Entity, _>(db, id, "maintenance issue").await?;
    authorize(caller, Action::Read, &ResourceRef::owned_unlocked(found.reporter_id))?;
    Ok(found)
}

pub async fn list_issues(
    db: &DatabaseConnection,
    caller: &Caller,
    status: Option<String>,
    page: Page,
) -> Result<Vec<maintenance_issue::Model>, ServiceError> {
    require_active(caller)?;
    let mut q = maintenance_issue::Entity::find();
    if let Some(s) = status {
        q = q.filter(maintenance_issue::Column::Status.eq(s));
    }
    if !caller.is_privileged() {
        q = q.filter(maintenance_issue::Column::ReporterId.eq(caller.id));
    }
    Ok(store::page(q, maintenance_issue::Column::CreatedAt, page).all(db).await?)
}

pub async fn list_my_issues(
    db: &DatabaseConnection,
    caller: &Caller,
    status: Option<String>,
    page: Page,
) -> Result<Vec<maintenance_issue::Model>, ServiceError> {
    authorize(caller, Action::ReadOwn, &ResourceRef::owned_unlocked(caller.id))?;
    let mut q = maintenance_issue::Entity::find().filter(maintenance_issue::Column::ReporterId.eq(caller.id));
    if let Some(s) = status {
        q = q.filter(maintenance_issue::Column::Status.eq(s));
    }
    Ok(store::page(q, maintenance_issue::Column::CreatedAt, page).all(db).await?)
}

#[instrument(skip(db, patch), fields(caller_id = %caller.id, issue_id = %id))]
pub async fn update_issue(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
    patch: IssuePatch,
) -> Result<maintenance_issue::Model, ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<maintenance_issue::Entity, _>(&txn, id, "maintenance issue").await?;
    let resource = ResourceRef::owned_unlocked(current.reporter_id);
    let change = patch.status.clone().filter(|s| *s != current.status);
    if patch.has_payload() || change.is_none() {
        authorize(caller, Action::Update, &resource)?;
    }
    if change.is_some() {
        authorize(caller, Action::UpdateStatus, &resource)?;
    }

    let mut am: maintenance_issue::ActiveModel = current.clone().into();
    if let Some(v) = patch.title { am.title = Set(v); }
    if let Some(v) = patch.description { am.description = Set(v); }
    if let Some(v) = patch.location { am.location = Set(v); }
    if let Some(v) = patch.priority { am.priority = Set(v); }
    if let Some(v) = patch.image_url { am.image_url = Set(v); }
    if let Some(s) = change.clone() { am.status = Set(s); }

    if !am.is_changed() {
        txn.commit().await?;
        return Ok(current);
    }
    am.clone().try_into_model()?.validate()?;
    am.updated_at = Set(store::now());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    match change {
        Some(s) => info!(issue_id = %updated.id, from = %current.status, to = %s, "status_changed"),
        None => info!(issue_id = %updated.id, "maintenance_issue_updated"),
    }
    Ok(updated)
}

pub async fn delete_issue(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<maintenance_issue::Entity, _>(&txn, id, "maintenance issue").await?;
    authorize(caller, Action::Delete, &ResourceRef::owned_unlocked(current.reporter_id))?;
    maintenance_issue::Entity::delete_by_id(current.id).exec(&txn).await?;
    txn.commit().await?;
    info!(issue_id = %id, "maintenance_issue_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::DenyReason;
    use crate::test_support::{get_db, seed_user};
    use models::UserRole;

    fn leak() -> NewIssue {
        NewIssue {
            title: "Leak".into(),
            description: "water under the sink".into(),
            location: "Kitchen 2F".into(),
            priority: "high".into(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn new_issue_is_open_and_stays_editable() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let m = seed_user(&db, UserRole::Manager).await?;
        let issue = create_issue(&db, &a, leak()).await?;
        assert_eq!(issue.status, "open");

        let moved = update_issue(&db, &m, issue.id, IssuePatch { status: Some("in_progress".into()), ..Default::default() }).await?;
        assert_eq!(moved.status, "in_progress");

        let edited = update_issue(&db, &a, issue.id, IssuePatch { priority: Some("low".into()), ..Default::default() }).await?;
        assert_eq!(edited.priority, "low");
        assert_eq!(edited.status, "in_progress");
        Ok(())
    }

    #[tokio::test]
    async fn reporter_cannot_move_status_and_others_cannot_edit() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let b = seed_user(&db, UserRole::Employee).await?;
        let issue = create_issue(&db, &a, leak()).await?;

        let res = update_issue(&db, &a, issue.id, IssuePatch { status: Some("closed".into()), ..Default::default() }).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::Role))));

        let res = update_issue(&db, &b, issue.id, IssuePatch { title: Some("Mine".into()), ..Default::default() }).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::NotOwner))));

        assert!(matches!(delete_issue(&db, &b, issue.id).await, Err(ServiceError::Forbidden(DenyReason::NotOwner))));
        delete_issue(&db, &a, issue.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_by_status_text() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let admin = seed_user(&db, UserRole::Admin).await?;
        let one = create_issue(&db, &a, leak()).await?;
        create_issue(&db, &a, leak()).await?;
        update_issue(&db, &admin, one.id, IssuePatch { status: Some("closed".into()), ..Default::default() }).await?;

        let page = Page { offset: 0, limit: 10 };
        assert_eq!(list_issues(&db, &admin, Some("open".into()), page).await?.len(), 1);
        assert_eq!(list_my_issues(&db, &a, None, page).await?.len(), 2);
        assert!(list_my_issues(&db, &admin, None, page).await?.is_empty());
        Ok(())
    }
}
