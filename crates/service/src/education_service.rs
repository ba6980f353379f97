//! Education activities (catalog) and user registrations.
//!
//! Registration creates lock the activity row first, so the capacity check
//! and the insert happen without a concurrent registration in between.

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait, TryIntoModel,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::{activity_registration, education_activity, user, RequestStatus};
use crate::authz::{authorize, require_active, Action, Caller, ResourceRef};
use crate::errors::ServiceError;
use crate::pagination::Page;
use crate::store::{self, find_for_update, utc};
use crate::workflow::authorize_patch;

#[derive(Debug, Clone, Deserialize)]
pub struct NewActivity {
    pub title: String,
    pub description: String,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub location: String,
    #[serde(default)]
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_helpers::nullable")]
    pub capacity: Option<Option<i32>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRegistration {
    pub activity_id: Uuid,
    /// Defaults to the caller.
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationPatch {
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RegistrationFilter {
    pub status: Option<RequestStatus>,
    pub activity_id: Option<Uuid>,
}

/// Registrations currently holding a seat.
async fn active_registrations<C: ConnectionTrait>(conn: &C, activity_id: Uuid) -> Result<u64, ServiceError> {
    let n = activity_registration::Entity::find()
        .filter(activity_registration::Column::ActivityId.eq(activity_id))
        .filter(activity_registration::Column::Status.is_in(RequestStatus::ACTIVE))
        .count(conn)
        .await?;
    Ok(n)
}

// ---- activities ----

#[instrument(skip(db, input), fields(caller_id = %caller.id))]
pub async fn create_activity(
    db: &DatabaseConnection,
    caller: &Caller,
    input: NewActivity,
) -> Result<education_activity::Model, ServiceError> {
    authorize(caller, Action::Create, &ResourceRef::catalog())?;
    let now = store::now();
    let am = education_activity::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        description: Set(input.description),
        start_date: Set(utc(input.start_date)),
        end_date: Set(utc(input.end_date)),
        location: Set(input.location),
        capacity: Set(input.capacity),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.clone().try_into_model()?.validate()?;
    let created = am.insert(db).await?;
    info!(activity_id = %created.id, capacity = ?created.capacity, "activity_created");
    Ok(created)
}

pub async fn get_activity(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<education_activity::Model, ServiceError> {
    authorize(caller, Action::Read, &ResourceRef::catalog())?;
    store::find_one::<education_activity::Entity, _>(db, id, "education activity").await
}

pub async fn list_activities(
    db: &DatabaseConnection,
    caller: &Caller,
    page: Page,
) -> Result<Vec<education_activity::Model>, ServiceError> {
    authorize(caller, Action::Read, &ResourceRef::catalog())?;
    let q = education_activity::Entity::find();
    Ok(store::page(q, education_activity::Column::CreatedAt, page).all(db).await?)
}

/// Lowering `capacity` below the seats already taken is a conflict.
#[instrument(skip(db, patch), fields(caller_id = %caller.id, activity_id = %id))]
pub async fn update_activity(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
    patch: ActivityPatch,
) -> Result<education_activity::Model, ServiceError> {
    authorize(caller, Action::Update, &ResourceRef::catalog())?;
    let txn = db.begin().await?;
    let current = find_for_update::<education_activity::Entity, _>(&txn, id, "education activity").await?;

    let mut am: education_activity::ActiveModel = current.clone().into();
    if let Some(v) = patch.title { am.title = Set(v); }
    if let Some(v) = patch.description { am.description = Set(v); }
    if let Some(v) = patch.start_date { am.start_date = Set(utc(v)); }
    if let Some(v) = patch.end_date { am.end_date = Set(utc(v)); }
    if let Some(v) = patch.location { am.location = Set(v); }
    if let Some(Some(cap)) = patch.capacity {
        let taken = active_registrations(&txn, current.id).await?;
        if cap >= 0 && (cap as u64) < taken {
            return Err(ServiceError::conflict(format!("{taken} seats already taken")));
        }
    }
    if let Some(cap) = patch.capacity { am.capacity = Set(cap); }

    if !am.is_changed() {
        txn.commit().await?;
        return Ok(current);
    }
    am.clone().try_into_model()?.validate()?;
    am.updated_at = Set(store::now());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    info!(activity_id = %updated.id, "activity_updated");
    Ok(updated)
}

pub async fn delete_activity(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    authorize(caller, Action::Delete, &ResourceRef::catalog())?;
    let txn = db.begin().await?;
    let current = find_for_update::<education_activity::Entity, _>(&txn, id, "education activity").await?;
    education_activity::Entity::delete_by_id(current.id).exec(&txn).await?;
    txn.commit().await?;
    info!(activity_id = %id, "activity_deleted");
    Ok(())
}

// ---- registrations ----

/// Register the caller (or, for admins, another user) for an activity.
///
/// Fails with `Conflict` when the activity is full or the user already
/// holds a pending/approved registration for it.
#[instrument(skip(db, input), fields(caller_id = %caller.id, activity_id = %input.activity_id))]
pub async fn create_registration(
    db: &DatabaseConnection,
    caller: &Caller,
    input: NewRegistration,
) -> Result<activity_registration::Model, ServiceError> {
    let target = input.user_id.unwrap_or(caller.id);
    authorize(caller, Action::Create, &ResourceRef::owned_unlocked(target))?;

    let txn = db.begin().await?;
    let activity = find_for_update::<education_activity::Entity, _>(&txn, input.activity_id, "education activity").await?;
    if target != caller.id {
        store::find_one::<user::Entity, _>(&txn, target, "user").await?;
    }

    let already = activity_registration::Entity::find()
        .filter(activity_registration::Column::ActivityId.eq(activity.id))
        .filter(activity_registration::Column::UserId.eq(target))
        .filter(activity_registration::Column::Status.is_in(RequestStatus::ACTIVE))
        .count(&txn)
        .await?;
    if already > 0 {
        return Err(ServiceError::conflict("user is already registered for this activity"));
    }

    if let Some(cap) = activity.capacity {
        let taken = active_registrations(&txn, activity.id).await?;
        if taken >= cap.max(0) as u64 {
            warn!(activity_id = %activity.id, capacity = cap, taken, "activity_full");
            return Err(ServiceError::conflict("activity full"));
        }
    }

    let now = store::now();
    let created = activity_registration::ActiveModel {
        id: Set(Uuid::new_v4()),
        activity_id: Set(activity.id),
        user_id: Set(target),
        status: Set(RequestStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(registration_id = %created.id, user_id = %target, "registration_created");
    Ok(created)
}

pub async fn get_registration(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
) -> Result<activity_registration::Model, ServiceError> {
    let found = store::find_one::<activity_registration::Entity, _>(db, id, "registration").await?;
    authorize(caller, Action::Read, &ResourceRef::owned(found.user_id, found.status))?;
    Ok(found)
}

pub async fn list_registrations(
    db: &DatabaseConnection,
    caller: &Caller,
    filter: RegistrationFilter,
    page: Page,
) -> Result<Vec<activity_registration::Model>, ServiceError> {
    require_active(caller)?;
    let mut q = store::with_status(activity_registration::Entity::find(), activity_registration::Column::Status, filter.status);
    if let Some(activity_id) = filter.activity_id {
        q = q.filter(activity_registration::Column::ActivityId.eq(activity_id));
    }
    if !caller.is_privileged() {
        q = q.filter(activity_registration::Column::UserId.eq(caller.id));
    }
    Ok(store::page(q, activity_registration::Column::CreatedAt, page).all(db).await?)
}

pub async fn list_my_registrations(
    db: &DatabaseConnection,
    caller: &Caller,
    filter: RegistrationFilter,
    page: Page,
) -> Result<Vec<activity_registration::Model>, ServiceError> {
    authorize(caller, Action::ReadOwn, &ResourceRef::owned_unlocked(caller.id))?;
    let mut q = store::with_status(activity_registration::Entity::find(), activity_registration::Column::Status, filter.status)
        .filter(activity_registration::Column::UserId.eq(caller.id));
    if let Some(activity_id) = filter.activity_id {
        q = q.filter(activity_registration::Column::ActivityId.eq(activity_id));
    }
    Ok(store::page(q, activity_registration::Column::CreatedAt, page).all(db).await?)
}

/// Only the status of a registration can change.
#[instrument(skip(db, patch), fields(caller_id = %caller.id, registration_id = %id))]
pub async fn update_registration(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
    patch: RegistrationPatch,
) -> Result<activity_registration::Model, ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<activity_registration::Entity, _>(&txn, id, "registration").await?;
    let change = authorize_patch(caller, current.user_id, current.status, false, patch.status)?;
    let Some(next) = change else {
        txn.commit().await?;
        return Ok(current);
    };

    let mut am: activity_registration::ActiveModel = current.clone().into();
    am.status = Set(next);
    am.updated_at = Set(store::now());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    info!(registration_id = %updated.id, from = %current.status, to = %next, "status_changed");
    Ok(updated)
}

pub async fn delete_registration(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<activity_registration::Entity, _>(&txn, id, "registration").await?;
    authorize(caller, Action::Delete, &ResourceRef::owned(current.user_id, current.status))?;
    activity_registration::Entity::delete_by_id(current.id).exec(&txn).await?;
    txn.commit().await?;
    info!(registration_id = %id, "registration_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::DenyReason;
    use crate::test_support::{at, get_db, seed_user};
    use models::UserRole;

    fn workshop(capacity: Option<i32>) -> NewActivity {
        NewActivity {
            title: "Rust workshop".into(),
            description: "two days".into(),
            start_date: at(20, 9),
            end_date: at(21, 17),
            location: "Room 4".into(),
            capacity,
        }
    }

    fn join(activity_id: Uuid) -> NewRegistration {
        NewRegistration { activity_id, user_id: None }
    }

    #[tokio::test]
    async fn catalog_is_admin_managed() -> anyhow::Result<()> {
        let db = get_db().await?;
        let e = seed_user(&db, UserRole::Employee).await?;
        let m = seed_user(&db, UserRole::Manager).await?;
        let admin = seed_user(&db, UserRole::Admin).await?;

        assert!(matches!(create_activity(&db, &m, workshop(None)).await, Err(ServiceError::Forbidden(DenyReason::Role))));
        let act = create_activity(&db, &admin, workshop(Some(3))).await?;
        assert_eq!(get_activity(&db, &e, act.id).await?.capacity, Some(3));
        assert_eq!(list_activities(&db, &e, Page { offset: 0, limit: 10 }).await?.len(), 1);

        let res = update_activity(&db, &e, act.id, ActivityPatch { title: Some("x".into()), ..Default::default() }).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::Role))));
        assert!(create_activity(&db, &admin, workshop(Some(-1))).await.unwrap_err().is_validation());
        Ok(())
    }

    #[tokio::test]
    async fn capacity_counts_pending_and_approved_only() -> anyhow::Result<()> {
        let db = get_db().await?;
        let admin = seed_user(&db, UserRole::Admin).await?;
        let act = create_activity(&db, &admin, workshop(Some(2))).await?;
        let u1 = seed_user(&db, UserRole::Employee).await?;
        let u2 = seed_user(&db, UserRole::Employee).await?;
        let u3 = seed_user(&db, UserRole::Employee).await?;
        let u4 = seed_user(&db, UserRole::Employee).await?;

        let r1 = create_registration(&db, &u1, join(act.id)).await?;
        let r2 = create_registration(&db, &u2, join(act.id)).await?;
        update_registration(&db, &admin, r2.id, RegistrationPatch { status: Some(RequestStatus::Approved) }).await?;

        let full = create_registration(&db, &u3, join(act.id)).await;
        assert!(matches!(full, Err(ServiceError::Conflict(_))));

        update_registration(&db, &admin, r1.id, RegistrationPatch { status: Some(RequestStatus::Rejected) }).await?;
        create_registration(&db, &u3, join(act.id)).await?;
        assert!(matches!(create_registration(&db, &u4, join(act.id)).await, Err(ServiceError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn zero_capacity_accepts_nobody_and_unbounded_accepts_all() -> anyhow::Result<()> {
        let db = get_db().await?;
        let admin = seed_user(&db, UserRole::Admin).await?;
        let closed = create_activity(&db, &admin, workshop(Some(0))).await?;
        let open = create_activity(&db, &admin, workshop(None)).await?;
        let u = seed_user(&db, UserRole::Employee).await?;
        assert!(matches!(create_registration(&db, &u, join(closed.id)).await, Err(ServiceError::Conflict(_))));
        create_registration(&db, &u, join(open.id)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_active_registration_conflicts() -> anyhow::Result<()> {
        let db = get_db().await?;
        let admin = seed_user(&db, UserRole::Admin).await?;
        let act = create_activity(&db, &admin, workshop(None)).await?;
        let u = seed_user(&db, UserRole::Employee).await?;
        let r = create_registration(&db, &u, join(act.id)).await?;
        assert!(matches!(create_registration(&db, &u, join(act.id)).await, Err(ServiceError::Conflict(_))));

        update_registration(&db, &u, r.id, RegistrationPatch { status: Some(RequestStatus::Cancelled) }).await?;
        create_registration(&db, &u, join(act.id)).await?;
        Ok(())
    }

    #[tokio::test]
    async fn registering_someone_else_needs_admin() -> anyhow::Result<()> {
        let db = get_db().await?;
        let admin = seed_user(&db, UserRole::Admin).await?;
        let act = create_activity(&db, &admin, workshop(None)).await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let b = seed_user(&db, UserRole::Employee).await?;

        let for_b = NewRegistration { activity_id: act.id, user_id: Some(b.id) };
        assert!(matches!(create_registration(&db, &a, for_b.clone()).await, Err(ServiceError::Forbidden(DenyReason::NotOwner))));
        let r = create_registration(&db, &admin, for_b).await?;
        assert_eq!(r.user_id, b.id);

        let ghost = NewRegistration { activity_id: act.id, user_id: Some(Uuid::new_v4()) };
        assert!(matches!(create_registration(&db, &admin, ghost).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(create_registration(&db, &a, join(Uuid::new_v4())).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn capacity_cannot_drop_below_taken_seats() -> anyhow::Result<()> {
        let db = get_db().await?;
        let admin = seed_user(&db, UserRole::Admin).await?;
        let act = create_activity(&db, &admin, workshop(Some(5))).await?;
        for _ in 0..2 {
            let u = seed_user(&db, UserRole::Employee).await?;
            create_registration(&db, &u, join(act.id)).await?;
        }
        let res = update_activity(&db, &admin, act.id, ActivityPatch { capacity: Some(Some(1)), ..Default::default() }).await;
        assert!(matches!(res, Err(ServiceError::Conflict(_))));
        let ok = update_activity(&db, &admin, act.id, ActivityPatch { capacity: Some(Some(2)), ..Default::default() }).await?;
        assert_eq!(ok.capacity, Some(2));

        let unbounded: ActivityPatch = serde_json::from_str(r#"{"capacity": null}"#)?;
        assert_eq!(update_activity(&db, &admin, act.id, unbounded).await?.capacity, None);
        Ok(())
    }
}
