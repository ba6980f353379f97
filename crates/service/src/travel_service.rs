//! Travel requests and the bookings made once a request is approved.

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    TryIntoModel,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::{travel_booking, travel_request, RequestStatus};
use crate::authz::{authorize, require_active, Action, Caller, ResourceRef};
use crate::errors::ServiceError;
use crate::pagination::Page;
use crate::store::{self, find_for_update, utc};
use crate::workflow::authorize_patch;

#[derive(Debug, Clone, Deserialize)]
pub struct NewTravelRequest {
    pub destination: String,
    pub purpose: String,
    pub departure_date: DateTimeWithTimeZone,
    pub return_date: DateTimeWithTimeZone,
    pub estimated_cost: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TravelRequestPatch {
    pub destination: Option<String>,
    pub purpose: Option<String>,
    pub departure_date: Option<DateTimeWithTimeZone>,
    pub return_date: Option<DateTimeWithTimeZone>,
    pub estimated_cost: Option<f64>,
    pub status: Option<RequestStatus>,
}

impl TravelRequestPatch {
    fn has_payload(&self) -> bool {
        self.destination.is_some()
            || self.purpose.is_some()
            || self.departure_date.is_some()
            || self.return_date.is_some()
            || self.estimated_cost.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTravelBooking {
    pub travel_request_id: Uuid,
    pub booking_type: String,
    pub provider: String,
    pub booking_reference: String,
    pub details: String,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TravelBookingPatch {
    pub booking_type: Option<String>,
    pub provider: Option<String>,
    pub booking_reference: Option<String>,
    pub details: Option<String>,
    pub cost: Option<f64>,
}

// ---- requests ----

#[instrument(skip(db, input), fields(caller_id = %caller.id))]
pub async fn create_request(
    db: &DatabaseConnection,
    caller: &Caller,
    input: NewTravelRequest,
) -> Result<travel_request::Model, ServiceError> {
    authorize(caller, Action::Create, &ResourceRef::owned_unlocked(caller.id))?;
    let now = store::now();
    let am = travel_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(caller.id),
        destination: Set(input.destination),
        purpose: Set(input.purpose),
        departure_date: Set(utc(input.departure_date)),
        return_date: Set(utc(input.return_date)),
        estimated_cost: Set(input.estimated_cost),
        status: Set(RequestStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.clone().try_into_model()?.validate()?;
    let created = am.insert(db).await?;
    info!(travel_request_id = %created.id, destination = %created.destination, "travel_request_created");
    Ok(created)
}

pub async fn get_request(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<travel_request::Model, ServiceError> {
    let found = store::find_one::<travel_request::Entity, _>(db, id, "travel request").await?;
    authorize(caller, Action::Read, &ResourceRef::owned(found.user_id, found.status))?;
    Ok(found)
}

pub async fn list_requests(
    db: &DatabaseConnection,
    caller: &Caller,
    status: Option<RequestStatus>,
    page: Page,
) -> Result<Vec<travel_request::Model>, ServiceError> {
    require_active(caller)?;
    let mut q = store::with_status(travel_request::Entity::find(), travel_request::Column::Status, status);
    if !caller.is_privileged() {
        q = q.filter(travel_request::Column::UserId.eq(caller.id));
    }
    Ok(store::page(q, travel_request::Column::CreatedAt, page).all(db).await?)
}

pub async fn list_my_requests(
    db: &DatabaseConnection,
    caller: &Caller,
    status: Option<RequestStatus>,
    page: Page,
) -> Result<Vec<travel_request::Model>, ServiceError> {
    authorize(caller, Action::ReadOwn, &ResourceRef::owned_unlocked(caller.id))?;
    let q = store::with_status(travel_request::Entity::find(), travel_request::Column::Status, status)
        .filter(travel_request::Column::UserId.eq(caller.id));
    Ok(store::page(q, travel_request::Column::CreatedAt, page).all(db).await?)
}

#[instrument(skip(db, patch), fields(caller_id = %caller.id, travel_request_id = %id))]
pub async fn update_request(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
    patch: TravelRequestPatch,
) -> Result<travel_request::Model, ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<travel_request::Entity, _>(&txn, id, "travel request").await?;
    let change = authorize_patch(caller, current.user_id, current.status, patch.has_payload(), patch.status)?;

    let mut am: travel_request::ActiveModel = current.clone().into();
    if let Some(v) = patch.destination { am.destination = Set(v); }
    if let Some(v) = patch.purpose { am.purpose = Set(v); }
    if let Some(v) = patch.departure_date { am.departure_date = Set(utc(v)); }
    if let Some(v) = patch.return_date { am.return_date = Set(utc(v)); }
    if let Some(v) = patch.estimated_cost { am.estimated_cost = Set(v); }
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
        Some(s) => info!(travel_request_id = %updated.id, from = %current.status, to = %s, "status_changed"),
        None => info!(travel_request_id = %updated.id, "travel_request_updated"),
    }
    Ok(updated)
}

pub async fn delete_request(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<travel_request::Entity, _>(&txn, id, "travel request").await?;
    authorize(caller, Action::Delete, &ResourceRef::owned(current.user_id, current.status))?;
    travel_request::Entity::delete_by_id(current.id).exec(&txn).await?;
    txn.commit().await?;
    info!(travel_request_id = %id, "travel_request_deleted");
    Ok(())
}

// ---- bookings ----

/// Bookings inherit their owner from the parent request and carry no status.
fn booking_ref(parent: &travel_request::Model) -> ResourceRef {
    ResourceRef::owned_unlocked(parent.user_id)
}

/// Attach a booking to an approved request owned by the caller.
#[instrument(skip(db, input), fields(caller_id = %caller.id, travel_request_id = %input.travel_request_id))]
pub async fn create_booking(
    db: &DatabaseConnection,
    caller: &Caller,
    input: NewTravelBooking,
) -> Result<travel_booking::Model, ServiceError> {
    let txn = db.begin().await?;
    let parent = find_for_update::<travel_request::Entity, _>(&txn, input.travel_request_id, "travel request").await?;
    authorize(caller, Action::Create, &booking_ref(&parent))?;
    if parent.status != RequestStatus::Approved {
        warn!(travel_request_id = %parent.id, status = %parent.status, "booking_on_unapproved_request");
        return Err(ServiceError::conflict(format!("travel request is {}, bookings need an approved request", parent.status)));
    }

    let now = store::now();
    let am = travel_booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        travel_request_id: Set(parent.id),
        booking_type: Set(input.booking_type),
        provider: Set(input.provider),
        booking_reference: Set(input.booking_reference),
        details: Set(input.details),
        cost: Set(input.cost),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.clone().try_into_model()?.validate()?;
    let created = am.insert(&txn).await?;
    txn.commit().await?;
    info!(travel_booking_id = %created.id, travel_request_id = %parent.id, "travel_booking_created");
    Ok(created)
}

pub async fn get_booking(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<travel_booking::Model, ServiceError> {
    let found = store::find_one::<travel_booking::Entity, _>(db, id, "travel booking").await?;
    let parent = store::find_one::<travel_request::Entity, _>(db, found.travel_request_id, "travel request").await?;
    authorize(caller, Action::Read, &booking_ref(&parent))?;
    Ok(found)
}

pub async fn list_bookings_for_request(
    db: &DatabaseConnection,
    caller: &Caller,
    request_id: Uuid,
) -> Result<Vec<travel_booking::Model>, ServiceError> {
    let parent = store::find_one::<travel_request::Entity, _>(db, request_id, "travel request").await?;
    authorize(caller, Action::Read, &booking_ref(&parent))?;
    let rows = travel_booking::Entity::find()
        .filter(travel_booking::Column::TravelRequestId.eq(parent.id))
        .order_by_asc(travel_booking::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows)
}

#[instrument(skip(db, patch), fields(caller_id = %caller.id, travel_booking_id = %id))]
pub async fn update_booking(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
    patch: TravelBookingPatch,
) -> Result<travel_booking::Model, ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<travel_booking::Entity, _>(&txn, id, "travel booking").await?;
    let parent = store::find_one::<travel_request::Entity, _>(&txn, current.travel_request_id, "travel request").await?;
    authorize(caller, Action::Update, &booking_ref(&parent))?;

    let mut am: travel_booking::ActiveModel = current.clone().into();
    if let Some(v) = patch.booking_type { am.booking_type = Set(v); }
    if let Some(v) = patch.provider { am.provider = Set(v); }
    if let Some(v) = patch.booking_reference { am.booking_reference = Set(v); }
    if let Some(v) = patch.details { am.details = Set(v); }
    if let Some(v) = patch.cost { am.cost = Set(v); }

    if !am.is_changed() {
        txn.commit().await?;
        return Ok(current);
    }
    am.clone().try_into_model()?.validate()?;
    am.updated_at = Set(store::now());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    info!(travel_booking_id = %updated.id, "travel_booking_updated");
    Ok(updated)
}

pub async fn delete_booking(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<travel_booking::Entity, _>(&txn, id, "travel booking").await?;
    let parent = store::find_one::<travel_request::Entity, _>(&txn, current.travel_request_id, "travel request").await?;
    authorize(caller, Action::Delete, &booking_ref(&parent))?;
    travel_booking::Entity::delete_by_id(current.id).exec(&txn).await?;
    txn.commit().await?;
    info!(travel_booking_id = %id, "travel_booking_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::DenyReason;
    use crate::test_support::{at, get_db, seed_user};
    use models::UserRole;

    fn berlin() -> NewTravelRequest {
        NewTravelRequest {
            destination: "Berlin".into(),
            purpose: "conference".into(),
            departure_date: at(10, 8),
            return_date: at(12, 18),
            estimated_cost: 900.0,
        }
    }

    fn flight(request: Uuid) -> NewTravelBooking {
        NewTravelBooking {
            travel_request_id: request,
            booking_type: "flight".into(),
            provider: "Air".into(),
            booking_reference: "ABC123".into(),
            details: "seat 12A".into(),
            cost: 320.0,
        }
    }

    #[tokio::test]
    async fn bookings_need_an_approved_request() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let admin = seed_user(&db, UserRole::Admin).await?;
        let r = create_request(&db, &a, berlin()).await?;

        assert!(matches!(create_booking(&db, &a, flight(r.id)).await, Err(ServiceError::Conflict(_))));

        update_request(&db, &admin, r.id, TravelRequestPatch { status: Some(RequestStatus::Approved), ..Default::default() }).await?;
        let b = create_booking(&db, &a, flight(r.id)).await?;
        assert_eq!(b.travel_request_id, r.id);

        let listed = list_bookings_for_request(&db, &a, r.id).await?;
        assert_eq!(listed, vec![b]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_parent_is_not_found() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        assert!(matches!(create_booking(&db, &a, flight(Uuid::new_v4())).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn bookings_follow_parent_ownership() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let b = seed_user(&db, UserRole::Employee).await?;
        let m = seed_user(&db, UserRole::Manager).await?;
        let r = create_request(&db, &a, berlin()).await?;
        update_request(&db, &m, r.id, TravelRequestPatch { status: Some(RequestStatus::Approved), ..Default::default() }).await?;

        assert!(matches!(create_booking(&db, &b, flight(r.id)).await, Err(ServiceError::Forbidden(DenyReason::NotOwner))));
        let booking = create_booking(&db, &a, flight(r.id)).await?;

        assert_eq!(get_booking(&db, &m, booking.id).await?.id, booking.id);
        assert!(matches!(get_booking(&db, &b, booking.id).await, Err(ServiceError::Forbidden(DenyReason::NotOwner))));
        assert!(matches!(
            update_booking(&db, &m, booking.id, TravelBookingPatch { cost: Some(1.0), ..Default::default() }).await,
            Err(ServiceError::Forbidden(DenyReason::NotOwner))
        ));

        let updated = update_booking(&db, &a, booking.id, TravelBookingPatch { cost: Some(280.0), ..Default::default() }).await?;
        assert_eq!(updated.cost, 280.0);
        assert_eq!(updated.provider, "Air");

        delete_booking(&db, &a, booking.id).await?;
        assert!(list_bookings_for_request(&db, &a, r.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn request_validation() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let back_first = NewTravelRequest { return_date: at(9, 8), ..berlin() };
        assert!(create_request(&db, &a, back_first).await.unwrap_err().is_validation());
        let negative = NewTravelRequest { estimated_cost: -5.0, ..berlin() };
        assert!(create_request(&db, &a, negative).await.unwrap_err().is_validation());
        Ok(())
    }
}
