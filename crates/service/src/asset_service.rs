//! Bookable assets (catalog) and their time-window bookings.

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait, TryIntoModel,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::{asset, asset_booking, RequestStatus};
use crate::authz::{authorize, require_active, Action, Caller, ResourceRef};
use crate::errors::ServiceError;
use crate::pagination::Page;
use crate::store::{self, find_for_update, utc};
use crate::workflow::authorize_patch;

fn default_available() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct NewAsset {
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAssetBooking {
    pub asset_id: Uuid,
    pub start_time: DateTimeWithTimeZone,
    pub end_time: DateTimeWithTimeZone,
    pub purpose: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetBookingPatch {
    pub start_time: Option<DateTimeWithTimeZone>,
    pub end_time: Option<DateTimeWithTimeZone>,
    pub purpose: Option<String>,
    pub status: Option<RequestStatus>,
}

impl AssetBookingPatch {
    fn has_payload(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some() || self.purpose.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BookingFilter {
    pub status: Option<RequestStatus>,
    pub asset_id: Option<Uuid>,
}

/// Any pending/approved booking of `asset_id` intersecting `[start, end)`,
/// other than `exclude`.
async fn find_overlap<C: ConnectionTrait>(
    conn: &C,
    asset_id: Uuid,
    start: DateTimeWithTimeZone,
    end: DateTimeWithTimeZone,
    exclude: Option<Uuid>,
) -> Result<Option<asset_booking::Model>, ServiceError> {
    let mut q = asset_booking::Entity::find()
        .filter(asset_booking::Column::AssetId.eq(asset_id))
        .filter(asset_booking::Column::Status.is_in(RequestStatus::ACTIVE))
        .filter(asset_booking::Column::StartTime.lt(end))
        .filter(asset_booking::Column::EndTime.gt(start));
    if let Some(id) = exclude {
        q = q.filter(asset_booking::Column::Id.ne(id));
    }
    Ok(q.one(conn).await?)
}

fn overlap_conflict(asset_id: Uuid, clash: &asset_booking::Model) -> ServiceError {
    warn!(%asset_id, conflicting_booking = %clash.id, "booking_overlap");
    ServiceError::conflict(format!(
        "asset already booked from {} to {}",
        clash.start_time.to_rfc3339(),
        clash.end_time.to_rfc3339()
    ))
}

// ---- assets ----

#[instrument(skip(db, input), fields(caller_id = %caller.id))]
pub async fn create_asset(db: &DatabaseConnection, caller: &Caller, input: NewAsset) -> Result<asset::Model, ServiceError> {
    authorize(caller, Action::Create, &ResourceRef::catalog())?;
    let now = store::now();
    let am = asset::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        description: Set(input.description),
        category: Set(input.category),
        location: Set(input.location),
        is_available: Set(input.is_available),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.clone().try_into_model()?.validate()?;
    let created = am.insert(db).await?;
    info!(asset_id = %created.id, name = %created.name, "asset_created");
    Ok(created)
}

pub async fn get_asset(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<asset::Model, ServiceError> {
    authorize(caller, Action::Read, &ResourceRef::catalog())?;
    store::find_one::<asset::Entity, _>(db, id, "asset").await
}

pub async fn list_assets(
    db: &DatabaseConnection,
    caller: &Caller,
    available: Option<bool>,
    page: Page,
) -> Result<Vec<asset::Model>, ServiceError> {
    authorize(caller, Action::Read, &ResourceRef::catalog())?;
    let mut q = asset::Entity::find();
    if let Some(a) = available {
        q = q.filter(asset::Column::IsAvailable.eq(a));
    }
    Ok(store::page(q, asset::Column::CreatedAt, page).all(db).await?)
}

#[instrument(skip(db, patch), fields(caller_id = %caller.id, asset_id = %id))]
pub async fn update_asset(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
    patch: AssetPatch,
) -> Result<asset::Model, ServiceError> {
    authorize(caller, Action::Update, &ResourceRef::catalog())?;
    let txn = db.begin().await?;
    let current = find_for_update::<asset::Entity, _>(&txn, id, "asset").await?;

    let mut am: asset::ActiveModel = current.clone().into();
    if let Some(v) = patch.name { am.name = Set(v); }
    if let Some(v) = patch.description { am.description = Set(v); }
    if let Some(v) = patch.category { am.category = Set(v); }
    if let Some(v) = patch.location { am.location = Set(v); }
    if let Some(v) = patch.is_available { am.is_available = Set(v); }

    if !am.is_changed() {
        txn.commit().await?;
        return Ok(current);
    }
    am.clone().try_into_model()?.validate()?;
    am.updated_at = Set(store::now());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    info!(asset_id = %updated.id, available = updated.is_available, "asset_updated");
    Ok(updated)
}

pub async fn delete_asset(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    authorize(caller, Action::Delete, &ResourceRef::catalog())?;
    let txn = db.begin().await?;
    let current = find_for_update::<asset::Entity, _>(&txn, id, "asset").await?;
    asset::Entity::delete_by_id(current.id).exec(&txn).await?;
    txn.commit().await?;
    info!(asset_id = %id, "asset_deleted");
    Ok(())
}

// ---- bookings ----

/// Book an asset for `[start_time, end_time)`.
///
/// The asset row is locked for the rest of the transaction, so two
/// overlapping requests for the same asset cannot both pass the check.
#[instrument(skip(db, input), fields(caller_id = %caller.id, asset_id = %input.asset_id))]
pub async fn create_booking(
    db: &DatabaseConnection,
    caller: &Caller,
    input: NewAssetBooking,
) -> Result<asset_booking::Model, ServiceError> {
    authorize(caller, Action::Create, &ResourceRef::owned_unlocked(caller.id))?;
    let now = store::now();
    let am = asset_booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        asset_id: Set(input.asset_id),
        user_id: Set(caller.id),
        start_time: Set(utc(input.start_time)),
        end_time: Set(utc(input.end_time)),
        purpose: Set(input.purpose),
        status: Set(RequestStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let candidate = am.clone().try_into_model()?;
    candidate.validate()?;

    let txn = db.begin().await?;
    let asset = find_for_update::<asset::Entity, _>(&txn, input.asset_id, "asset").await?;
    if !asset.is_available {
        return Err(ServiceError::conflict("asset is not available for booking"));
    }
    if let Some(clash) = find_overlap(&txn, asset.id, candidate.start_time, candidate.end_time, None).await? {
        return Err(overlap_conflict(asset.id, &clash));
    }
    let created = am.insert(&txn).await?;
    txn.commit().await?;
    info!(booking_id = %created.id, asset_id = %asset.id, "asset_booking_created");
    Ok(created)
}

pub async fn get_booking(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<asset_booking::Model, ServiceError> {
    let found = store::find_one::<asset_booking::Entity, _>(db, id, "asset booking").await?;
    authorize(caller, Action::Read, &ResourceRef::owned(found.user_id, found.status))?;
    Ok(found)
}

pub async fn list_bookings(
    db: &DatabaseConnection,
    caller: &Caller,
    filter: BookingFilter,
    page: Page,
) -> Result<Vec<asset_booking::Model>, ServiceError> {
    require_active(caller)?;
    let mut q = store::with_status(asset_booking::Entity::find(), asset_booking::Column::Status, filter.status);
    if let Some(asset_id) = filter.asset_id {
        q = q.filter(asset_booking::Column::AssetId.eq(asset_id));
    }
    if !caller.is_privileged() {
        q = q.filter(asset_booking::Column::UserId.eq(caller.id));
    }
    Ok(store::page(q, asset_booking::Column::CreatedAt, page).all(db).await?)
}

pub async fn list_my_bookings(
    db: &DatabaseConnection,
    caller: &Caller,
    filter: BookingFilter,
    page: Page,
) -> Result<Vec<asset_booking::Model>, ServiceError> {
    authorize(caller, Action::ReadOwn, &ResourceRef::owned_unlocked(caller.id))?;
    let mut q = store::with_status(asset_booking::Entity::find(), asset_booking::Column::Status, filter.status)
        .filter(asset_booking::Column::UserId.eq(caller.id));
    if let Some(asset_id) = filter.asset_id {
        q = q.filter(asset_booking::Column::AssetId.eq(asset_id));
    }
    Ok(store::page(q, asset_booking::Column::CreatedAt, page).all(db).await?)
}

/// Rescheduling re-runs the overlap check against every other booking.
#[instrument(skip(db, patch), fields(caller_id = %caller.id, booking_id = %id))]
pub async fn update_booking(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
    patch: AssetBookingPatch,
) -> Result<asset_booking::Model, ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<asset_booking::Entity, _>(&txn, id, "asset booking").await?;
    let change = authorize_patch(caller, current.user_id, current.status, patch.has_payload(), patch.status)?;
    let rescheduled = patch.start_time.is_some() || patch.end_time.is_some();

    let mut am: asset_booking::ActiveModel = current.clone().into();
    if let Some(v) = patch.start_time { am.start_time = Set(utc(v)); }
    if let Some(v) = patch.end_time { am.end_time = Set(utc(v)); }
    if let Some(v) = patch.purpose { am.purpose = Set(v); }
    if let Some(s) = change { am.status = Set(s); }

    if !am.is_changed() {
        txn.commit().await?;
        return Ok(current);
    }
    let merged = am.clone().try_into_model()?;
    merged.validate()?;
    if rescheduled && merged.status.is_active() {
        let asset = find_for_update::<asset::Entity, _>(&txn, current.asset_id, "asset").await?;
        if let Some(clash) = find_overlap(&txn, asset.id, merged.start_time, merged.end_time, Some(current.id)).await? {
            return Err(overlap_conflict(asset.id, &clash));
        }
    }
    am.updated_at = Set(store::now());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    match change {
        Some(s) => info!(booking_id = %updated.id, from = %current.status, to = %s, "status_changed"),
        None => info!(booking_id = %updated.id, "asset_booking_updated"),
    }
    Ok(updated)
}

pub async fn delete_booking(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<asset_booking::Entity, _>(&txn, id, "asset booking").await?;
    authorize(caller, Action::Delete, &ResourceRef::owned(current.user_id, current.status))?;
    asset_booking::Entity::delete_by_id(current.id).exec(&txn).await?;
    txn.commit().await?;
    info!(booking_id = %id, "asset_booking_deleted");
    Ok(())
}
