//! Persistence model: sea-orm entities, their enums, and field validators.
//!
//! Entities reference their owners by id only; no object graph is loaded
//! implicitly. Services resolve foreign keys on demand.

pub mod errors;
pub mod db;
pub mod status;
pub mod validate;
pub mod user;
pub mod expense;
pub mod sick_leave;
pub mod education_activity;
pub mod activity_registration;
pub mod asset;
pub mod asset_booking;
pub mod maintenance_issue;
pub mod travel_request;
pub mod travel_booking;

pub use status::{RequestStatus, UserRole};
