//! Service layer: authorization rules and per-entity business operations.
//! - `authz` decides allow/deny for a verified caller; it never touches the store.
//! - Entity services load, authorize and mutate records inside one transaction.
//! - Reuses validation and entity definitions in `models` crate.

pub mod errors;
pub mod authz;
pub mod workflow;
pub mod pagination;
pub mod auth;
pub mod user_service;
pub mod expense_service;
pub mod sick_leave_service;
pub mod education_service;
pub mod asset_service;
pub mod maintenance_service;
pub mod travel_service;
mod serde_helpers;
mod store;
#[cfg(test)]
pub mod test_support;

pub use authz::{Action, Caller, Decision, DenyReason, ResourceRef};
pub use errors::ServiceError;
