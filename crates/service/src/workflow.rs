//! Status transitions of request-like records.
//!
//! Cancelling is the owner's withdrawal and only the owner may do it.
//! Approving and rejecting are decisions taken by admins or managers.

use models::RequestStatus;
use tracing::warn;
use uuid::Uuid;

use crate::authz::{authorize, Action, Caller, DenyReason, ResourceRef};
use crate::errors::ServiceError;

/// Checks that `caller` may move a record owned by `owner_id` from `current` to `next`.
pub fn check_transition(
    caller: &Caller,
    owner_id: Uuid,
    current: RequestStatus,
    next: RequestStatus,
) -> Result<(), ServiceError> {
    if next == RequestStatus::Pending {
        return Err(ServiceError::Validation(
            "status may only be set to approved, rejected or cancelled".into(),
        ));
    }

    if next == RequestStatus::Cancelled {
        if !caller.active {
            return Err(ServiceError::Forbidden(DenyReason::Inactive));
        }
        if caller.id != owner_id {
            warn!(caller_id = %caller.id, %owner_id, reason = DenyReason::NotOwner.code(), "cancel_denied");
            return Err(ServiceError::Forbidden(DenyReason::NotOwner));
        }
    } else {
        authorize(caller, Action::UpdateStatus, &ResourceRef::owned(owner_id, current))?;
    }

    if !current.can_transition_to(next) {
        return Err(ServiceError::conflict(format!("cannot move from {current} to {next}")));
    }
    Ok(())
}

/// Gate for a partial update of an owned, status-bearing record.
///
/// Payload edits (or an empty patch) are authorized as `Update`; a status
/// that differs from the current one is checked as a transition on top.
/// Returns the effective status change, if any.
pub fn authorize_patch(
    caller: &Caller,
    owner_id: Uuid,
    current: RequestStatus,
    has_payload: bool,
    next: Option<RequestStatus>,
) -> Result<Option<RequestStatus>, ServiceError> {
    let change = next.filter(|s| *s != current);
    if has_payload || change.is_none() {
        authorize(caller, Action::Update, &ResourceRef::owned(owner_id, current))?;
    }
    if let Some(next) = change {
        check_transition(caller, owner_id, current, next)?;
    }
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::UserRole;

    fn caller(role: UserRole) -> Caller {
        Caller { id: Uuid::new_v4(), role, active: true }
    }

    #[test]
    fn approver_decides_pending_records() {
        let owner = Uuid::new_v4();
        for role in [UserRole::Admin, UserRole::Manager] {
            let c = caller(role);
            assert!(check_transition(&c, owner, RequestStatus::Pending, RequestStatus::Approved).is_ok());
            assert!(check_transition(&c, owner, RequestStatus::Pending, RequestStatus::Rejected).is_ok());
        }
    }

    #[test]
    fn employee_cannot_approve_own_record() {
        let e = caller(UserRole::Employee);
        let res = check_transition(&e, e.id, RequestStatus::Pending, RequestStatus::Approved);
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::Role))));
    }

    #[test]
    fn cancel_is_owner_only() {
        let e = caller(UserRole::Employee);
        assert!(check_transition(&e, e.id, RequestStatus::Pending, RequestStatus::Cancelled).is_ok());

        let admin = caller(UserRole::Admin);
        let res = check_transition(&admin, e.id, RequestStatus::Pending, RequestStatus::Cancelled);
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::NotOwner))));
    }

    #[test]
    fn terminal_states_do_not_move() {
        let admin = caller(UserRole::Admin);
        let owner = Uuid::new_v4();
        let res = check_transition(&admin, owner, RequestStatus::Approved, RequestStatus::Rejected);
        assert!(matches!(res, Err(ServiceError::Conflict(_))));

        let e = caller(UserRole::Employee);
        let res = check_transition(&e, e.id, RequestStatus::Rejected, RequestStatus::Cancelled);
        assert!(matches!(res, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn back_to_pending_is_invalid_input() {
        let admin = caller(UserRole::Admin);
        let res = check_transition(&admin, admin.id, RequestStatus::Approved, RequestStatus::Pending);
        assert!(matches!(res, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn status_only_patch_skips_payload_gate() {
        let admin = caller(UserRole::Admin);
        let owner = Uuid::new_v4();
        let change = authorize_patch(&admin, owner, RequestStatus::Pending, false, Some(RequestStatus::Approved)).unwrap();
        assert_eq!(change, Some(RequestStatus::Approved));

        let m = caller(UserRole::Manager);
        assert!(authorize_patch(&m, owner, RequestStatus::Pending, false, Some(RequestStatus::Rejected)).is_ok());
        let res = authorize_patch(&m, owner, RequestStatus::Pending, true, Some(RequestStatus::Rejected));
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::NotOwner))));
    }

    #[test]
    fn payload_edit_after_decision_is_locked() {
        let e = caller(UserRole::Employee);
        let res = authorize_patch(&e, e.id, RequestStatus::Approved, true, None);
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::StatusLocked))));
    }

    #[test]
    fn unchanged_status_is_not_a_transition() {
        let e = caller(UserRole::Employee);
        let change = authorize_patch(&e, e.id, RequestStatus::Pending, false, Some(RequestStatus::Pending)).unwrap();
        assert_eq!(change, None);
    }

    #[test]
    fn inactive_owner_cannot_cancel() {
        let e = Caller { active: false, ..caller(UserRole::Employee) };
        let res = check_transition(&e, e.id, RequestStatus::Pending, RequestStatus::Cancelled);
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::Inactive))));
    }
}
