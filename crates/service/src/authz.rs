//! Authorization decisions.
//!
//! `can_act` is a pure function of the verified caller, the requested action
//! and the target resource's owner/status. It never touches the store; entity
//! services load the record first and pass the relevant facts in.

use std::fmt;

use models::{user, RequestStatus, UserRole};
use tracing::warn;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Verified identity of the party making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: UserRole,
    pub active: bool,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

impl From<&user::Model> for Caller {
    fn from(u: &user::Model) -> Self {
        Self { id: u.id, role: u.role, active: u.is_active }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    ReadOwn,
    Update,
    UpdateStatus,
    Delete,
}

/// Facts about the target the decision depends on.
///
/// `owner_id = None` marks a catalog resource (asset, education activity)
/// that nobody owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRef {
    pub owner_id: Option<Uuid>,
    pub status: Option<RequestStatus>,
}

impl ResourceRef {
    pub fn owned(owner_id: Uuid, status: RequestStatus) -> Self {
        Self { owner_id: Some(owner_id), status: Some(status) }
    }

    /// Owned record without an approval workflow.
    pub fn owned_unlocked(owner_id: Uuid) -> Self {
        Self { owner_id: Some(owner_id), status: None }
    }

    pub fn catalog() -> Self {
        Self { owner_id: None, status: None }
    }

    fn is_owned_by(&self, caller: &Caller) -> bool {
        self.owner_id == Some(caller.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Inactive,
    NotOwner,
    StatusLocked,
    Role,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::Inactive => "forbidden-inactive",
            DenyReason::NotOwner => "forbidden-not-owner",
            DenyReason::StatusLocked => "forbidden-status-locked",
            DenyReason::Role => "forbidden-role",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

pub fn can_act(caller: &Caller, action: Action, resource: &ResourceRef) -> Decision {
    use Decision::{Allow, Deny};

    // Checked before anything else, including the admin bypass.
    if !caller.active {
        return Deny(DenyReason::Inactive);
    }
    if caller.is_admin() {
        return Allow;
    }

    let catalog = resource.owner_id.is_none();
    let owner = resource.is_owned_by(caller);

    match action {
        Action::Create if catalog => Deny(DenyReason::Role),
        Action::Create if owner => Allow,
        Action::Create => Deny(DenyReason::NotOwner),

        Action::Read if catalog || owner || caller.is_privileged() => Allow,
        Action::Read => Deny(DenyReason::NotOwner),

        Action::ReadOwn if owner => Allow,
        Action::ReadOwn => Deny(DenyReason::NotOwner),

        Action::Update if catalog => Deny(DenyReason::Role),
        Action::Update if !owner => Deny(DenyReason::NotOwner),
        Action::Update => match resource.status {
            Some(s) if s != RequestStatus::Pending => Deny(DenyReason::StatusLocked),
            _ => Allow,
        },

        Action::UpdateStatus if caller.is_privileged() && !catalog => Allow,
        Action::UpdateStatus => Deny(DenyReason::Role),

        Action::Delete if catalog => Deny(DenyReason::Role),
        Action::Delete if owner => Allow,
        Action::Delete => Deny(DenyReason::NotOwner),
    }
}

/// `can_act` lifted into the service error type; denials are logged.
pub fn authorize(caller: &Caller, action: Action, resource: &ResourceRef) -> Result<(), ServiceError> {
    match can_act(caller, action, resource) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            warn!(caller_id = %caller.id, role = %caller.role, ?action, reason = reason.code(), "access_denied");
            Err(ServiceError::Forbidden(reason))
        }
    }
}

pub fn require_admin(caller: &Caller) -> Result<(), ServiceError> {
    let reason = if !caller.active {
        DenyReason::Inactive
    } else if !caller.is_admin() {
        DenyReason::Role
    } else {
        return Ok(());
    };
    warn!(caller_id = %caller.id, role = %caller.role, reason = reason.code(), "admin_required");
    Err(ServiceError::Forbidden(reason))
}

/// Admin or manager.
pub fn require_privileged(caller: &Caller) -> Result<(), ServiceError> {
    let reason = if !caller.active {
        DenyReason::Inactive
    } else if !caller.is_privileged() {
        DenyReason::Role
    } else {
        return Ok(());
    };
    warn!(caller_id = %caller.id, role = %caller.role, reason = reason.code(), "privileged_role_required");
    Err(ServiceError::Forbidden(reason))
}

/// Only an active caller gets past this point.
pub fn require_active(caller: &Caller) -> Result<(), ServiceError> {
    if caller.active {
        return Ok(());
    }
    warn!(caller_id = %caller.id, reason = DenyReason::Inactive.code(), "inactive_caller");
    Err(ServiceError::Forbidden(DenyReason::Inactive))
}
