use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{user, UserRole};
use crate::auth::service::hash_password;
use crate::authz::{authorize, require_admin, require_privileged, Action, Caller, ResourceRef};
use crate::errors::ServiceError;
use crate::pagination::Page;
use crate::store::{self, find_for_update};

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UserPatch {
    fn touches_profile(&self) -> bool {
        self.email.is_some() || self.first_name.is_some() || self.last_name.is_some() || self.password.is_some()
    }

    fn touches_admin_fields(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn map_unique(e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::conflict("email or username already registered"),
        _ => ServiceError::from(e),
    }
}

/// Register an account.
///
/// Anyone may create an employee. Elevated roles need an active admin
/// `requester`, except for the very first account, which bootstraps the
/// initial administrator.
#[instrument(skip(db, input), fields(username = %input.username, requester = ?requester.map(|c| c.id)))]
pub async fn create_user(
    db: &DatabaseConnection,
    requester: Option<&Caller>,
    input: NewUser,
) -> Result<user::Model, ServiceError> {
    let email = normalize_email(&input.email);
    let username = input.username.trim().to_string();
    user::validate_email(&email)?;
    user::validate_username(&username)?;
    user::validate_name("first_name", &input.first_name)?;
    user::validate_name("last_name", &input.last_name)?;
    user::validate_password(&input.password)?;
    let role = input.role.unwrap_or_default();

    let txn = db.begin().await?;
    if role != UserRole::Employee {
        store::lock_table(&txn, "users").await?;
        let existing = user::Entity::find().count(&txn).await?;
        if existing > 0 {
            match requester {
                Some(caller) => require_admin(caller)?,
                None => return Err(ServiceError::Unauthenticated("admin token required to assign role".into())),
            }
        }
    }

    let taken = user::Entity::find()
        .filter(Condition::any().add(user::Column::Email.eq(email.clone())).add(user::Column::Username.eq(username.clone())))
        .lock_exclusive()
        .one(&txn)
        .await?;
    if taken.is_some() {
        return Err(ServiceError::conflict("email or username already registered"));
    }

    let now = store::now();
    let created = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        username: Set(username),
        password_hash: Set(hash_password(&input.password)?),
        first_name: Set(input.first_name.trim().to_string()),
        last_name: Set(input.last_name.trim().to_string()),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await
    .map_err(map_unique)?;
    txn.commit().await?;
    info!(user_id = %created.id, role = %created.role, "user_created");
    Ok(created)
}

pub async fn get_user(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<user::Model, ServiceError> {
    let found = store::find_one::<user::Entity, _>(db, id, "user").await?;
    authorize(caller, Action::Read, &ResourceRef::owned_unlocked(found.id))?;
    Ok(found)
}

pub async fn me(db: &DatabaseConnection, caller: &Caller) -> Result<user::Model, ServiceError> {
    crate::authz::require_active(caller)?;
    store::find_one::<user::Entity, _>(db, caller.id, "user").await
}

pub async fn list_users(db: &DatabaseConnection, caller: &Caller, page: Page) -> Result<Vec<user::Model>, ServiceError> {
    require_privileged(caller)?;
    let rows = store::page(user::Entity::find(), user::Column::CreatedAt, page).all(db).await?;
    Ok(rows)
}

/// Partial update. Profile fields belong to the account holder (or an
/// admin); `role` and `is_active` are admin-only.
#[instrument(skip(db, patch), fields(caller_id = %caller.id, user_id = %id))]
pub async fn update_user(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
    patch: UserPatch,
) -> Result<user::Model, ServiceError> {
    let txn = db.begin().await?;
    let current = find_for_update::<user::Entity, _>(&txn, id, "user").await?;

    if patch.touches_profile() || !patch.touches_admin_fields() {
        authorize(caller, Action::Update, &ResourceRef::owned_unlocked(current.id))?;
    }
    if patch.touches_admin_fields() {
        require_admin(caller)?;
    }

    let mut am: user::ActiveModel = current.clone().into();
    if let Some(email) = patch.email.as_deref() {
        let email = normalize_email(email);
        user::validate_email(&email)?;
        if email != current.email {
            let clash = user::Entity::find().filter(user::Column::Email.eq(email.clone())).one(&txn).await?;
            if clash.is_some() {
                return Err(ServiceError::conflict("email or username already registered"));
            }
        }
        am.email = Set(email);
    }
    if let Some(v) = patch.first_name.as_deref() {
        user::validate_name("first_name", v)?;
        am.first_name = Set(v.trim().to_string());
    }
    if let Some(v) = patch.last_name.as_deref() {
        user::validate_name("last_name", v)?;
        am.last_name = Set(v.trim().to_string());
    }
    if let Some(p) = patch.password.as_deref() {
        user::validate_password(p)?;
        am.password_hash = Set(hash_password(p)?);
    }
    if let Some(role) = patch.role {
        am.role = Set(role);
    }
    if let Some(active) = patch.is_active {
        am.is_active = Set(active);
    }

    if !am.is_changed() {
        txn.commit().await?;
        return Ok(current);
    }
    am.updated_at = Set(store::now());
    let updated = am.update(&txn).await.map_err(map_unique)?;
    txn.commit().await?;
    info!(user_id = %updated.id, role = %updated.role, active = updated.is_active, "user_updated");
    Ok(updated)
}

pub async fn delete_user(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    require_admin(caller)?;
    let txn = db.begin().await?;
    let current = find_for_update::<user::Entity, _>(&txn, id, "user").await?;
    user::Entity::delete_by_id(current.id).exec(&txn).await?;
    txn.commit().await?;
    info!(user_id = %id, "user_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::DenyReason;
    use crate::test_support::{get_db, get_file_db, seed_user};

    fn new_user(name: &str, role: Option<UserRole>) -> NewUser {
        NewUser {
            email: format!("{name}@x.com"),
            username: name.into(),
            password: "Passw0rd!".into(),
            first_name: "First".into(),
            last_name: "Last".into(),
            role,
        }
    }

    #[tokio::test]
    async fn first_account_may_bootstrap_admin() -> anyhow::Result<()> {
        let db = get_db().await?;
        let admin = create_user(&db, None, new_user("root", Some(UserRole::Admin))).await?;
        assert_eq!(admin.role, UserRole::Admin);
        assert!(admin.password_hash.starts_with("$argon2"));

        let res = create_user(&db, None, new_user("boss", Some(UserRole::Manager))).await;
        assert!(matches!(res, Err(ServiceError::Unauthenticated(_))));

        let admin_caller = Caller::from(&admin);
        let m = create_user(&db, Some(&admin_caller), new_user("boss", Some(UserRole::Manager))).await?;
        assert_eq!(m.role, UserRole::Manager);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_bootstrap_yields_one_admin() -> anyhow::Result<()> {
        let (db, path) = get_file_db().await?;
        let (a, b) = tokio::join!(
            create_user(&db, None, new_user("root1", Some(UserRole::Admin))),
            create_user(&db, None, new_user("root2", Some(UserRole::Admin))),
        );
        let ok = [a.is_ok(), b.is_ok()].iter().filter(|x| **x).count();
        assert_eq!(ok, 1);
        assert!(matches!(a, Err(ServiceError::Unauthenticated(_))) || matches!(b, Err(ServiceError::Unauthenticated(_))));
        let admins = user::Entity::find().filter(user::Column::Role.eq(UserRole::Admin)).count(&db).await?;
        assert_eq!(admins, 1);
        db.close().await?;
        let _ = std::fs::remove_file(path);
        Ok(())
    }

    #[tokio::test]
    async fn employee_cannot_grant_roles() -> anyhow::Result<()> {
        let db = get_db().await?;
        let e = seed_user(&db, UserRole::Employee).await?;
        let res = create_user(&db, Some(&e), new_user("boss", Some(UserRole::Admin))).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::Role))));
        Ok(())
    }

    #[tokio::test]
    async fn duplicates_conflict_and_bad_input_is_rejected() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = create_user(&db, None, new_user("a", None)).await?;
        assert_eq!(a.role, UserRole::Employee);
        assert_eq!(a.email, "a@x.com");

        let dup_email = NewUser { username: "other".into(), ..new_user("a", None) };
        assert!(matches!(create_user(&db, None, dup_email).await, Err(ServiceError::Conflict(_))));
        let dup_name = NewUser { email: "other@x.com".into(), ..new_user("a", None) };
        assert!(matches!(create_user(&db, None, dup_name).await, Err(ServiceError::Conflict(_))));

        let short = NewUser { password: "short".into(), ..new_user("b", None) };
        assert!(create_user(&db, None, short).await.unwrap_err().is_validation());
        Ok(())
    }

    #[tokio::test]
    async fn self_service_profile_but_admin_only_role() -> anyhow::Result<()> {
        let db = get_db().await?;
        let e = seed_user(&db, UserRole::Employee).await?;

        let patch = UserPatch { first_name: Some("Jane".into()), ..Default::default() };
        let updated = update_user(&db, &e, e.id, patch).await?;
        assert_eq!(updated.first_name, "Jane");
        assert_eq!(updated.last_name, "User");

        let promote = UserPatch { role: Some(UserRole::Admin), ..Default::default() };
        let res = update_user(&db, &e, e.id, promote.clone()).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(DenyReason::Role))));

        let admin = seed_user(&db, UserRole::Admin).await?;
        let promoted = update_user(&db, &admin, e.id, promote).await?;
        assert_eq!(promoted.role, UserRole::Admin);
        Ok(())
    }

    #[tokio::test]
    async fn users_cannot_edit_or_read_each_other() -> anyhow::Result<()> {
        let db = get_db().await?;
        let a = seed_user(&db, UserRole::Employee).await?;
        let b = seed_user(&db, UserRole::Employee).await?;
        let m = seed_user(&db, UserRole::Manager).await?;

        assert!(matches!(get_user(&db, &a, b.id).await, Err(ServiceError::Forbidden(DenyReason::NotOwner))));
        assert_eq!(get_user(&db, &m, b.id).await?.id, b.id);

        let patch = UserPatch { last_name: Some("X".into()), ..Default::default() };
        assert!(matches!(update_user(&db, &m, b.id, patch).await, Err(ServiceError::Forbidden(DenyReason::NotOwner))));

        assert!(matches!(list_users(&db, &a, Page { offset: 0, limit: 10 }).await, Err(ServiceError::Forbidden(_))));
        assert_eq!(list_users(&db, &m, Page { offset: 0, limit: 10 }).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn empty_patch_returns_record_unchanged() -> anyhow::Result<()> {
        let db = get_db().await?;
        let e = seed_user(&db, UserRole::Employee).await?;
        let before = me(&db, &e).await?;
        let after = update_user(&db, &e, e.id, UserPatch::default()).await?;
        assert_eq!(before, after);
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_admin_only() -> anyhow::Result<()> {
        let db = get_db().await?;
        let e = seed_user(&db, UserRole::Employee).await?;
        let admin = seed_user(&db, UserRole::Admin).await?;
        assert!(matches!(delete_user(&db, &e, e.id).await, Err(ServiceError::Forbidden(DenyReason::Role))));
        delete_user(&db, &admin, e.id).await?;
        assert!(matches!(get_user(&db, &admin, e.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
