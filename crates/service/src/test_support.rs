#![cfg(test)]
use chrono::Utc;
use migration::MigratorTrait;
use models::{user, UserRole};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

use crate::authz::Caller;

/// Fresh, fully migrated in-memory database for one test.
///
/// The pool holds a single connection: every connection to `sqlite::memory:`
/// is its own database.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Insert a user row directly and return it as a caller.
pub async fn seed_user(db: &DatabaseConnection, role: UserRole) -> Result<Caller, anyhow::Error> {
    let id = Uuid::new_v4();
    let tag = id.simple().to_string();
    let now = Utc::now();
    let m = user::ActiveModel {
        id: Set(id),
        email: Set(format!("{}@example.com", &tag[..12])),
        username: Set(format!("u{}", &tag[..12])),
        password_hash: Set(String::new()),
        first_name: Set("Test".into()),
        last_name: Set("User".into()),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok(Caller::from(&m))
}

pub fn pagination() -> configs::PaginationConfig {
    configs::PaginationConfig::default()
}

pub fn at(day: u32, hour: u32) -> sea_orm::prelude::DateTimeWithTimeZone {
    use chrono::TimeZone;
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap().into()
}

/// Migrated database in a temporary file, opened through the production
/// pool settings with several connections requested.
pub async fn get_file_db() -> Result<(DatabaseConnection, std::path::PathBuf), anyhow::Error> {
    let path = std::env::temp_dir().join(format!("staffhub-{}.db", Uuid::new_v4().simple()));
    let cfg = configs::DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 4,
        min_connections: 1,
        ..configs::DatabaseConfig::default()
    };
    let db = models::db::connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok((db, path))
}
