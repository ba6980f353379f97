use std::time::Duration;

use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

pub fn is_sqlite(url: &str) -> bool {
    url.trim().to_lowercase().starts_with("sqlite:")
}

/// Pool bounds actually used for `cfg`.
///
/// SQLite ignores `FOR UPDATE`, and a deferred transaction that reads before
/// it writes fails with `SQLITE_BUSY` when another connection holds the write
/// lock. A single pooled connection keeps every transaction strictly serial.
pub fn pool_bounds(cfg: &DatabaseConfig) -> (u32, u32) {
    if is_sqlite(&cfg.url) {
        (1, 1)
    } else {
        (cfg.max_connections, cfg.min_connections)
    }
}

/// Open a pooled connection using the validated database section of `AppConfig`.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let (max_connections, min_connections) = pool_bounds(cfg);
    if max_connections != cfg.max_connections {
        warn!(configured = cfg.max_connections, "sqlite pool pinned to one connection");
    }
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opt).await?;
    info!(max_connections, min_connections, "database pool ready");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(url: &str) -> DatabaseConfig {
        DatabaseConfig { url: url.into(), max_connections: 8, min_connections: 2, ..DatabaseConfig::default() }
    }

    #[test]
    fn sqlite_pool_is_single_connection() {
        assert_eq!(pool_bounds(&cfg("sqlite://data/staffhub.db?mode=rwc")), (1, 1));
        assert_eq!(pool_bounds(&cfg("SQLITE::memory:")), (1, 1));
    }

    #[test]
    fn postgres_pool_follows_config() {
        assert_eq!(pool_bounds(&cfg("postgres://u:p@localhost/staffhub")), (8, 2));
    }
}
