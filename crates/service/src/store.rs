//! Query helpers shared by the entity services.

use models::RequestStatus;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, PrimaryKeyTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, Statement,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::Page;

/// Load a row by id with `SELECT ... FOR UPDATE` so the rest of the
/// transaction works on a record no concurrent writer can change.
pub(crate) async fn find_for_update<E, C>(conn: &C, id: Uuid, entity: &str) -> Result<E::Model, ServiceError>
where
    E: EntityTrait,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
    C: ConnectionTrait,
{
    E::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found(entity))
}

/// Block other writers of `table` until the transaction ends.
///
/// SQLite pools hold a single connection, so transactions there are
/// already serialized and no statement is issued.
pub(crate) async fn lock_table<C: ConnectionTrait>(conn: &C, table: &str) -> Result<(), ServiceError> {
    if conn.get_database_backend() == DbBackend::Postgres {
        conn.execute(Statement::from_string(DbBackend::Postgres, format!("LOCK TABLE {table} IN EXCLUSIVE MODE")))
            .await?;
    }
    Ok(())
}

pub(crate) async fn find_one<E, C>(conn: &C, id: Uuid, entity: &str) -> Result<E::Model, ServiceError>
where
    E: EntityTrait,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = Uuid>,
    C: ConnectionTrait,
{
    E::find_by_id(id).one(conn).await?.ok_or_else(|| ServiceError::not_found(entity))
}

/// Newest first, windowed by `page`.
pub(crate) fn page<E: EntityTrait>(select: Select<E>, created_at: E::Column, page: Page) -> Select<E> {
    select.order_by_desc(created_at).offset(page.offset).limit(page.limit)
}

pub(crate) fn with_status<E: EntityTrait>(
    select: Select<E>,
    column: E::Column,
    status: Option<RequestStatus>,
) -> Select<E> {
    match status {
        Some(s) => select.filter(column.eq(s)),
        None => select,
    }
}

pub(crate) fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    chrono::Utc::now().into()
}

/// Store timestamps in UTC so text-backed stores compare them correctly.
pub(crate) fn utc(t: sea_orm::prelude::DateTimeWithTimeZone) -> sea_orm::prelude::DateTimeWithTimeZone {
    t.with_timezone(&chrono::Utc).into()
}
