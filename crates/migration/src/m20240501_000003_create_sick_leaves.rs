//! Create `sick_leaves` table with FK to `users`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SickLeaves::Table)
                    .if_not_exists()
                    .col(uuid(SickLeaves::Id).primary_key())
                    .col(uuid(SickLeaves::UserId).not_null())
                    .col(timestamp_with_time_zone(SickLeaves::StartDate).not_null())
                    .col(timestamp_with_time_zone(SickLeaves::EndDate).not_null())
                    .col(text(SickLeaves::Reason).not_null())
                    .col(string_len(SickLeaves::Status, 16).not_null())
                    .col(ColumnDef::new(SickLeaves::DocumentUrl).string_len(512).null())
                    .col(timestamp_with_time_zone(SickLeaves::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(SickLeaves::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sick_leaves_user")
                            .from(SickLeaves::Table, SickLeaves::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SickLeaves::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SickLeaves { Table, Id, UserId, StartDate, EndDate, Reason, Status, DocumentUrl, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
