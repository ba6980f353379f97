//! Create `expenses` table with FK to `users`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(uuid(Expenses::Id).primary_key())
                    .col(uuid(Expenses::UserId).not_null())
                    .col(double(Expenses::Amount).not_null())
                    .col(string_len(Expenses::Category, 64).not_null())
                    .col(text(Expenses::Description).not_null())
                    .col(string_len(Expenses::Status, 16).not_null())
                    .col(ColumnDef::new(Expenses::ReceiptUrl).string_len(512).null())
                    .col(timestamp_with_time_zone(Expenses::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Expenses::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenses_user")
                            .from(Expenses::Table, Expenses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Expenses::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Expenses { Table, Id, UserId, Amount, Category, Description, Status, ReceiptUrl, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
