//! Create `assets` and `asset_bookings`.
//!
//! Bookings hold a half-open `[start_time, end_time)` window on one asset.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(uuid(Assets::Id).primary_key())
                    .col(string_len(Assets::Name, 255).not_null())
                    .col(text(Assets::Description).not_null())
                    .col(string_len(Assets::Category, 64).not_null())
                    .col(string_len(Assets::Location, 255).not_null())
                    .col(boolean(Assets::IsAvailable).not_null())
                    .col(timestamp_with_time_zone(Assets::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Assets::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AssetBookings::Table)
                    .if_not_exists()
                    .col(uuid(AssetBookings::Id).primary_key())
                    .col(uuid(AssetBookings::AssetId).not_null())
                    .col(uuid(AssetBookings::UserId).not_null())
                    .col(timestamp_with_time_zone(AssetBookings::StartTime).not_null())
                    .col(timestamp_with_time_zone(AssetBookings::EndTime).not_null())
                    .col(text(AssetBookings::Purpose).not_null())
                    .col(string_len(AssetBookings::Status, 16).not_null())
                    .col(timestamp_with_time_zone(AssetBookings::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(AssetBookings::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_bookings_asset")
                            .from(AssetBookings::Table, AssetBookings::AssetId)
                            .to(Assets::Table, Assets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_bookings_user")
                            .from(AssetBookings::Table, AssetBookings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AssetBookings::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Assets::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Assets { Table, Id, Name, Description, Category, Location, IsAvailable, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum AssetBookings { Table, Id, AssetId, UserId, StartTime, EndTime, Purpose, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
