//! Create `travel_requests` and their child `travel_bookings`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TravelRequests::Table)
                    .if_not_exists()
                    .col(uuid(TravelRequests::Id).primary_key())
                    .col(uuid(TravelRequests::UserId).not_null())
                    .col(string_len(TravelRequests::Destination, 255).not_null())
                    .col(text(TravelRequests::Purpose).not_null())
                    .col(timestamp_with_time_zone(TravelRequests::DepartureDate).not_null())
                    .col(timestamp_with_time_zone(TravelRequests::ReturnDate).not_null())
                    .col(double(TravelRequests::EstimatedCost).not_null())
                    .col(string_len(TravelRequests::Status, 16).not_null())
                    .col(timestamp_with_time_zone(TravelRequests::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(TravelRequests::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_travel_requests_user")
                            .from(TravelRequests::Table, TravelRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TravelBookings::Table)
                    .if_not_exists()
                    .col(uuid(TravelBookings::Id).primary_key())
                    .col(uuid(TravelBookings::TravelRequestId).not_null())
                    .col(string_len(TravelBookings::BookingType, 32).not_null())
                    .col(string_len(TravelBookings::Provider, 128).not_null())
                    .col(string_len(TravelBookings::BookingReference, 128).not_null())
                    .col(text(TravelBookings::Details).not_null())
                    .col(double(TravelBookings::Cost).not_null())
                    .col(timestamp_with_time_zone(TravelBookings::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(TravelBookings::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_travel_bookings_request")
                            .from(TravelBookings::Table, TravelBookings::TravelRequestId)
                            .to(TravelRequests::Table, TravelRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TravelBookings::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(TravelRequests::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TravelRequests { Table, Id, UserId, Destination, Purpose, DepartureDate, ReturnDate, EstimatedCost, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum TravelBookings { Table, Id, TravelRequestId, BookingType, Provider, BookingReference, Details, Cost, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
