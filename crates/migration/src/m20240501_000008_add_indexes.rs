//! Secondary indexes for owner lookups, status filters and the
//! booking overlap / registration capacity checks.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_expenses_user")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_expenses_status")
                    .table(Expenses::Table)
                    .col(Expenses::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_sick_leaves_user")
                    .table(SickLeaves::Table)
                    .col(SickLeaves::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_registrations_activity_status")
                    .table(ActivityRegistrations::Table)
                    .col(ActivityRegistrations::ActivityId)
                    .col(ActivityRegistrations::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_registrations_user")
                    .table(ActivityRegistrations::Table)
                    .col(ActivityRegistrations::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_asset_bookings_asset_window")
                    .table(AssetBookings::Table)
                    .col(AssetBookings::AssetId)
                    .col(AssetBookings::StartTime)
                    .col(AssetBookings::EndTime)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_asset_bookings_user")
                    .table(AssetBookings::Table)
                    .col(AssetBookings::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_issues_reporter")
                    .table(MaintenanceIssues::Table)
                    .col(MaintenanceIssues::ReporterId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_travel_requests_user")
                    .table(TravelRequests::Table)
                    .col(TravelRequests::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_travel_bookings_request")
                    .table(TravelBookings::Table)
                    .col(TravelBookings::TravelRequestId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_expenses_user").table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_expenses_status").table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_sick_leaves_user").table(SickLeaves::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_registrations_activity_status").table(ActivityRegistrations::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_registrations_user").table(ActivityRegistrations::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_asset_bookings_asset_window").table(AssetBookings::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_asset_bookings_user").table(AssetBookings::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_maintenance_issues_reporter").table(MaintenanceIssues::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_travel_requests_user").table(TravelRequests::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_travel_bookings_request").table(TravelBookings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Expenses { Table, UserId, Status }

#[derive(DeriveIden)]
enum SickLeaves { Table, UserId }

#[derive(DeriveIden)]
enum ActivityRegistrations { Table, ActivityId, Status, UserId }

#[derive(DeriveIden)]
enum AssetBookings { Table, AssetId, StartTime, EndTime, UserId }

#[derive(DeriveIden)]
enum MaintenanceIssues { Table, ReporterId }

#[derive(DeriveIden)]
enum TravelRequests { Table, UserId }

#[derive(DeriveIden)]
enum TravelBookings { Table, TravelRequestId }
