//! Create `maintenance_issues` with FK to the reporting user.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceIssues::Table)
                    .if_not_exists()
                    .col(uuid(MaintenanceIssues::Id).primary_key())
                    .col(uuid(MaintenanceIssues::ReporterId).not_null())
                    .col(string_len(MaintenanceIssues::Title, 255).not_null())
                    .col(text(MaintenanceIssues::Description).not_null())
                    .col(string_len(MaintenanceIssues::Location, 255).not_null())
                    .col(string_len(MaintenanceIssues::Priority, 32).not_null())
                    .col(string_len(MaintenanceIssues::Status, 32).not_null())
                    .col(ColumnDef::new(MaintenanceIssues::ImageUrl).string_len(512).null())
                    .col(timestamp_with_time_zone(MaintenanceIssues::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(MaintenanceIssues::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_issues_reporter")
                            .from(MaintenanceIssues::Table, MaintenanceIssues::ReporterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MaintenanceIssues::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MaintenanceIssues { Table, Id, ReporterId, Title, Description, Location, Priority, Status, ImageUrl, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
