//! Create `education_activities` and the `activity_registrations` join table.
//!
//! Registrations reference both the activity and the registering user.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EducationActivities::Table)
                    .if_not_exists()
                    .col(uuid(EducationActivities::Id).primary_key())
                    .col(string_len(EducationActivities::Title, 255).not_null())
                    .col(text(EducationActivities::Description).not_null())
                    .col(timestamp_with_time_zone(EducationActivities::StartDate).not_null())
                    .col(timestamp_with_time_zone(EducationActivities::EndDate).not_null())
                    .col(string_len(EducationActivities::Location, 255).not_null())
                    .col(ColumnDef::new(EducationActivities::Capacity).integer().null())
                    .col(timestamp_with_time_zone(EducationActivities::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(EducationActivities::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActivityRegistrations::Table)
                    .if_not_exists()
                    .col(uuid(ActivityRegistrations::Id).primary_key())
                    .col(uuid(ActivityRegistrations::ActivityId).not_null())
                    .col(uuid(ActivityRegistrations::UserId).not_null())
                    .col(string_len(ActivityRegistrations::Status, 16).not_null())
                    .col(timestamp_with_time_zone(ActivityRegistrations::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ActivityRegistrations::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_registrations_activity")
                            .from(ActivityRegistrations::Table, ActivityRegistrations::ActivityId)
                            .to(EducationActivities::Table, EducationActivities::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_registrations_user")
                            .from(ActivityRegistrations::Table, ActivityRegistrations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ActivityRegistrations::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(EducationActivities::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum EducationActivities { Table, Id, Title, Description, StartDate, EndDate, Location, Capacity, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum ActivityRegistrations { Table, Id, ActivityId, UserId, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
