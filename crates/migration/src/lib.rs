//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240501_000001_create_users;
mod m20240501_000002_create_expenses;
mod m20240501_000003_create_sick_leaves;
mod m20240501_000004_create_education;
mod m20240501_000005_create_assets;
mod m20240501_000006_create_maintenance_issues;
mod m20240501_000007_create_travel;
mod m20240501_000008_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240501_000001_create_users::Migration),
            Box::new(m20240501_000002_create_expenses::Migration),
            Box::new(m20240501_000003_create_sick_leaves::Migration),
            Box::new(m20240501_000004_create_education::Migration),
            Box::new(m20240501_000005_create_assets::Migration),
            Box::new(m20240501_000006_create_maintenance_issues::Migration),
            Box::new(m20240501_000007_create_travel::Migration),
            // Indexes should always be applied last
            Box::new(m20240501_000008_add_indexes::Migration),
        ]
    }
}
