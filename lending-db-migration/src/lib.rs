pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_table;
mod m20250301_000002_create_table;
mod m20250301_000003_create_table;
mod m20250301_000004_create_table;
mod m20250301_000005_create_table;
mod m20250301_000006_create_table;
mod m20250301_000007_create_table;
mod m20250510_000001_create_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_table::Migration),
            Box::new(m20250301_000002_create_table::Migration),
            Box::new(m20250301_000003_create_table::Migration),
            Box::new(m20250301_000004_create_table::Migration),
            Box::new(m20250301_000005_create_table::Migration),
            Box::new(m20250301_000006_create_table::Migration),
            Box::new(m20250301_000007_create_table::Migration),
            Box::new(m20250510_000001_create_table::Migration),
        ]
    }
}
