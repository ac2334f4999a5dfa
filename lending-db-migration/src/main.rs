use figment::{
    providers::{Format, Toml},
    Figment,
};
use lending_db_migration::Migrator;
use sea_orm_migration::MigratorTrait;
use serde::Deserialize;

#[derive(Deserialize)]
struct MigrationConfig {
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config: MigrationConfig = Figment::new().merge(Toml::file("App.toml")).extract()?;
    let db = sea_orm_migration::sea_orm::Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;
    Ok(())
}
