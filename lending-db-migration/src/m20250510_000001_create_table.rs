use lending_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250510_000001_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(password_reset_codes::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(password_reset_codes::Column::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(password_reset_codes::Column::PhoneNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(password_reset_codes::Column::Code)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(password_reset_codes::Column::ExpiresAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(password_reset_codes::Column::Used)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(password_reset_codes::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(password_reset_codes::Entity).to_owned())
            .await
    }
}
