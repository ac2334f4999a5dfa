use lending_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000005_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(withdrawals::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(withdrawals::Column::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(withdrawals::Column::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawals::Column::Amount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawals::Column::PhoneNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawals::Column::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawals::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(withdrawals::Column::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(withdrawals::Entity).to_owned())
            .await
    }
}
