use lending_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000003_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(savings_deposits::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(savings_deposits::Column::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(savings_deposits::Column::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(savings_deposits::Column::Amount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(savings_deposits::Column::MpesaMessage)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(savings_deposits::Column::TransactionCode).string())
                    .col(
                        ColumnDef::new(savings_deposits::Column::Verified)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(savings_deposits::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(savings_deposits::Entity).to_owned())
            .await
    }
}
