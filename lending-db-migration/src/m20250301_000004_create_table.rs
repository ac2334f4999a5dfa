use lending_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000004_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(user_savings::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(user_savings::Column::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(user_savings::Column::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(user_savings::Column::Balance)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(user_savings::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(user_savings::Column::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // The verify-and-credit upsert targets ON CONFLICT (user_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_savings_user_id")
                    .table(user_savings::Entity)
                    .col(user_savings::Column::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(user_savings::Entity).to_owned())
            .await
    }
}
