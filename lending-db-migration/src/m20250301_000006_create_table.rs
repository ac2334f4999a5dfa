use lending_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000006_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(support_requests::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(support_requests::Column::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(support_requests::Column::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(support_requests::Column::UserName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(support_requests::Column::UserEmail)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(support_requests::Column::Message)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(support_requests::Column::AdminReply).string())
                    .col(
                        ColumnDef::new(support_requests::Column::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(support_requests::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(support_requests::Column::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(support_requests::Entity).to_owned())
            .await
    }
}
