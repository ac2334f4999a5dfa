use lending_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000001_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(loan_applications::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(loan_applications::Column::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::FullName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::IdNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::WhatsappNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::ContactPersonName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::ContactPersonPhone)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::NextOfKinName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::NextOfKinContact)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::Occupation)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::EmploymentStatus)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::IncomeLevel)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(loan_applications::Column::LoanReason).string())
                    .col(
                        ColumnDef::new(loan_applications::Column::LoanLimit)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_applications::Column::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(loan_applications::Entity).to_owned())
            .await
    }
}
