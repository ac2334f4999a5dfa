use lending_db_entity::db::*;
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250301_000002_create_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(loan_disbursements::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(loan_disbursements::Column::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(loan_disbursements::Column::ApplicationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_disbursements::Column::LoanAmount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_disbursements::Column::ProcessingFee)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_disbursements::Column::TransactionCode)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_disbursements::Column::PaymentVerified)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_disbursements::Column::Disbursed)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_disbursements::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(loan_disbursements::Column::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_loan_disbursements_transaction_code")
                    .table(loan_disbursements::Entity)
                    .col(loan_disbursements::Column::TransactionCode)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(loan_disbursements::Entity).to_owned())
            .await
    }
}
