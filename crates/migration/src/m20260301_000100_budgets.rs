//! Budgets (price quotes) of a tenant.
//!
//! `budget_number` is unique per tenant: the allocator relies on this index
//! to detect two writers that picked the same number.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    TenantId,
    BudgetNumber,
    Title,
    CustomerId,
    SubtotalMinor,
    DiscountPercent,
    DiscountMinor,
    DiscountType,
    FinalMinor,
    ProjectName,
    Details,
    PaymentTerms,
    DeliveryDeadline,
    Observations,
    Status,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Budgets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Budgets::TenantId).string().not_null())
                    .col(ColumnDef::new(Budgets::BudgetNumber).string().not_null())
                    .col(ColumnDef::new(Budgets::Title).string().not_null())
                    // No foreign key: deleting a customer leaves its budgets alone.
                    .col(ColumnDef::new(Budgets::CustomerId).string())
                    .col(
                        ColumnDef::new(Budgets::SubtotalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Budgets::DiscountPercent).double())
                    .col(ColumnDef::new(Budgets::DiscountMinor).big_integer())
                    .col(ColumnDef::new(Budgets::DiscountType).string())
                    .col(ColumnDef::new(Budgets::FinalMinor).big_integer().not_null())
                    .col(ColumnDef::new(Budgets::ProjectName).string())
                    .col(ColumnDef::new(Budgets::Details).text())
                    .col(ColumnDef::new(Budgets::PaymentTerms).text())
                    .col(ColumnDef::new(Budgets::DeliveryDeadline).string())
                    .col(ColumnDef::new(Budgets::Observations).text())
                    .col(
                        ColumnDef::new(Budgets::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Budgets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-tenant_id")
                    .table(Budgets::Table)
                    .col(Budgets::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-budgets-tenant_id-budget_number")
                    .table(Budgets::Table)
                    .col(Budgets::TenantId)
                    .col(Budgets::BudgetNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await
    }
}
