pub use sea_orm_migration::prelude::*;

mod m20260301_000000_customers;
mod m20260301_000100_budgets;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000000_customers::Migration),
            Box::new(m20260301_000100_budgets::Migration),
        ]
    }
}
