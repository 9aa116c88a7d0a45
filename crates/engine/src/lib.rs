//! Domain core of the workshop back office.
//!
//! Customers and budgets are always read and written on behalf of a
//! [`TenantId`]. Budgets get a `YYYY-NNN` number allocated per tenant and
//! year by [`Engine::create_budget`].

pub use budgets::{Budget, BudgetStatus, BudgetText, DiscountType};
pub use commands::{BudgetNew, BudgetPatch, CustomerNew, CustomerPatch};
pub use customers::{Address, Customer};
pub use error::EngineError;
pub use money::MoneyCents;
pub use numbering::BudgetNumber;
pub use ops::{ALLOCATION_ATTEMPTS, BudgetSnapshot, Clock, Engine, EngineBuilder};
pub use tax_id::{PersonType, TaxId, is_valid_individual, is_valid_organization};
pub use tenant::TenantId;

pub mod budgets;
mod commands;
pub mod customers;
mod error;
mod money;
mod numbering;
mod ops;
mod tax_id;
mod tenant;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
