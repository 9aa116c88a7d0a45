use chrono::{DateTime, Datelike, Utc};
use chrono_tz::{America::Sao_Paulo, Tz};
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;

use crate::ResultEngine;

mod access;
mod budgets;
mod customers;

pub use budgets::BudgetSnapshot;

/// Attempts made to allocate a budget number before giving up.
pub const ALLOCATION_ATTEMPTS: u32 = 3;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Source of the current time; budget years and creation stamps come from it.
pub type Clock = fn() -> DateTime<Utc>;

/// Customer and budget registries over one database.
///
/// Every method takes the caller's [`TenantId`](crate::TenantId) and only
/// ever sees rows owned by it.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    clock: Clock,
    timezone: Tz,
    allocation: Mutex<()>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Current time as seen by the engine.
    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Year used for budget numbers allocated right now.
    pub fn current_year(&self) -> i32 {
        self.year_at(self.now())
    }

    /// Calendar year of `at` in the workshop's timezone.
    pub fn year_at(&self, at: DateTime<Utc>) -> i32 {
        at.with_timezone(&self.timezone).year()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    clock: Option<Clock>,
    timezone: Option<Tz>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the wall clock (tests pin the year with it).
    pub fn clock(mut self, clock: Clock) -> EngineBuilder {
        self.clock = Some(clock);
        self
    }

    /// Timezone that decides the budget year, `America/Sao_Paulo` by default.
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = Some(timezone);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            clock: self.clock.unwrap_or(Utc::now),
            timezone: self.timezone.unwrap_or(Sao_Paulo),
            allocation: Mutex::new(()),
        })
    }
}
