use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Budget, BudgetNew, BudgetNumber, BudgetPatch, BudgetText, Customer, EngineError, MoneyCents,
    ResultEngine, TenantId, budgets,
    util::{
        apply_optional_text_patch, ensure_non_negative, is_write_conflict,
        normalize_optional_text, normalize_required_text, validate_discount_percent,
    },
};

use super::{ALLOCATION_ATTEMPTS, Engine, with_tx};

/// A budget together with the customer it links, read in one transaction.
///
/// `customer` is `None` when the budget has no link or the linked customer
/// has since been deleted.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetSnapshot {
    pub budget: Budget,
    pub customer: Option<Customer>,
}

fn normalize_text(text: &BudgetText) -> BudgetText {
    BudgetText {
        project_name: normalize_optional_text(text.project_name.as_deref()),
        details: normalize_optional_text(text.details.as_deref()),
        payment_terms: normalize_optional_text(text.payment_terms.as_deref()),
        delivery_deadline: normalize_optional_text(text.delivery_deadline.as_deref()),
        observations: normalize_optional_text(text.observations.as_deref()),
    }
}

fn patch_text(existing: BudgetText, patch: &BudgetText) -> BudgetText {
    BudgetText {
        project_name: apply_optional_text_patch(
            existing.project_name,
            patch.project_name.as_deref(),
        ),
        details: apply_optional_text_patch(existing.details, patch.details.as_deref()),
        payment_terms: apply_optional_text_patch(
            existing.payment_terms,
            patch.payment_terms.as_deref(),
        ),
        delivery_deadline: apply_optional_text_patch(
            existing.delivery_deadline,
            patch.delivery_deadline.as_deref(),
        ),
        observations: apply_optional_text_patch(
            existing.observations,
            patch.observations.as_deref(),
        ),
    }
}

fn validate_amounts(
    subtotal: Option<MoneyCents>,
    final_amount: Option<MoneyCents>,
    discount_amount: Option<MoneyCents>,
    discount_percent: Option<f64>,
) -> ResultEngine<()> {
    if let Some(subtotal) = subtotal {
        ensure_non_negative(subtotal, "subtotal")?;
    }
    if let Some(final_amount) = final_amount {
        ensure_non_negative(final_amount, "final amount")?;
    }
    if let Some(discount) = discount_amount {
        ensure_non_negative(discount, "discount amount")?;
    }
    validate_discount_percent(discount_percent)
}

impl Engine {
    /// Creates a budget for `tenant` and gives it the next number of the
    /// current year.
    ///
    /// Numbers are allocated and inserted in the same transaction; the unique
    /// index on `(tenant_id, budget_number)` catches a concurrent writer that
    /// picked the same number, in which case the whole insert is retried.
    /// Writers sharing this `Engine` take turns, so only other processes on
    /// the same database can race it.
    /// After [`ALLOCATION_ATTEMPTS`] failed attempts the call fails with
    /// [`EngineError::AllocationConflict`] and nothing is written.
    pub async fn create_budget(&self, tenant: &TenantId, cmd: BudgetNew) -> ResultEngine<Budget> {
        let title = normalize_required_text(&cmd.title, "budget title")?;
        validate_amounts(
            Some(cmd.subtotal),
            Some(cmd.final_amount),
            cmd.discount_amount,
            cmd.discount_percent,
        )?;

        let now = self.now();
        let _turn = self.allocation.lock().await;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.insert_budget(tenant, &title, &cmd, now).await {
                Ok(budget) => return Ok(budget),
                Err(EngineError::Database(err)) if is_write_conflict(&err) => {
                    if attempt >= ALLOCATION_ATTEMPTS {
                        tracing::error!(
                            tenant = %tenant,
                            attempts = attempt,
                            "giving up on budget number allocation: {err}"
                        );
                        return Err(EngineError::AllocationConflict(attempt));
                    }
                    tracing::warn!(
                        tenant = %tenant,
                        attempt,
                        "budget number taken by a concurrent writer, retrying: {err}"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn insert_budget(
        &self,
        tenant: &TenantId,
        title: &str,
        cmd: &BudgetNew,
        now: DateTime<Utc>,
    ) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            if let Some(customer_id) = cmd.customer_id {
                self.require_customer_model(&db_tx, tenant, customer_id)
                    .await?;
            }
            let number = self.allocate_number(&db_tx, tenant, self.year_at(now)).await?;

            let budget = Budget {
                id: Uuid::new_v4(),
                number,
                title: title.to_string(),
                customer_id: cmd.customer_id,
                subtotal: cmd.subtotal,
                discount_percent: cmd.discount_percent,
                discount_amount: cmd.discount_amount,
                discount_type: cmd.discount_type,
                final_amount: cmd.final_amount,
                text: normalize_text(&cmd.text),
                status: cmd.status.unwrap_or_default(),
                created_at: now,
            };

            let mut model: budgets::ActiveModel = (&budget).into();
            model.tenant_id = ActiveValue::Set(tenant.as_str().to_string());
            model.insert(&db_tx).await?;
            Ok(budget)
        })
    }

    /// Next free number of `year` for `tenant`, as seen from `db`.
    ///
    /// Sorting by length first keeps `2026-1000` above `2026-999`.
    async fn allocate_number(
        &self,
        db: &DatabaseTransaction,
        tenant: &TenantId,
        year: i32,
    ) -> ResultEngine<BudgetNumber> {
        let last = budgets::Entity::find()
            .filter(budgets::Column::TenantId.eq(tenant.as_str()))
            .filter(budgets::Column::BudgetNumber.starts_with(BudgetNumber::year_prefix(year)))
            .order_by_desc(Expr::cust("LENGTH(budget_number)"))
            .order_by_desc(budgets::Column::BudgetNumber)
            .one(db)
            .await?;

        let last = last
            .map(|model| model.budget_number.parse::<BudgetNumber>())
            .transpose()?;
        BudgetNumber::next_after(year, last.as_ref())
    }

    /// The number the next budget of `tenant` would get right now. Nothing is
    /// reserved: a concurrent create may take it first.
    pub async fn next_budget_number(&self, tenant: &TenantId) -> ResultEngine<BudgetNumber> {
        let year = self.current_year();
        with_tx!(self, |db_tx| {
            self.allocate_number(&db_tx, tenant, year).await
        })
    }

    /// Every budget of `tenant`, newest first.
    pub async fn list_budgets(&self, tenant: &TenantId) -> ResultEngine<Vec<Budget>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::TenantId.eq(tenant.as_str()))
            .order_by_desc(budgets::Column::CreatedAt)
            .order_by_desc(budgets::Column::BudgetNumber)
            .all(&self.database)
            .await?;

        models.into_iter().map(Budget::try_from).collect()
    }

    /// Budgets of `tenant` created in `[from, to)`, oldest first.
    pub async fn list_budgets_created_between(
        &self,
        tenant: &TenantId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ResultEngine<Vec<Budget>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::TenantId.eq(tenant.as_str()))
            .filter(budgets::Column::CreatedAt.gte(from))
            .filter(budgets::Column::CreatedAt.lt(to))
            .order_by_asc(budgets::Column::CreatedAt)
            .order_by_asc(budgets::Column::BudgetNumber)
            .all(&self.database)
            .await?;

        models.into_iter().map(Budget::try_from).collect()
    }

    pub async fn budget(&self, tenant: &TenantId, budget_id: Uuid) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget_model(&db_tx, tenant, budget_id).await?;
            Budget::try_from(model)
        })
    }

    /// Budget plus linked customer, for document rendering.
    pub async fn budget_snapshot(
        &self,
        tenant: &TenantId,
        budget_id: Uuid,
    ) -> ResultEngine<BudgetSnapshot> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget_model(&db_tx, tenant, budget_id).await?;
            let budget = Budget::try_from(model)?;
            let customer = match budget.customer_id {
                Some(customer_id) => self
                    .find_customer_model(&db_tx, tenant, customer_id)
                    .await?
                    .map(Customer::try_from)
                    .transpose()?,
                None => None,
            };
            Ok(BudgetSnapshot { budget, customer })
        })
    }

    /// Applies a partial update. The number, tenant, id and creation time
    /// never change.
    pub async fn update_budget(
        &self,
        tenant: &TenantId,
        budget_id: Uuid,
        patch: BudgetPatch,
    ) -> ResultEngine<Budget> {
        let title = patch
            .title
            .as_deref()
            .map(|title| normalize_required_text(title, "budget title"))
            .transpose()?;
        validate_amounts(
            patch.subtotal,
            patch.final_amount,
            patch.discount_amount.flatten(),
            patch.discount_percent.flatten(),
        )?;

        with_tx!(self, |db_tx| {
            let model = self.require_budget_model(&db_tx, tenant, budget_id).await?;
            let existing = Budget::try_from(model)?;
            if let Some(Some(customer_id)) = patch.customer_id {
                self.require_customer_model(&db_tx, tenant, customer_id)
                    .await?;
            }

            let updated = Budget {
                id: existing.id,
                number: existing.number,
                title: title.unwrap_or(existing.title),
                customer_id: patch.customer_id.unwrap_or(existing.customer_id),
                subtotal: patch.subtotal.unwrap_or(existing.subtotal),
                discount_percent: patch.discount_percent.unwrap_or(existing.discount_percent),
                discount_amount: patch.discount_amount.unwrap_or(existing.discount_amount),
                discount_type: patch.discount_type.unwrap_or(existing.discount_type),
                final_amount: patch.final_amount.unwrap_or(existing.final_amount),
                text: patch_text(existing.text, &patch.text),
                status: patch.status.unwrap_or(existing.status),
                created_at: existing.created_at,
            };

            let mut active: budgets::ActiveModel = (&updated).into();
            active.budget_number = ActiveValue::NotSet;
            active.created_at = ActiveValue::NotSet;
            active.update(&db_tx).await?;
            Ok(updated)
        })
    }

    /// Hard-deletes a budget of `tenant`. Missing ids are not an error; the
    /// return value tells whether a row was removed.
    pub async fn delete_budget(&self, tenant: &TenantId, budget_id: Uuid) -> ResultEngine<bool> {
        with_tx!(self, |db_tx| {
            let result = budgets::Entity::delete_many()
                .filter(budgets::Column::Id.eq(budget_id.to_string()))
                .filter(budgets::Column::TenantId.eq(tenant.as_str()))
                .exec(&db_tx)
                .await?;
            Ok(result.rows_affected > 0)
        })
    }
}
