//! Budget API endpoints

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use engine::{
    Budget, BudgetNew, BudgetPatch, BudgetStatus, BudgetText, DiscountType, MoneyCents, TenantId,
};
use uuid::Uuid;

use api_types::budget::{
    BudgetNew as BudgetNewBody, BudgetStatus as BudgetStatusView, BudgetUpdate, BudgetView,
    DiscountType as DiscountTypeView,
};

use crate::{ServerError, server::ServerState};

fn status(value: BudgetStatusView) -> BudgetStatus {
    match value {
        BudgetStatusView::Draft => BudgetStatus::Draft,
        BudgetStatusView::Approved => BudgetStatus::Approved,
        BudgetStatusView::Rejected => BudgetStatus::Rejected,
    }
}

fn status_view(value: BudgetStatus) -> BudgetStatusView {
    match value {
        BudgetStatus::Draft => BudgetStatusView::Draft,
        BudgetStatus::Approved => BudgetStatusView::Approved,
        BudgetStatus::Rejected => BudgetStatusView::Rejected,
    }
}

fn discount_type(value: DiscountTypeView) -> DiscountType {
    match value {
        DiscountTypeView::Percentage => DiscountType::Percentage,
        DiscountTypeView::Amount => DiscountType::Amount,
    }
}

fn discount_type_view(value: DiscountType) -> DiscountTypeView {
    match value {
        DiscountType::Percentage => DiscountTypeView::Percentage,
        DiscountType::Amount => DiscountTypeView::Amount,
    }
}

fn money(value: Option<f64>) -> Result<Option<MoneyCents>, ServerError> {
    Ok(value.map(MoneyCents::try_from_major).transpose()?)
}

pub(crate) fn budget_view(budget: Budget) -> BudgetView {
    let BudgetText {
        project_name,
        details,
        payment_terms,
        delivery_deadline,
        observations,
    } = budget.text;

    BudgetView {
        id: budget.id,
        budget_number: budget.number.to_string(),
        title: budget.title,
        customer_id: budget.customer_id,
        subtotal_amount: budget.subtotal.to_major(),
        discount_percent: budget.discount_percent,
        discount_amount: budget.discount_amount.map(MoneyCents::to_major),
        discount_type: budget.discount_type.map(discount_type_view),
        final_amount: budget.final_amount.to_major(),
        project_name,
        details,
        payment_terms,
        delivery_deadline,
        observations,
        status: status_view(budget.status),
        created_at: budget.created_at,
    }
}

/// Handle requests for listing the tenant's budgets, newest first
pub async fn list(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state.call(state.engine.list_budgets(&tenant)).await?;
    Ok(Json(budgets.into_iter().map(budget_view).collect()))
}

/// Handle requests for one `Budget`
pub async fn get(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<BudgetView>, ServerError> {
    let Path(id) = id?;
    let budget = state.call(state.engine.budget(&tenant, id)).await?;
    Ok(Json(budget_view(budget)))
}

/// Handle requests for creating new `Budget` with the next `YYYY-NNN` number
pub async fn create(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
    payload: Result<Json<BudgetNewBody>, JsonRejection>,
) -> Result<Json<BudgetView>, ServerError> {
    let Json(payload) = payload?;
    let cmd = BudgetNew {
        title: payload.title,
        customer_id: payload.customer_id,
        subtotal: MoneyCents::try_from_major(payload.subtotal_amount)?,
        discount_percent: payload.discount_percent,
        discount_amount: money(payload.discount_amount)?,
        discount_type: payload.discount_type.map(discount_type),
        final_amount: MoneyCents::try_from_major(payload.final_amount)?,
        text: BudgetText {
            project_name: payload.project_name,
            details: payload.details,
            payment_terms: payload.payment_terms,
            delivery_deadline: payload.delivery_deadline,
            observations: payload.observations,
        },
        status: payload.status.map(status),
    };

    let budget = state.call(state.engine.create_budget(&tenant, cmd)).await?;
    tracing::info!(tenant = %tenant, number = %budget.number, "budget created");
    Ok(Json(budget_view(budget)))
}

/// Handle requests for updating a `Budget`. The number and creation date never change
pub async fn update(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<BudgetUpdate>, JsonRejection>,
) -> Result<Json<BudgetView>, ServerError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let patch = BudgetPatch {
        title: payload.title,
        customer_id: payload.customer_id,
        subtotal: money(payload.subtotal_amount)?,
        discount_percent: payload.discount_percent,
        discount_amount: payload.discount_amount.map(money).transpose()?,
        discount_type: payload.discount_type.map(|kind| kind.map(discount_type)),
        final_amount: money(payload.final_amount)?,
        text: BudgetText {
            project_name: payload.project_name,
            details: payload.details,
            payment_terms: payload.payment_terms,
            delivery_deadline: payload.delivery_deadline,
            observations: payload.observations,
        },
        status: payload.status.map(status),
    };

    let budget = state
        .call(state.engine.update_budget(&tenant, id, patch))
        .await?;
    Ok(Json(budget_view(budget)))
}

/// Handle requests for deleting a `Budget`
pub async fn delete(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let Path(id) = id?;
    if state.call(state.engine.delete_budget(&tenant, id)).await? {
        tracing::info!(tenant = %tenant, budget = %id, "budget deleted");
    }
    Ok(StatusCode::NO_CONTENT)
}
