//! Customer API endpoints

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use engine::{Address, Customer, CustomerNew, CustomerPatch, PersonType, TenantId};
use uuid::Uuid;

use api_types::customer::{
    CustomerNew as CustomerNewBody, CustomerUpdate, CustomerView, PersonType as PersonTypeView,
};

use crate::{ServerError, server::ServerState};

fn person_type(value: PersonTypeView) -> PersonType {
    match value {
        PersonTypeView::Individual => PersonType::Individual,
        PersonTypeView::Organization => PersonType::Organization,
    }
}

fn person_type_view(value: PersonType) -> PersonTypeView {
    match value {
        PersonType::Individual => PersonTypeView::Individual,
        PersonType::Organization => PersonTypeView::Organization,
    }
}

pub(crate) fn customer_view(customer: Customer) -> CustomerView {
    let Address {
        street,
        number,
        complement,
        neighborhood,
        city,
        state,
        zip_code,
    } = customer.address;

    CustomerView {
        id: customer.id,
        name: customer.name,
        person_type: customer.person_type.map(person_type_view),
        tax_id: customer.tax_id.map(|tax_id| tax_id.digits().to_string()),
        phone: customer.phone,
        email: customer.email,
        street,
        number,
        complement,
        neighborhood,
        city,
        state,
        zip_code,
        notes: customer.notes,
        created_at: customer.created_at,
    }
}

/// Handle requests for listing the tenant's customers, sorted by name
pub async fn list(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CustomerView>>, ServerError> {
    let customers = state.call(state.engine.list_customers(&tenant)).await?;
    Ok(Json(customers.into_iter().map(customer_view).collect()))
}

/// Handle requests for one `Customer`
pub async fn get(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CustomerView>, ServerError> {
    let Path(id) = id?;
    let customer = state.call(state.engine.customer(&tenant, id)).await?;
    Ok(Json(customer_view(customer)))
}

/// Handle requests for creating new `Customer`
pub async fn create(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
    payload: Result<Json<CustomerNewBody>, JsonRejection>,
) -> Result<Json<CustomerView>, ServerError> {
    let Json(payload) = payload?;
    let cmd = CustomerNew {
        name: payload.name,
        person_type: payload.person_type.map(person_type),
        tax_id: payload.tax_id,
        phone: payload.phone,
        email: payload.email,
        address: Address {
            street: payload.street,
            number: payload.number,
            complement: payload.complement,
            neighborhood: payload.neighborhood,
            city: payload.city,
            state: payload.state,
            zip_code: payload.zip_code,
        },
        notes: payload.notes,
    };

    let customer = state.call(state.engine.create_customer(&tenant, cmd)).await?;
    tracing::info!(tenant = %tenant, customer = %customer.id, "customer created");
    Ok(Json(customer_view(customer)))
}

/// Handle requests for updating a `Customer`. Absent keys keep their value
pub async fn update(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CustomerUpdate>, JsonRejection>,
) -> Result<Json<CustomerView>, ServerError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let patch = CustomerPatch {
        name: payload.name,
        person_type: payload.person_type.map(person_type),
        tax_id: payload.tax_id,
        phone: payload.phone,
        email: payload.email,
        address: Address {
            street: payload.street,
            number: payload.number,
            complement: payload.complement,
            neighborhood: payload.neighborhood,
            city: payload.city,
            state: payload.state,
            zip_code: payload.zip_code,
        },
        notes: payload.notes,
    };

    let customer = state
        .call(state.engine.update_customer(&tenant, id, patch))
        .await?;
    Ok(Json(customer_view(customer)))
}

/// Handle requests for deleting a `Customer`, answers 204 even when it was already gone
pub async fn delete(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let Path(id) = id?;
    if state.call(state.engine.delete_customer(&tenant, id)).await? {
        tracing::info!(tenant = %tenant, customer = %id, "customer deleted");
    }
    Ok(StatusCode::NO_CONTENT)
}
