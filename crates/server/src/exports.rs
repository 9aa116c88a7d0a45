//! File downloads: the PDF quote and the xlsx exports.

use axum::{
    Extension,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::{
        HeaderValue,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use documents::{ReportMonth, pdf, spreadsheet};
use engine::TenantId;
use uuid::Uuid;

use api_types::export::MonthlyReportQuery;

use crate::{ServerError, server::ServerState};

const PDF: &str = "application/pdf";
const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn attachment(bytes: Vec<u8>, content_type: &'static str, filename: &str) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        [
            (CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

/// Handle requests for the PDF quote of a budget
pub async fn budget_pdf(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, ServerError> {
    let Path(id) = id?;
    let snapshot = state.call(state.engine.budget_snapshot(&tenant, id)).await?;
    let bytes = pdf::render_quote(&state.company, &snapshot, state.engine.now())?;

    let filename = format!("orcamento_{}.pdf", snapshot.budget.number);
    Ok(attachment(bytes, PDF, &filename))
}

/// Handle requests for the customers spreadsheet
pub async fn customers(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
) -> Result<Response, ServerError> {
    let customers = state.call(state.engine.list_customers(&tenant)).await?;
    if customers.is_empty() {
        return Err(ServerError::NotFound("no customers to export".to_string()));
    }

    let bytes = spreadsheet::customers_workbook(&customers, &state.company)?;
    let filename = format!("clientes_{}.xlsx", state.engine.now().format("%Y%m%d"));
    Ok(attachment(bytes, XLSX, &filename))
}

/// Handle requests for the budgets spreadsheet
pub async fn budgets(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
) -> Result<Response, ServerError> {
    let budgets = state.call(state.engine.list_budgets(&tenant)).await?;
    if budgets.is_empty() {
        return Err(ServerError::NotFound("no budgets to export".to_string()));
    }
    let customers = state.call(state.engine.list_customers(&tenant)).await?;

    let bytes = spreadsheet::budgets_workbook(&budgets, &customers, &state.company)?;
    let filename = format!("orcamentos_{}.xlsx", state.engine.now().format("%Y%m%d"));
    Ok(attachment(bytes, XLSX, &filename))
}

/// Budgets created during a calendar month of the company's timezone, plus
/// the analysis sheet. Without `?month=` the current month is used.
pub async fn monthly_report(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
    query: Result<Query<MonthlyReportQuery>, QueryRejection>,
) -> Result<Response, ServerError> {
    let Query(query) = query?;
    let month = match query.month.as_deref() {
        Some(raw) => raw.parse::<ReportMonth>()?,
        None => ReportMonth::containing(state.engine.now(), state.company.timezone),
    };
    let (from, to) = month.bounds(state.company.timezone)?;

    let budgets = state
        .call(state.engine.list_budgets_created_between(&tenant, from, to))
        .await?;
    if budgets.is_empty() {
        return Err(ServerError::NotFound(format!("no budgets in {month}")));
    }
    let customers = state.call(state.engine.list_customers(&tenant)).await?;

    let bytes = spreadsheet::monthly_report_workbook(&budgets, &customers, &state.company)?;
    let filename = format!("relatorio_{month}.xlsx");
    Ok(attachment(bytes, XLSX, &filename))
}
