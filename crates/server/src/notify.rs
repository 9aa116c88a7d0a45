//! Budget notification endpoints

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::PathRejection},
};
use documents::{DeliveryReport, budget_whatsapp, compose_budget_email};
use engine::TenantId;
use uuid::Uuid;

use api_types::notify::{EmailSent, WhatsAppLink};

use crate::{ServerError, server::ServerState};

/// Handle requests for a WhatsApp link carrying the budget summary
pub async fn whatsapp(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<WhatsAppLink>, ServerError> {
    let Path(id) = id?;
    let snapshot = state.call(state.engine.budget_snapshot(&tenant, id)).await?;
    let message = budget_whatsapp(&state.company, &snapshot, state.engine.now())?;

    Ok(Json(WhatsAppLink {
        success: true,
        message: "Link WhatsApp gerado com sucesso! Clique para enviar a mensagem.".to_string(),
        link: message.link,
    }))
}

/// Handle requests for e-mailing a budget to its customer
pub async fn send_email(
    Extension(tenant): Extension<TenantId>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EmailSent>, ServerError> {
    let Path(id) = id?;
    let snapshot = state.call(state.engine.budget_snapshot(&tenant, id)).await?;
    let email = compose_budget_email(&state.company, &snapshot, state.engine.now())?;

    match state.within(state.mailer.send(&email)).await? {
        DeliveryReport::Sent { id } => {
            tracing::info!(
                tenant = %tenant,
                budget = %snapshot.budget.number,
                provider_id = ?id,
                "budget email sent"
            );
            Ok(Json(EmailSent {
                message: format!("Email enviado com sucesso para {}", email.to),
            }))
        }
        DeliveryReport::Failed { reason } => Err(ServerError::Delivery(reason)),
    }
}
