//! Budget e-mails and their delivery.
//!
//! [`compose_budget_email`] turns a budget into an [`OutgoingEmail`];
//! a [`Mailer`] delivers it and answers with a [`DeliveryReport`]. Mailers
//! never return an error: transport and provider failures are logged and
//! reported as [`DeliveryReport::Failed`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engine::{BudgetSnapshot, BudgetStatus};
use handlebars::Handlebars;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{CompanyProfile, DocumentError};

pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outcome of a delivery attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryReport {
    /// Accepted by the provider, with its message id when it returned one.
    Sent { id: Option<String> },
    /// Not delivered. `reason` is safe to log, it never holds credentials.
    Failed { reason: String },
}

impl DeliveryReport {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> DeliveryReport;
}

/// Mailer used when no provider is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: &OutgoingEmail) -> DeliveryReport {
        tracing::warn!(to = %email.to, "email delivery is not configured");
        DeliveryReport::Failed {
            reason: "email delivery is not configured".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: Option<String>,
}

/// Delivers through a Resend compatible HTTP API.
#[derive(Clone, Debug)]
pub struct ResendMailer {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(
        api_key: impl Into<String>,
        from: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DocumentError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            from: from.into(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> DeliveryReport {
        let body = ResendRequest {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
        };

        let response = match self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(to = %email.to, "mail provider unreachable: {err}");
                return DeliveryReport::Failed {
                    reason: "mail provider unreachable".to_string(),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(to = %email.to, %status, "mail provider rejected message: {detail}");
            return DeliveryReport::Failed {
                reason: format!("mail provider answered {status}"),
            };
        }

        let id = match response.json::<ResendResponse>().await {
            Ok(body) => body.id,
            Err(err) => {
                tracing::debug!("unexpected mail provider response: {err}");
                None
            }
        };
        tracing::info!(to = %email.to, "email sent");
        DeliveryReport::Sent { id }
    }
}

const NEW_BUDGET: &str = "new_budget";
const STATUS_UPDATE: &str = "status_update";

const FOOTER_TEMPLATE: &str = r#"<hr style="border: none; border-top: 1px solid #e5e7eb; margin: 30px 0;">
      <p style="color: #6b7280; font-size: 12px;">Este é um email automático da {{company}}. Não responda este email.</p>"#;

const NEW_BUDGET_TEMPLATE: &str = r#"<html>
  <body style="font-family: Arial, sans-serif; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
      <h2 style="color: #1f2937;">✅ Novo Orçamento Criado</h2>
      <p>Olá <strong>{{customer}}</strong>,</p>
      <p>Um novo orçamento foi criado para você:</p>
      <p><strong>Número:</strong> {{number}}</p>
      <p><strong>Título:</strong> {{title}}</p>
      <p><strong>Valor:</strong> {{amount}}</p>
      <p><strong>Data:</strong> {{date}}</p>
      <p>Você pode acompanhar o status do seu orçamento conosco.</p>
      {{> footer}}
    </div>
  </body>
</html>"#;

const STATUS_UPDATE_TEMPLATE: &str = r#"<html>
  <body style="font-family: Arial, sans-serif; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
      <h2 style="color: #1f2937;">📋 Atualização de Orçamento</h2>
      <p>Olá <strong>{{customer}}</strong>,</p>
      <p>Seu orçamento foi atualizado:</p>
      <p><strong>Número:</strong> {{number}}</p>
      <p><strong>Título:</strong> {{title}}</p>
      <p><strong>Valor:</strong> {{amount}}</p>
      <p><strong>Status:</strong> <span style="color: {{status.color}}; font-weight: bold;">{{status.label}}</span></p>
      <p><strong>Data:</strong> {{date}}</p>
      <p>Entre em contato conosco se tiver dúvidas.</p>
      {{> footer}}
    </div>
  </body>
</html>"#;

/// Values the budget templates are rendered from. Handlebars escapes every
/// `{{field}}`, so customer input never reaches the markup as HTML.
#[derive(Serialize)]
struct BudgetEmailContext<'a> {
    company: &'a str,
    customer: &'a str,
    number: String,
    title: &'a str,
    amount: String,
    date: String,
    status: Option<StatusBadge>,
}

#[derive(Serialize)]
struct StatusBadge {
    label: &'static str,
    color: &'static str,
}

fn templates() -> Result<Handlebars<'static>, DocumentError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_partial("footer", FOOTER_TEMPLATE)?;
    handlebars.register_template_string(NEW_BUDGET, NEW_BUDGET_TEMPLATE)?;
    handlebars.register_template_string(STATUS_UPDATE, STATUS_UPDATE_TEMPLATE)?;
    Ok(handlebars)
}

/// Composes the e-mail for the budget's customer.
///
/// Drafts get the "new budget" template, approved and rejected budgets the
/// "status update" one. Fails with [`DocumentError::InvalidDestination`]
/// when there is no customer e-mail to write to.
pub fn compose_budget_email(
    company: &CompanyProfile,
    snapshot: &BudgetSnapshot,
    now: DateTime<Utc>,
) -> Result<OutgoingEmail, DocumentError> {
    let customer = snapshot.customer.as_ref().ok_or_else(|| {
        DocumentError::InvalidDestination("budget has no customer".to_string())
    })?;
    let to = customer
        .email
        .as_deref()
        .filter(|email| email.contains('@'))
        .ok_or_else(|| {
            DocumentError::InvalidDestination("customer has no email".to_string())
        })?;

    let budget = &snapshot.budget;
    let (template, subject, status) = match budget.status {
        BudgetStatus::Draft => (
            NEW_BUDGET,
            format!("✅ Novo Orçamento: {}", budget.title),
            None,
        ),
        status => {
            let badge = if status == BudgetStatus::Approved {
                StatusBadge {
                    label: "Aprovado ✅",
                    color: "#10b981",
                }
            } else {
                StatusBadge {
                    label: "Rejeitado ❌",
                    color: "#ef4444",
                }
            };
            (
                STATUS_UPDATE,
                format!("📋 Orçamento {}: {}", badge.label, budget.title),
                Some(badge),
            )
        }
    };

    let context = BudgetEmailContext {
        company: &company.name,
        customer: &customer.name,
        number: budget.number.to_string(),
        title: &budget.title,
        amount: budget.final_amount.to_string(),
        date: company.format_timestamp(now),
        status,
    };
    let html = templates()?.render(template, &context)?;

    Ok(OutgoingEmail {
        to: to.to_string(),
        subject,
        html,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;
    use engine::{Address, Budget, BudgetNumber, BudgetText, Customer, MoneyCents};
    use uuid::Uuid;

    use super::*;

    fn snapshot(status: BudgetStatus, email: Option<&str>) -> BudgetSnapshot {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 13, 0, 0).unwrap();
        let customer = Customer {
            id: Uuid::new_v4(),
            name: "Ana <Silva>".to_string(),
            person_type: None,
            tax_id: None,
            phone: None,
            email: email.map(ToString::to_string),
            address: Address::default(),
            notes: None,
            created_at: now,
        };
        BudgetSnapshot {
            budget: Budget {
                id: Uuid::new_v4(),
                number: BudgetNumber::new(2026, 1).unwrap(),
                title: "Cabinet".to_string(),
                customer_id: Some(customer.id),
                subtotal: MoneyCents::new(100_000),
                discount_percent: None,
                discount_amount: None,
                discount_type: None,
                final_amount: MoneyCents::new(90_000),
                text: BudgetText::default(),
                status,
                created_at: now,
            },
            customer: Some(customer),
        }
    }

    #[derive(Default)]
    struct RecordingMailer(Mutex<Vec<OutgoingEmail>>);

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> DeliveryReport {
            self.0.lock().unwrap().push(email.clone());
            DeliveryReport::Sent {
                id: Some("msg-1".to_string()),
            }
        }
    }

    #[test]
    fn draft_uses_new_budget_template() {
        let email = compose_budget_email(
            &CompanyProfile::default(),
            &snapshot(BudgetStatus::Draft, Some("ana@example.com")),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(email.to, "ana@example.com");
        assert_eq!(email.subject, "✅ Novo Orçamento: Cabinet");
        assert!(email.html.contains("Novo Orçamento Criado"));
        assert!(email.html.contains("R$ 900.00"));
        assert!(email.html.contains("Ana &lt;Silva&gt;"));
        assert!(!email.html.contains("Status:"));
    }

    #[test]
    fn approved_and_rejected_use_status_template() {
        let company = CompanyProfile::default();
        let approved = compose_budget_email(
            &company,
            &snapshot(BudgetStatus::Approved, Some("ana@example.com")),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(approved.subject, "📋 Orçamento Aprovado ✅: Cabinet");
        assert!(approved.html.contains("#10b981"));

        let rejected = compose_budget_email(
            &company,
            &snapshot(BudgetStatus::Rejected, Some("ana@example.com")),
            Utc::now(),
        )
        .unwrap();
        assert!(rejected.subject.contains("Rejeitado"));
        assert!(rejected.html.contains("#ef4444"));
        assert!(rejected.html.contains("Atualização de Orçamento"));
    }

    #[test]
    fn template_escapes_customer_input() {
        let mut snapshot = snapshot(BudgetStatus::Approved, Some("ana@example.com"));
        snapshot.budget.title = r#"<script>alert("x")</script>"#.to_string();
        let email =
            compose_budget_email(&CompanyProfile::default(), &snapshot, Utc::now()).unwrap();
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;script&gt;"));
        assert!(email.html.contains("Este é um email automático da"));
        assert!(email.subject.ends_with(r#"<script>alert("x")</script>"#));
    }

    #[test]
    fn missing_email_is_invalid_destination() {
        for email in [None, Some("not-an-address")] {
            let err = compose_budget_email(
                &CompanyProfile::default(),
                &snapshot(BudgetStatus::Draft, email),
                Utc::now(),
            )
            .unwrap_err();
            assert!(matches!(err, DocumentError::InvalidDestination(_)));
        }
    }

    #[test]
    fn resend_request_shape() {
        let body = ResendRequest {
            from: "orcamentos@example.com",
            to: ["ana@example.com"],
            subject: "s",
            html: "<p>h</p>",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["to"][0], "ana@example.com");
        assert_eq!(value["from"], "orcamentos@example.com");
    }

    #[tokio::test]
    async fn mailers_report_instead_of_failing() {
        let email = OutgoingEmail {
            to: "ana@example.com".to_string(),
            subject: "s".to_string(),
            html: "h".to_string(),
        };

        let report = DisabledMailer.send(&email).await;
        assert!(!report.is_sent());

        let recording = RecordingMailer::default();
        assert!(recording.send(&email).await.is_sent());
        assert_eq!(recording.0.lock().unwrap().len(), 1);

        // Nothing listens on port 9: the transport error becomes a report.
        let unreachable = ResendMailer::new(
            "key",
            "from@example.com",
            "http://127.0.0.1:9/emails",
            Duration::from_secs(2),
        )
        .unwrap();
        assert_eq!(
            unreachable.send(&email).await,
            DeliveryReport::Failed {
                reason: "mail provider unreachable".to_string()
            }
        );
    }
}
