use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Reads a key that may be absent (`None`), `null` (`Some(None)`) or set.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod customer {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PersonType {
        Individual,
        Organization,
    }

    /// Request body of `POST /api/customers`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CustomerNew {
        pub name: String,
        pub person_type: Option<PersonType>,
        /// CPF or CNPJ, with or without the usual punctuation.
        pub tax_id: Option<String>,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub street: Option<String>,
        pub number: Option<String>,
        pub complement: Option<String>,
        pub neighborhood: Option<String>,
        pub city: Option<String>,
        pub state: Option<String>,
        pub zip_code: Option<String>,
        pub notes: Option<String>,
    }

    /// Request body of `PUT /api/customers/{id}`.
    ///
    /// Absent fields are left untouched, an empty string clears a text field.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CustomerUpdate {
        pub name: Option<String>,
        pub person_type: Option<PersonType>,
        pub tax_id: Option<String>,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub street: Option<String>,
        pub number: Option<String>,
        pub complement: Option<String>,
        pub neighborhood: Option<String>,
        pub city: Option<String>,
        pub state: Option<String>,
        pub zip_code: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CustomerView {
        pub id: Uuid,
        pub name: String,
        pub person_type: Option<PersonType>,
        /// Digits only.
        pub tax_id: Option<String>,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub street: Option<String>,
        pub number: Option<String>,
        pub complement: Option<String>,
        pub neighborhood: Option<String>,
        pub city: Option<String>,
        pub state: Option<String>,
        pub zip_code: Option<String>,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetStatus {
        #[default]
        Draft,
        Approved,
        Rejected,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DiscountType {
        Percentage,
        Amount,
    }

    /// Request body of `POST /api/budgets`.
    ///
    /// Amounts are decimal reais (`900.5` is R$ 900.50). The budget number is
    /// assigned by the server.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub title: String,
        pub customer_id: Option<Uuid>,
        pub subtotal_amount: f64,
        pub discount_percent: Option<f64>,
        pub discount_amount: Option<f64>,
        pub discount_type: Option<DiscountType>,
        pub final_amount: f64,
        pub project_name: Option<String>,
        pub details: Option<String>,
        pub payment_terms: Option<String>,
        pub delivery_deadline: Option<String>,
        pub observations: Option<String>,
        pub status: Option<BudgetStatus>,
    }

    /// Request body of `PUT /api/budgets/{id}`.
    ///
    /// Unknown keys (`id`, `budget_number`, `user_id`, ...) are ignored, so
    /// a client echoing a full budget back cannot change them. The customer
    /// link and the discount fields are cleared with an explicit `null`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub title: Option<String>,
        #[serde(
            default,
            deserialize_with = "super::nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub customer_id: Option<Option<Uuid>>,
        pub subtotal_amount: Option<f64>,
        #[serde(
            default,
            deserialize_with = "super::nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub discount_percent: Option<Option<f64>>,
        #[serde(
            default,
            deserialize_with = "super::nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub discount_amount: Option<Option<f64>>,
        #[serde(
            default,
            deserialize_with = "super::nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub discount_type: Option<Option<DiscountType>>,
        pub final_amount: Option<f64>,
        pub project_name: Option<String>,
        pub details: Option<String>,
        pub payment_terms: Option<String>,
        pub delivery_deadline: Option<String>,
        pub observations: Option<String>,
        pub status: Option<BudgetStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        /// `YYYY-NNN`.
        pub budget_number: String,
        pub title: String,
        pub customer_id: Option<Uuid>,
        pub subtotal_amount: f64,
        pub discount_percent: Option<f64>,
        pub discount_amount: Option<f64>,
        pub discount_type: Option<DiscountType>,
        pub final_amount: f64,
        pub project_name: Option<String>,
        pub details: Option<String>,
        pub payment_terms: Option<String>,
        pub delivery_deadline: Option<String>,
        pub observations: Option<String>,
        pub status: BudgetStatus,
        pub created_at: DateTime<Utc>,
    }
}

pub mod notify {
    use super::*;

    /// Response of `GET /api/budgets/{id}/whatsapp`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WhatsAppLink {
        pub success: bool,
        pub message: String,
        pub link: String,
    }

    /// Response of `POST /api/budgets/{id}/send-email`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EmailSent {
        pub message: String,
    }
}

pub mod export {
    use super::*;

    /// Query of `GET /api/export/monthly-report`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MonthlyReportQuery {
        /// `YYYY-MM`; the current month when absent.
        pub month: Option<String>,
    }
}
