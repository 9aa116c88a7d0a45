//! Budget (price quote) primitives.
//!
//! A `Budget` carries caller-supplied money fields: `final_amount` is stored
//! as given and never recomputed from subtotal and discount.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BudgetNumber, EngineError, MoneyCents, ResultEngine, util::parse_uuid};

/// Lifecycle status. Any status may move to any other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    #[default]
    Draft,
    Approved,
    Rejected,
}

impl BudgetStatus {
    pub const ALL: [BudgetStatus; 3] = [Self::Draft, Self::Approved, Self::Rejected];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Portuguese label used on documents and messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Rascunho",
            Self::Approved => "Aprovado",
            Self::Rejected => "Rejeitado",
        }
    }
}

impl TryFrom<&str> for BudgetStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(Self::Draft),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidField(format!(
                "invalid budget status: {other}"
            ))),
        }
    }
}

/// Which of the discount fields the user typed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Amount,
}

impl DiscountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Amount => "amount",
        }
    }
}

impl TryFrom<&str> for DiscountType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "percentage" => Ok(Self::Percentage),
            "amount" => Ok(Self::Amount),
            other => Err(EngineError::InvalidField(format!(
                "invalid discount type: {other}"
            ))),
        }
    }
}

/// Free text sections printed on the quote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BudgetText {
    pub project_name: Option<String>,
    pub details: Option<String>,
    pub payment_terms: Option<String>,
    pub delivery_deadline: Option<String>,
    pub observations: Option<String>,
}

impl BudgetText {
    pub fn is_empty(&self) -> bool {
        self.project_name.is_none()
            && self.details.is_none()
            && self.payment_terms.is_none()
            && self.delivery_deadline.is_none()
            && self.observations.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub number: BudgetNumber,
    pub title: String,
    pub customer_id: Option<Uuid>,
    pub subtotal: MoneyCents,
    pub discount_percent: Option<f64>,
    pub discount_amount: Option<MoneyCents>,
    pub discount_type: Option<DiscountType>,
    pub final_amount: MoneyCents,
    pub text: BudgetText,
    pub status: BudgetStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tenant_id: String,
    pub budget_number: String,
    pub title: String,
    pub customer_id: Option<String>,
    pub subtotal_minor: i64,
    pub discount_percent: Option<f64>,
    pub discount_minor: Option<i64>,
    pub discount_type: Option<String>,
    pub final_minor: i64,
    pub project_name: Option<String>,
    pub details: Option<String>,
    pub payment_terms: Option<String>,
    pub delivery_deadline: Option<String>,
    pub observations: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            number: model.budget_number.parse()?,
            title: model.title,
            customer_id: model
                .customer_id
                .as_deref()
                .map(|id| parse_uuid(id, "customer"))
                .transpose()?,
            subtotal: MoneyCents::new(model.subtotal_minor),
            discount_percent: model.discount_percent,
            discount_amount: model.discount_minor.map(MoneyCents::new),
            discount_type: model
                .discount_type
                .as_deref()
                .map(DiscountType::try_from)
                .transpose()?,
            final_amount: MoneyCents::new(model.final_minor),
            text: BudgetText {
                project_name: model.project_name,
                details: model.details,
                payment_terms: model.payment_terms,
                delivery_deadline: model.delivery_deadline,
                observations: model.observations,
            },
            status: BudgetStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}

impl From<&Budget> for ActiveModel {
    fn from(value: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            tenant_id: ActiveValue::NotSet,
            budget_number: ActiveValue::Set(value.number.to_string()),
            title: ActiveValue::Set(value.title.clone()),
            customer_id: ActiveValue::Set(value.customer_id.map(|id| id.to_string())),
            subtotal_minor: ActiveValue::Set(value.subtotal.cents()),
            discount_percent: ActiveValue::Set(value.discount_percent),
            discount_minor: ActiveValue::Set(value.discount_amount.map(MoneyCents::cents)),
            discount_type: ActiveValue::Set(value.discount_type.map(|d| d.as_str().to_string())),
            final_minor: ActiveValue::Set(value.final_amount.cents()),
            project_name: ActiveValue::Set(value.text.project_name.clone()),
            details: ActiveValue::Set(value.text.details.clone()),
            payment_terms: ActiveValue::Set(value.text.payment_terms.clone()),
            delivery_deadline: ActiveValue::Set(value.text.delivery_deadline.clone()),
            observations: ActiveValue::Set(value.text.observations.clone()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_strings() {
        for status in BudgetStatus::ALL {
            assert_eq!(BudgetStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(BudgetStatus::try_from("archived").is_err());
    }

    #[test]
    fn model_with_bad_number_is_rejected() {
        let model = Model {
            id: Uuid::new_v4().to_string(),
            tenant_id: "t".to_string(),
            budget_number: "2026-x".to_string(),
            title: "Cabinet".to_string(),
            customer_id: None,
            subtotal_minor: 0,
            discount_percent: None,
            discount_minor: None,
            discount_type: None,
            final_minor: 0,
            project_name: None,
            details: None,
            payment_terms: None,
            delivery_deadline: None,
            observations: None,
            status: "draft".to_string(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            Budget::try_from(model),
            Err(EngineError::InvalidNumber(_))
        ));
    }
}
