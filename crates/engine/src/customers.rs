//! The module contains `Customer` struct and its storage entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, PersonType, ResultEngine, TaxId, util::parse_uuid};

/// Postal address of a customer. Every component is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl Address {
    /// Single line rendering used on documents, `None` when nothing is set.
    pub fn one_line(&self) -> Option<String> {
        let street = match (&self.street, &self.number) {
            (Some(street), Some(number)) => Some(format!("{street}, {number}")),
            (Some(street), None) => Some(street.clone()),
            (None, _) => None,
        };
        let city = match (&self.city, &self.state) {
            (Some(city), Some(state)) => Some(format!("{city}/{state}")),
            (Some(city), None) => Some(city.clone()),
            (None, Some(state)) => Some(state.clone()),
            (None, None) => None,
        };
        let parts: Vec<String> = [
            street,
            self.complement.clone(),
            self.neighborhood.clone(),
            city,
            self.zip_code.as_ref().map(|zip| format!("CEP {zip}")),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" - "))
        }
    }
}

/// A person or organization that receives budgets.
#[derive(Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub person_type: Option<PersonType>,
    pub tax_id: Option<TaxId>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Address,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub person_type: Option<String>,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Customer {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let person_type = model
            .person_type
            .as_deref()
            .map(PersonType::try_from)
            .transpose()?;
        let tax_id = match (model.tax_id.as_deref(), person_type) {
            (Some(raw), Some(person_type)) => Some(TaxId::parse(raw, person_type)?),
            (Some(_), None) => {
                return Err(EngineError::InvalidTaxId(
                    "stored tax id without person type".to_string(),
                ));
            }
            (None, _) => None,
        };

        Ok(Self {
            id: parse_uuid(&model.id, "customer")?,
            name: model.name,
            person_type,
            tax_id,
            phone: model.phone,
            email: model.email,
            address: Address {
                street: model.street,
                number: model.street_number,
                complement: model.complement,
                neighborhood: model.neighborhood,
                city: model.city,
                state: model.state,
                zip_code: model.zip_code,
            },
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}

impl From<&Customer> for ActiveModel {
    fn from(value: &Customer) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            tenant_id: ActiveValue::NotSet,
            name: ActiveValue::Set(value.name.clone()),
            person_type: ActiveValue::Set(value.person_type.map(|p| p.as_str().to_string())),
            tax_id: ActiveValue::Set(value.tax_id.as_ref().map(|t| t.digits().to_string())),
            phone: ActiveValue::Set(value.phone.clone()),
            email: ActiveValue::Set(value.email.clone()),
            street: ActiveValue::Set(value.address.street.clone()),
            street_number: ActiveValue::Set(value.address.number.clone()),
            complement: ActiveValue::Set(value.address.complement.clone()),
            neighborhood: ActiveValue::Set(value.address.neighborhood.clone()),
            city: ActiveValue::Set(value.address.city.clone()),
            state: ActiveValue::Set(value.address.state.clone()),
            zip_code: ActiveValue::Set(value.address.zip_code.clone()),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_one_line_skips_missing_parts() {
        let address = Address {
            street: Some("Rua das Flores".to_string()),
            number: Some("12".to_string()),
            city: Some("Curitiba".to_string()),
            state: Some("PR".to_string()),
            ..Default::default()
        };
        assert_eq!(
            address.one_line().as_deref(),
            Some("Rua das Flores, 12 - Curitiba/PR")
        );
        assert_eq!(Address::default().one_line(), None);
    }
}
