use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Address, Customer, CustomerNew, CustomerPatch, EngineError, PersonType, ResultEngine, TaxId,
    TenantId, customers,
    util::{
        apply_optional_text_patch, normalize_optional_text, normalize_required_text, sort_key,
    },
};

use super::{Engine, with_tx};

/// Validates `raw` against `person_type`. Blank input means "no tax id".
fn validate_tax_id(person_type: Option<PersonType>, raw: Option<&str>) -> ResultEngine<Option<TaxId>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let person_type = person_type.ok_or_else(|| {
        EngineError::InvalidTaxId("person type is required with a tax id".to_string())
    })?;
    TaxId::parse(raw, person_type).map(Some)
}

fn normalize_address(address: &Address) -> Address {
    Address {
        street: normalize_optional_text(address.street.as_deref()),
        number: normalize_optional_text(address.number.as_deref()),
        complement: normalize_optional_text(address.complement.as_deref()),
        neighborhood: normalize_optional_text(address.neighborhood.as_deref()),
        city: normalize_optional_text(address.city.as_deref()),
        state: normalize_optional_text(address.state.as_deref()),
        zip_code: normalize_optional_text(address.zip_code.as_deref()),
    }
}

fn patch_address(existing: Address, patch: &Address) -> Address {
    Address {
        street: apply_optional_text_patch(existing.street, patch.street.as_deref()),
        number: apply_optional_text_patch(existing.number, patch.number.as_deref()),
        complement: apply_optional_text_patch(existing.complement, patch.complement.as_deref()),
        neighborhood: apply_optional_text_patch(
            existing.neighborhood,
            patch.neighborhood.as_deref(),
        ),
        city: apply_optional_text_patch(existing.city, patch.city.as_deref()),
        state: apply_optional_text_patch(existing.state, patch.state.as_deref()),
        zip_code: apply_optional_text_patch(existing.zip_code, patch.zip_code.as_deref()),
    }
}

impl Engine {
    /// Creates a customer owned by `tenant`.
    ///
    /// The tax id, when present, is checked against the declared person type
    /// before anything is written.
    pub async fn create_customer(
        &self,
        tenant: &TenantId,
        cmd: CustomerNew,
    ) -> ResultEngine<Customer> {
        let name = normalize_required_text(&cmd.name, "customer name")?;
        let tax_id = validate_tax_id(cmd.person_type, cmd.tax_id.as_deref())?;

        let customer = Customer {
            id: Uuid::new_v4(),
            name,
            person_type: cmd.person_type,
            tax_id,
            phone: normalize_optional_text(cmd.phone.as_deref()),
            email: normalize_optional_text(cmd.email.as_deref()),
            address: normalize_address(&cmd.address),
            notes: normalize_optional_text(cmd.notes.as_deref()),
            created_at: self.now(),
        };

        with_tx!(self, |db_tx| {
            let mut model: customers::ActiveModel = (&customer).into();
            model.tenant_id = ActiveValue::Set(tenant.as_str().to_string());
            model.insert(&db_tx).await?;
            Ok(customer)
        })
    }

    /// Every customer of `tenant`, sorted by name (case and accent
    /// insensitive).
    pub async fn list_customers(&self, tenant: &TenantId) -> ResultEngine<Vec<Customer>> {
        let models = customers::Entity::find()
            .filter(customers::Column::TenantId.eq(tenant.as_str()))
            .all(&self.database)
            .await?;

        let mut out = models
            .into_iter()
            .map(Customer::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        out.sort_by_cached_key(|c| sort_key(&c.name));
        Ok(out)
    }

    /// Return a customer snapshot from DB.
    pub async fn customer(&self, tenant: &TenantId, customer_id: Uuid) -> ResultEngine<Customer> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_customer_model(&db_tx, tenant, customer_id)
                .await?;
            Customer::try_from(model)
        })
    }

    /// Applies a partial update. Fields absent from `patch` keep their stored
    /// value; the tax id is re-validated whenever the patch touches it or its
    /// person type.
    pub async fn update_customer(
        &self,
        tenant: &TenantId,
        customer_id: Uuid,
        patch: CustomerPatch,
    ) -> ResultEngine<Customer> {
        let name = patch
            .name
            .as_deref()
            .map(|name| normalize_required_text(name, "customer name"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = self
                .require_customer_model(&db_tx, tenant, customer_id)
                .await?;
            let existing = Customer::try_from(model)?;

            let person_type = patch.person_type.or(existing.person_type);
            let tax_id = if patch.touches_tax_id() {
                let raw = match patch.tax_id.as_deref() {
                    Some(raw) => Some(raw.to_string()),
                    None => existing.tax_id.as_ref().map(|t| t.digits().to_string()),
                };
                validate_tax_id(person_type, raw.as_deref())?
            } else {
                existing.tax_id
            };

            let updated = Customer {
                id: existing.id,
                name: name.unwrap_or(existing.name),
                person_type,
                tax_id,
                phone: apply_optional_text_patch(existing.phone, patch.phone.as_deref()),
                email: apply_optional_text_patch(existing.email, patch.email.as_deref()),
                address: patch_address(existing.address, &patch.address),
                notes: apply_optional_text_patch(existing.notes, patch.notes.as_deref()),
                created_at: existing.created_at,
            };

            let mut active: customers::ActiveModel = (&updated).into();
            active.created_at = ActiveValue::NotSet;
            active.update(&db_tx).await?;
            Ok(updated)
        })
    }

    /// Hard-deletes a customer of `tenant`.
    ///
    /// Deleting a missing id (or one owned by another tenant) is not an
    /// error; the return value tells whether a row was removed. Budgets that
    /// link the customer keep their (now dangling) link.
    pub async fn delete_customer(&self, tenant: &TenantId, customer_id: Uuid) -> ResultEngine<bool> {
        with_tx!(self, |db_tx| {
            let result = customers::Entity::delete_many()
                .filter(customers::Column::Id.eq(customer_id.to_string()))
                .filter(customers::Column::TenantId.eq(tenant.as_str()))
                .exec(&db_tx)
                .await?;
            Ok(result.rows_affected > 0)
        })
    }
}
