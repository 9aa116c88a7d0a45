//! Command structs for engine operations.
//!
//! `*New` types carry the fields of a create; `*Patch` types carry a partial
//! update where `None` leaves the stored value untouched. Budget patches have
//! no id, tenant or number field: those are immutable after creation.

use uuid::Uuid;

use crate::{Address, BudgetStatus, BudgetText, DiscountType, MoneyCents, PersonType};

/// Create a customer.
#[derive(Clone, Debug, Default)]
pub struct CustomerNew {
    pub name: String,
    pub person_type: Option<PersonType>,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Address,
    pub notes: Option<String>,
}

impl CustomerNew {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn tax_id(mut self, person_type: PersonType, tax_id: impl Into<String>) -> Self {
        self.person_type = Some(person_type);
        self.tax_id = Some(tax_id.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Partial update of a customer.
///
/// Text fields set to an empty string clear the stored value. Address
/// components follow the same rule one by one.
#[derive(Clone, Debug, Default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub person_type: Option<PersonType>,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Address,
    pub notes: Option<String>,
}

impl CustomerPatch {
    /// `true` when the patch touches the tax id or the type it is checked
    /// against.
    pub fn touches_tax_id(&self) -> bool {
        self.tax_id.is_some() || self.person_type.is_some()
    }
}

/// Create a budget. The budget number is allocated by the engine.
#[derive(Clone, Debug, Default)]
pub struct BudgetNew {
    pub title: String,
    pub customer_id: Option<Uuid>,
    pub subtotal: MoneyCents,
    pub discount_percent: Option<f64>,
    pub discount_amount: Option<MoneyCents>,
    pub discount_type: Option<DiscountType>,
    pub final_amount: MoneyCents,
    pub text: BudgetText,
    pub status: Option<BudgetStatus>,
}

impl BudgetNew {
    #[must_use]
    pub fn new(title: impl Into<String>, subtotal: MoneyCents, final_amount: MoneyCents) -> Self {
        Self {
            title: title.into(),
            subtotal,
            final_amount,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn customer(mut self, customer_id: Uuid) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    #[must_use]
    pub fn discount_percent(mut self, percent: f64) -> Self {
        self.discount_percent = Some(percent);
        self.discount_type = Some(DiscountType::Percentage);
        self
    }

    #[must_use]
    pub fn status(mut self, status: BudgetStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Partial update of a budget.
///
/// `None` keeps the stored value. The customer link and the discount fields
/// are `Option<Option<_>>`: `Some(None)` clears them, `Some(Some(v))` sets them.
#[derive(Clone, Debug, Default)]
pub struct BudgetPatch {
    pub title: Option<String>,
    pub customer_id: Option<Option<Uuid>>,
    pub subtotal: Option<MoneyCents>,
    pub discount_percent: Option<Option<f64>>,
    pub discount_amount: Option<Option<MoneyCents>>,
    pub discount_type: Option<Option<DiscountType>>,
    pub final_amount: Option<MoneyCents>,
    pub text: BudgetText,
    pub status: Option<BudgetStatus>,
}

impl BudgetPatch {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: BudgetStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Unlinks the budget from its customer.
    #[must_use]
    pub fn clear_customer(mut self) -> Self {
        self.customer_id = Some(None);
        self
    }

    /// Removes any discount.
    #[must_use]
    pub fn clear_discount(mut self) -> Self {
        self.discount_percent = Some(None);
        self.discount_amount = Some(None);
        self.discount_type = Some(None);
        self
    }
}
