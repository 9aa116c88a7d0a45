use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, TenantId, budgets, customers};

use super::Engine;

/// Generates tenant-scoped `find_` and `require_` lookups for an entity.
///
/// A row owned by another tenant is indistinguishable from a missing one:
/// both come back as `None` / `KeyNotFound`.
macro_rules! impl_tenant_lookup {
    ($find_fn:ident, $require_fn:ident, $module:ident, $err_msg:literal) => {
        pub(super) async fn $find_fn(
            &self,
            db: &DatabaseTransaction,
            tenant: &TenantId,
            id: Uuid,
        ) -> ResultEngine<Option<$module::Model>> {
            $module::Entity::find_by_id(id.to_string())
                .filter($module::Column::TenantId.eq(tenant.as_str()))
                .one(db)
                .await
                .map_err(Into::into)
        }

        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            tenant: &TenantId,
            id: Uuid,
        ) -> ResultEngine<$module::Model> {
            self.$find_fn(db, tenant, id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_tenant_lookup!(
        find_customer_model,
        require_customer_model,
        customers,
        "customer not exists"
    );

    impl_tenant_lookup!(
        find_budget_model,
        require_budget_model,
        budgets,
        "budget not exists"
    );
}
