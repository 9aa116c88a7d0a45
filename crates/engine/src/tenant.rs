//! Tenant scope threaded through every registry operation.

use std::fmt;

use crate::{EngineError, ResultEngine};

/// Identifier of the account that owns customers and budgets.
///
/// Only code that has verified a credential (the HTTP auth middleware, the
/// admin CLI) should build one; every query filters on it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(value: impl Into<String>) -> ResultEngine<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidField(
                "tenant id must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
