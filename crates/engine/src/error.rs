//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when a row does not exist under the caller's tenant.
//! - [`InvalidTaxId`] thrown when a national tax id fails its checksum.
//! - [`AllocationConflict`] thrown when a budget number could not be allocated
//!   within the retry budget.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidTaxId`]: EngineError::InvalidTaxId
//!  [`AllocationConflict`]: EngineError::AllocationConflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid tax id: {0}")]
    InvalidTaxId(String),
    #[error("Invalid field: {0}")]
    InvalidField(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid budget number: {0}")]
    InvalidNumber(String),
    #[error("Budget number allocation conflict after {0} attempts")]
    AllocationConflict(u32),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidTaxId(a), Self::InvalidTaxId(b)) => a == b,
            (Self::InvalidField(a), Self::InvalidField(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidNumber(a), Self::InvalidNumber(b)) => a == b,
            (Self::AllocationConflict(a), Self::AllocationConflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
