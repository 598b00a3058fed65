//! Business-rule errors raised by the service layer.

use thiserror::Error;

use crate::db::RepositoryError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A record the operation depends on does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A request value is malformed.
    #[error("{0}")]
    InvalidData(String),

    /// The caller's ticket does not grant access to the resource.
    #[error("{0}")]
    PaymentRequired(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn not_found() -> Self {
        Self::NotFound("No result for this search!".to_string())
    }

    pub fn payment_required() -> Self {
        Self::PaymentRequired("Payment Required".to_string())
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized("You must be signed in to continue".to_string())
    }
}
