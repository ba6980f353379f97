use thiserror::Error;

use crate::authz::DenyReason;
use crate::errors::ServiceError;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid credentials")]
    Unauthorized,
    #[error("account is inactive")]
    Inactive,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => ServiceError::Validation(msg),
            AuthError::Unauthorized => ServiceError::Unauthenticated("invalid credentials".into()),
            AuthError::TokenError(msg) => ServiceError::Unauthenticated(msg),
            AuthError::Inactive => ServiceError::Forbidden(DenyReason::Inactive),
            AuthError::HashError(msg) | AuthError::Repository(msg) => ServiceError::Db(msg),
        }
    }
}
