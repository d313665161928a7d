//! Domain errors for the permissions module.

use permissions_sdk::PermissionsError;

use super::cache::CacheError;
use super::repo::StoreError;

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("{message}")]
    Validation { message: String },

    #[error("permission '{module}:{action}' is not granted")]
    PermissionNotFound { module: String, action: String },

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn permission_not_found(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self::PermissionNotFound {
            module: module.into(),
            action: action.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            // Only revoke gives "no row" a meaning; anywhere else it is a store contract breach.
            StoreError::NotFound => Self::internal("store reported a missing row unexpectedly"),
            StoreError::Unavailable(_) => Self::Store(e),
        }
    }
}

impl From<DomainError> for PermissionsError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { message } => Self::invalid_payload(message),
            DomainError::PermissionNotFound { .. } => Self::PermissionNotFound,
            DomainError::Store(_) => Self::Database,
            DomainError::Cache(_) => Self::Cache,
            DomainError::Internal(_) => Self::Internal,
        }
    }
}
