use async_trait::async_trait;
use permissions_sdk::PermissionSet;
use thiserror::Error;

use super::model::Grant;

/// Failures reported by a [`PermissionStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The operation matched no row.
    #[error("no matching grant")]
    NotFound,

    /// The store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(message: impl ToString) -> Self {
        Self::Unavailable(message.to_string())
    }
}

/// Durable grants, unique per `(api_key, module, action)`.
///
/// Implementations own their pooling and timeouts; callers assume no
/// connection affinity between calls.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Insert the grant. Inserting an existing grant succeeds and changes nothing.
    async fn grant(&self, grant: &Grant<'_>) -> Result<(), StoreError>;

    /// Delete the grant; [`StoreError::NotFound`] when no row matched.
    async fn revoke(&self, grant: &Grant<'_>) -> Result<(), StoreError>;

    /// Every permission held by `api_key`.
    async fn list(&self, api_key: &str) -> Result<PermissionSet, StoreError>;

    async fn exists(&self, grant: &Grant<'_>) -> Result<bool, StoreError>;
}
