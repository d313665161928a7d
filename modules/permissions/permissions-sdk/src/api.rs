//! Public API trait for the `permissions` module.

use async_trait::async_trait;

use crate::error::PermissionsError;
use crate::models::{CheckRequest, GrantRequest, ListRequest, PermissionSet, RevokeRequest};

/// Public API of the permissions module.
///
/// Implemented in-process by the module itself and remotely by
/// [`BusPermissionsClient`](crate::BusPermissionsClient):
///
/// ```ignore
/// let allowed = client.check(CheckRequest::new(api_key, "inventory", "read")).await?;
/// ```
#[async_trait]
pub trait PermissionsClient: Send + Sync {
    /// Grant a permission. Granting a permission already held succeeds.
    ///
    /// # Errors
    ///
    /// - `InvalidPayload` if a field is empty or the action is not allowed for the module
    /// - `Database` if the store fails
    async fn grant(&self, request: GrantRequest) -> Result<(), PermissionsError>;

    /// Revoke a permission.
    ///
    /// # Errors
    ///
    /// - `InvalidPayload` if a field is empty
    /// - `PermissionNotFound` if the permission was not granted
    /// - `Database` if the store fails
    async fn revoke(&self, request: RevokeRequest) -> Result<(), PermissionsError>;

    /// Whether the API key holds the permission.
    ///
    /// # Errors
    ///
    /// - `InvalidPayload` if a field is empty
    /// - `Database` if the permission set is not cached and the store fails
    async fn check(&self, request: CheckRequest) -> Result<bool, PermissionsError>;

    /// All permissions held by the API key.
    ///
    /// # Errors
    ///
    /// - `InvalidPayload` if the API key is empty
    /// - `Database` if the permission set is not cached and the store fails
    async fn list(&self, request: ListRequest) -> Result<PermissionSet, PermissionsError>;
}
