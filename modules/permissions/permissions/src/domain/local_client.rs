//! Local (in-process) client for the permissions module.

use std::sync::Arc;

use async_trait::async_trait;
use permissions_sdk::{
    CheckRequest, GrantRequest, ListRequest, PermissionSet, PermissionsClient, PermissionsError,
    RevokeRequest,
};

use super::{DomainError, Service};

/// Local client wrapping the service.
pub struct PermissionsLocalClient {
    svc: Arc<Service>,
}

impl PermissionsLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> PermissionsError {
    match &e {
        DomainError::Validation { .. } | DomainError::PermissionNotFound { .. } => {
            tracing::debug!(operation = op, error = %e, "permissions request rejected");
        }
        DomainError::Store(_) | DomainError::Cache(_) | DomainError::Internal(_) => {
            tracing::error!(operation = op, error = ?e, "permissions call failed");
        }
    }
    e.into()
}

#[async_trait]
impl PermissionsClient for PermissionsLocalClient {
    async fn grant(&self, request: GrantRequest) -> Result<(), PermissionsError> {
        self.svc
            .grant(&request.api_key, &request.module, &request.action)
            .await
            .map_err(|e| log_and_convert("grant", e))
    }

    async fn revoke(&self, request: RevokeRequest) -> Result<(), PermissionsError> {
        self.svc
            .revoke(&request.api_key, &request.module, &request.action)
            .await
            .map_err(|e| log_and_convert("revoke", e))
    }

    async fn check(&self, request: CheckRequest) -> Result<bool, PermissionsError> {
        self.svc
            .check(&request.api_key, &request.module, &request.action)
            .await
            .map_err(|e| log_and_convert("check", e))
    }

    async fn list(&self, request: ListRequest) -> Result<PermissionSet, PermissionsError> {
        self.svc
            .list(&request.api_key)
            .await
            .map_err(|e| log_and_convert("list", e))
    }
}
