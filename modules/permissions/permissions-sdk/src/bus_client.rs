//! [`PermissionsClient`] over a message bus.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use msgbus::MessageBus;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::PermissionsClient;
use crate::error::PermissionsError;
use crate::models::{
    CheckRequest, CheckResponse, GrantRequest, ListRequest, ListResponse, PermissionSet,
    ResponseEnvelope, RevokeRequest, StatusResponse,
};
use crate::subjects;

/// Remote client: JSON requests to the `permissions.*` subjects.
#[derive(Clone)]
pub struct BusPermissionsClient {
    bus: Arc<dyn MessageBus>,
}

impl BusPermissionsClient {
    #[must_use]
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }

    async fn call<Req, Resp>(&self, subject: &str, request: &Req) -> Result<Resp, PermissionsError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_vec(request)
            .map_err(|e| PermissionsError::transport(format!("failed to encode request: {e}")))?;

        let reply = self
            .bus
            .request(subject, Bytes::from(payload))
            .await
            .map_err(|e| {
                tracing::warn!(subject, error = %e, "permissions request failed");
                PermissionsError::transport(e.to_string())
            })?;

        let envelope: ResponseEnvelope<Resp> = serde_json::from_slice(&reply)
            .map_err(|e| PermissionsError::transport(format!("unreadable reply: {e}")))?;
        envelope.into_result()
    }
}

#[async_trait]
impl PermissionsClient for BusPermissionsClient {
    async fn grant(&self, request: GrantRequest) -> Result<(), PermissionsError> {
        self.call::<_, StatusResponse>(subjects::GRANT, &request)
            .await
            .map(|_| ())
    }

    async fn revoke(&self, request: RevokeRequest) -> Result<(), PermissionsError> {
        self.call::<_, StatusResponse>(subjects::REVOKE, &request)
            .await
            .map(|_| ())
    }

    async fn check(&self, request: CheckRequest) -> Result<bool, PermissionsError> {
        self.call::<_, CheckResponse>(subjects::CHECK, &request)
            .await
            .map(|r| r.allowed)
    }

    async fn list(&self, request: ListRequest) -> Result<PermissionSet, PermissionsError> {
        self.call::<_, ListResponse>(subjects::LIST, &request)
            .await
            .map(|r| r.permissions)
    }
}
