//! Domain service for the permissions module.
//!
//! ## Consistency
//!
//! The store is the source of truth; the cache holds one serialized
//! [`PermissionSet`] per API key and is read cache-aside:
//!
//! - `check` / `list` read the cache first. A miss and a cache failure are the
//!   same thing: the set is read from the store and written back best-effort.
//! - `grant` / `revoke` write the store first, then re-read the key's full set
//!   and overwrite the cache entry. A failed refresh never fails the write; the
//!   entry is invalidated instead, and if that fails too it stays stale until
//!   the next refresh or eviction.
//!
//! Between a store write and the cache refresh a concurrent reader may see the
//! previous set. That window is accepted: durability is guaranteed before the
//! reply, freshness is not.
//!
//! The service holds no state of its own and is safe to run as many instances
//! as needed against the same store and cache.

use std::sync::Arc;

use permissions_sdk::PermissionSet;
use tracing::{debug, info, warn};

use super::cache::PermissionCache;
use super::error::DomainError;
use super::model::Grant;
use super::repo::{PermissionStore, StoreError};
use super::validation::{ActionCatalog, require_fields};

mod fields {
    pub const API_KEY: &str = "apiKey";
    pub const MODULE: &str = "module";
    pub const ACTION: &str = "action";
}

/// Permissions service.
pub struct Service {
    store: Arc<dyn PermissionStore>,
    cache: Arc<dyn PermissionCache>,
    catalog: ActionCatalog,
}

impl Service {
    #[must_use]
    pub fn new(
        store: Arc<dyn PermissionStore>,
        cache: Arc<dyn PermissionCache>,
        catalog: ActionCatalog,
    ) -> Self {
        Self {
            store,
            cache,
            catalog,
        }
    }

    /// Grant `(module, action)` to `api_key`. Idempotent.
    ///
    /// # Errors
    ///
    /// - `Validation` if a field is empty or the catalog rejects the action
    /// - `Store` if the store write fails
    #[tracing::instrument(skip(self))]
    pub async fn grant(
        &self,
        api_key: &str,
        module: &str,
        action: &str,
    ) -> Result<(), DomainError> {
        validate_triple(api_key, module, action)?;
        self.catalog.validate(module, action)?;

        let grant = Grant::new(api_key, module, action);
        self.store.grant(&grant).await?;
        self.refresh_cache(api_key).await;

        info!("Permission granted");
        Ok(())
    }

    /// Revoke `(module, action)` from `api_key`.
    ///
    /// # Errors
    ///
    /// - `Validation` if a field is empty
    /// - `PermissionNotFound` if the permission was not granted
    /// - `Store` if the store write fails
    #[tracing::instrument(skip(self))]
    pub async fn revoke(
        &self,
        api_key: &str,
        module: &str,
        action: &str,
    ) -> Result<(), DomainError> {
        validate_triple(api_key, module, action)?;

        let grant = Grant::new(api_key, module, action);
        match self.store.revoke(&grant).await {
            Ok(()) => {}
            Err(StoreError::NotFound) => {
                debug!("Nothing to revoke");
                return Err(DomainError::permission_not_found(module, action));
            }
            Err(e) => return Err(e.into()),
        }
        self.refresh_cache(api_key).await;

        info!("Permission revoked");
        Ok(())
    }

    /// Whether `api_key` holds `(module, action)`, compared exactly.
    ///
    /// # Errors
    ///
    /// - `Validation` if a field is empty
    /// - `Store` if the set is not cached and the store read fails
    #[tracing::instrument(skip(self))]
    pub async fn check(
        &self,
        api_key: &str,
        module: &str,
        action: &str,
    ) -> Result<bool, DomainError> {
        validate_triple(api_key, module, action)?;

        let allowed = self.resolve(api_key).await?.contains(module, action);

        debug!(allowed, "Permission check completed");
        Ok(allowed)
    }

    /// Every permission held by `api_key`.
    ///
    /// # Errors
    ///
    /// - `Validation` if `api_key` is empty
    /// - `Store` if the set is not cached and the store read fails
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, api_key: &str) -> Result<PermissionSet, DomainError> {
        require_fields(&[(fields::API_KEY, api_key)])?;

        let permissions = self.resolve(api_key).await?;

        debug!(count = permissions.len(), "Permissions listed");
        Ok(permissions)
    }

    /// Cache-aside read of the permission set.
    async fn resolve(&self, api_key: &str) -> Result<PermissionSet, DomainError> {
        match self.cache.get(api_key).await {
            Ok(Some(permissions)) => {
                debug!("Permission cache hit");
                return Ok(permissions);
            }
            Ok(None) => debug!("Permission cache miss"),
            Err(e) => warn!(error = %e, "Permission cache read failed, reading from store"),
        }

        let permissions = self.store.list(api_key).await?;

        if let Err(e) = self.cache.put(api_key, &permissions).await {
            warn!(error = %e, "Failed to populate permission cache");
        }
        Ok(permissions)
    }

    /// Best-effort overwrite of the cache entry after a store write.
    async fn refresh_cache(&self, api_key: &str) {
        let refreshed = match self.store.list(api_key).await {
            Ok(permissions) => self
                .cache
                .put(api_key, &permissions)
                .await
                .map_err(DomainError::from),
            Err(e) => Err(DomainError::from(e)),
        };

        let Err(e) = refreshed else {
            return;
        };
        warn!(error = %e, "Permission cache refresh failed, invalidating entry");

        if let Err(e) = self.cache.invalidate(api_key).await {
            warn!(
                error = %e,
                "Permission cache invalidation failed, entry stays stale until next refresh"
            );
        }
    }
}

fn validate_triple(api_key: &str, module: &str, action: &str) -> Result<(), DomainError> {
    require_fields(&[
        (fields::API_KEY, api_key),
        (fields::MODULE, module),
        (fields::ACTION, action),
    ])
}
