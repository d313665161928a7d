use async_trait::async_trait;
use permissions_sdk::PermissionSet;
use thiserror::Error;

/// Failures reported by a [`PermissionCache`].
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache entry for '{api_key}' is unreadable: {reason}")]
    Corrupt { api_key: String, reason: String },
}

impl CacheError {
    pub fn unavailable(message: impl ToString) -> Self {
        Self::Unavailable(message.to_string())
    }
}

/// Disposable `api_key -> PermissionSet` view of the store.
///
/// An entry may vanish at any time; the next read rebuilds it.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    async fn get(&self, api_key: &str) -> Result<Option<PermissionSet>, CacheError>;

    async fn put(&self, api_key: &str, permissions: &PermissionSet) -> Result<(), CacheError>;

    async fn invalidate(&self, api_key: &str) -> Result<(), CacheError>;
}
