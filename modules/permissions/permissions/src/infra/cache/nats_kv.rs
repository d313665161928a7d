//! Cache backend on a NATS `JetStream` key-value bucket, keyed by the
//! hex-encoded API key.

use async_nats::jetstream::{self, kv};
use async_trait::async_trait;
use permissions_sdk::PermissionSet;
use tracing::info;

use super::{bucket_key, decode_entry, encode_entry};
use crate::domain::{CacheError, PermissionCache};

/// Shared cache for every replica connected to the same NATS deployment.
pub struct NatsKvPermissionCache {
    store: kv::Store,
}

impl NatsKvPermissionCache {
    /// Bind to `bucket`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if `JetStream` is not enabled or the
    /// bucket can be neither opened nor created.
    pub async fn open(client: async_nats::Client, bucket: &str) -> Result<Self, CacheError> {
        let js = jetstream::new(client);

        let store = match js.get_key_value(bucket).await {
            Ok(store) => store,
            Err(open_err) => {
                info!(bucket, error = %open_err, "Creating permission cache bucket");
                js.create_key_value(kv::Config {
                    bucket: bucket.to_owned(),
                    history: 1,
                    ..Default::default()
                })
                .await
                .map_err(CacheError::unavailable)?
            }
        };

        Ok(Self { store })
    }
}

#[async_trait]
impl PermissionCache for NatsKvPermissionCache {
    async fn get(&self, api_key: &str) -> Result<Option<PermissionSet>, CacheError> {
        let raw = self
            .store
            .get(bucket_key(api_key))
            .await
            .map_err(CacheError::unavailable)?;

        raw.map(|raw| decode_entry(api_key, &raw)).transpose()
    }

    async fn put(&self, api_key: &str, permissions: &PermissionSet) -> Result<(), CacheError> {
        let raw = encode_entry(permissions)?;
        self.store
            .put(bucket_key(api_key), raw)
            .await
            .map_err(CacheError::unavailable)?;
        Ok(())
    }

    async fn invalidate(&self, api_key: &str) -> Result<(), CacheError> {
        self.store
            .delete(bucket_key(api_key))
            .await
            .map_err(CacheError::unavailable)
    }
}
