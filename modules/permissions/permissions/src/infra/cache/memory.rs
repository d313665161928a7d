use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use permissions_sdk::PermissionSet;

use super::{decode_entry, encode_entry};
use crate::domain::{CacheError, PermissionCache};

struct Entry {
    raw: Bytes,
    stored_at: Instant,
}

/// Process-local cache. Each replica holds its own view; use a shared
/// backend when several replicas serve the same keys.
pub struct InMemoryPermissionCache {
    entries: DashMap<String, Entry>,
    ttl: Option<Duration>,
}

impl InMemoryPermissionCache {
    #[must_use]
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.ttl.is_some_and(|ttl| entry.stored_at.elapsed() >= ttl)
    }
}

impl Default for InMemoryPermissionCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl PermissionCache for InMemoryPermissionCache {
    async fn get(&self, api_key: &str) -> Result<Option<PermissionSet>, CacheError> {
        // No map guard may be held across `remove_if`.
        let fresh = self
            .entries
            .get(api_key)
            .map(|entry| (!self.is_expired(&entry)).then(|| entry.raw.clone()));

        match fresh {
            None => Ok(None),
            Some(None) => {
                self.entries.remove_if(api_key, |_, entry| self.is_expired(entry));
                Ok(None)
            }
            Some(Some(raw)) => decode_entry(api_key, &raw).map(Some),
        }
    }

    async fn put(&self, api_key: &str, permissions: &PermissionSet) -> Result<(), CacheError> {
        let raw = encode_entry(permissions)?;
        self.entries.insert(
            api_key.to_owned(),
            Entry {
                raw,
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn invalidate(&self, api_key: &str) -> Result<(), CacheError> {
        self.entries.remove(api_key);
        Ok(())
    }
}
