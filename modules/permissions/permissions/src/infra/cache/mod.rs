//! [`PermissionCache`](crate::domain::PermissionCache) backends.
//!
//! Entries hold the JSON encoding of a key's [`PermissionSet`], the same
//! array shape `list` returns, so any backend stores plain bytes.

pub mod memory;
#[cfg(feature = "nats")]
pub mod nats_kv;

use bytes::Bytes;
use permissions_sdk::PermissionSet;

use crate::domain::CacheError;

pub use memory::InMemoryPermissionCache;
#[cfg(feature = "nats")]
pub use nats_kv::NatsKvPermissionCache;

pub(crate) fn encode_entry(permissions: &PermissionSet) -> Result<Bytes, CacheError> {
    serde_json::to_vec(permissions)
        .map(Bytes::from)
        .map_err(CacheError::unavailable)
}

/// Bucket key for an API key.
///
/// KV keys only admit `[-/_=.a-zA-Z0-9]` and treat `.` as a token separator,
/// so the API key is stored hex-encoded. Distinct API keys map to distinct
/// bucket keys.
#[cfg_attr(not(feature = "nats"), allow(dead_code))]
pub(crate) fn bucket_key(api_key: &str) -> String {
    hex::encode(api_key.as_bytes())
}

/// An undecodable entry is reported as corrupt; callers treat it like a miss.
pub(crate) fn decode_entry(api_key: &str, raw: &[u8]) -> Result<PermissionSet, CacheError> {
    serde_json::from_slice(raw).map_err(|e| CacheError::Corrupt {
        api_key: api_key.to_owned(),
        reason: e.to_string(),
    })
}
