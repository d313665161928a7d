//! Picks the bus and cache backends named in the configuration.

use std::sync::Arc;

use msgbus::{BusBackend, InProcessBus, MessageBus};
use permissions::config::CacheBackend;
use permissions::domain::PermissionCache;
use permissions::infra::cache::InMemoryPermissionCache;
use tracing::{info, warn};

use crate::config::AppConfig;

pub struct Backends {
    pub bus: Arc<dyn MessageBus>,
    pub cache: Arc<dyn PermissionCache>,
}

/// Build the backends. One NATS connection is shared when both the bus and
/// the cache use NATS.
///
/// # Errors
///
/// Fails when a backend is unreachable, or is not compiled in.
pub async fn build(cfg: &AppConfig) -> anyhow::Result<Backends> {
    #[cfg(feature = "nats")]
    let nats = if cfg.bus.backend == BusBackend::Nats
        || cfg.permissions.cache.backend == CacheBackend::NatsKv
    {
        Some(msgbus::nats::connect(&cfg.bus.url).await?)
    } else {
        None
    };

    let bus: Arc<dyn MessageBus> = match cfg.bus.backend {
        BusBackend::InProcess => {
            warn!("In-process bus selected: requests are only accepted from this process");
            Arc::new(InProcessBus::new(&cfg.bus))
        }
        #[cfg(feature = "nats")]
        BusBackend::Nats => {
            let client = nats
                .clone()
                .ok_or_else(|| anyhow::anyhow!("NATS client missing for the nats bus"))?;
            info!(url = %cfg.bus.url, queue_group = ?cfg.bus.queue_group, "Using NATS bus");
            Arc::new(msgbus::nats::NatsBus::new(client, &cfg.bus))
        }
        #[cfg(not(feature = "nats"))]
        BusBackend::Nats => {
            anyhow::bail!("bus backend 'nats' requires the `nats` feature")
        }
    };

    let cache: Arc<dyn PermissionCache> = match cfg.permissions.cache.backend {
        CacheBackend::Memory => {
            info!(ttl = ?cfg.permissions.cache.ttl(), "Using in-memory permission cache");
            Arc::new(InMemoryPermissionCache::new(cfg.permissions.cache.ttl()))
        }
        #[cfg(feature = "nats")]
        CacheBackend::NatsKv => {
            let client =
                nats.ok_or_else(|| anyhow::anyhow!("NATS client missing for the nats_kv cache"))?;
            let bucket = &cfg.permissions.cache.bucket;
            info!(bucket = %bucket, "Using NATS KV permission cache");
            Arc::new(
                permissions::infra::cache::NatsKvPermissionCache::open(client, bucket).await?,
            )
        }
        #[cfg(not(feature = "nats"))]
        CacheBackend::NatsKv => {
            anyhow::bail!("cache backend 'nats_kv' requires the `nats` feature")
        }
    };

    Ok(Backends { bus, cache })
}
