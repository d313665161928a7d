//! Bus configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which transport carries the requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusBackend {
    /// Tokio channels inside the current process.
    #[default]
    InProcess,
    /// NATS server (requires the `nats` feature).
    Nats,
}

/// Configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusConfig {
    pub backend: BusBackend,

    /// Server URL, used by the `nats` backend.
    pub url: String,

    /// Queue group shared by all instances of a service, so that each request
    /// is answered by one instance only.
    pub queue_group: Option<String>,

    /// How long a requester waits for a reply.
    pub request_timeout_ms: u64,

    /// Buffered requests per subscription before senders wait.
    pub channel_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            backend: BusBackend::InProcess,
            url: "nats://localhost:4222".to_owned(),
            queue_group: Some("permissions".to_owned()),
            request_timeout_ms: 5_000,
            channel_capacity: 256,
        }
    }
}

impl BusConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Capacity with a floor of one; a zero-sized channel cannot be built.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.channel_capacity.max(1)
    }
}
