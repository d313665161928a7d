//! In-process bus backed by tokio channels.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};

use crate::config::BusConfig;
use crate::error::BusError;
use crate::{Incoming, MessageBus, Reply, Subscription};

#[derive(Default)]
struct Route {
    responders: Vec<mpsc::Sender<Incoming>>,
    next: usize,
}

impl Route {
    /// Round-robin over live responders, forgetting the ones whose
    /// subscription was dropped.
    fn pick(&mut self) -> Option<mpsc::Sender<Incoming>> {
        self.responders.retain(|tx| !tx.is_closed());
        if self.responders.is_empty() {
            return None;
        }
        let idx = self.next % self.responders.len();
        self.next = self.next.wrapping_add(1);
        Some(self.responders[idx].clone())
    }
}

/// Bus that never leaves the current process.
///
/// Queue-group semantics: every request is delivered to one subscriber of
/// the subject.
pub struct InProcessBus {
    routes: DashMap<String, Route>,
    request_timeout: Duration,
    capacity: usize,
}

impl InProcessBus {
    #[must_use]
    pub fn new(cfg: &BusConfig) -> Self {
        Self {
            routes: DashMap::new(),
            request_timeout: cfg.request_timeout(),
            capacity: cfg.capacity(),
        }
    }

    fn responder(&self, subject: &str) -> Option<mpsc::Sender<Incoming>> {
        self.routes.get_mut(subject).and_then(|mut route| route.pick())
    }
}

impl Default for InProcessBus {
    fn default() -> Self {
        Self::new(&BusConfig::default())
    }
}

struct OneshotReply(oneshot::Sender<Bytes>);

#[async_trait]
impl Reply for OneshotReply {
    async fn send(self: Box<Self>, payload: Bytes) -> Result<(), BusError> {
        self.0.send(payload).map_err(|_| BusError::Closed)
    }
}

#[async_trait]
impl MessageBus for InProcessBus {
    async fn request(&self, subject: &str, payload: Bytes) -> Result<Bytes, BusError> {
        let responder = self
            .responder(subject)
            .ok_or_else(|| BusError::no_responders(subject))?;

        let (tx, rx) = oneshot::channel();
        let incoming = Incoming::new(subject, payload, Box::new(OneshotReply(tx)));

        let exchange = async {
            responder
                .send(incoming)
                .await
                .map_err(|_| BusError::no_responders(subject))?;
            rx.await.map_err(|_| BusError::NoReply {
                subject: subject.to_owned(),
            })
        };

        tokio::time::timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| BusError::Timeout {
                subject: subject.to_owned(),
                timeout: self.request_timeout,
            })?
    }

    async fn subscribe(&self, subject: &str) -> Result<Subscription, BusError> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.routes
            .entry(subject.to_owned())
            .or_default()
            .responders
            .push(tx);
        tracing::debug!(subject, "In-process subscription registered");
        Ok(Subscription::new(subject, rx))
    }
}
