//! NATS binding.

use std::time::Duration;

use async_nats::client::RequestErrorKind;
use async_nats::{Client, Subject};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;

pub use async_nats;

use crate::config::BusConfig;
use crate::error::BusError;
use crate::{Incoming, MessageBus, Reply, Subscription};

/// Connect to the NATS server at `url`.
///
/// # Errors
///
/// Returns `Transport` if the server cannot be reached.
pub async fn connect(url: &str) -> Result<Client, BusError> {
    let client = async_nats::connect(url)
        .await
        .map_err(|e| BusError::transport(format!("failed to connect to {url}: {e}")))?;
    tracing::info!(url, "Connected to NATS");
    Ok(client)
}

/// Bus over a NATS connection.
pub struct NatsBus {
    client: Client,
    queue_group: Option<String>,
    request_timeout: Duration,
    capacity: usize,
}

impl NatsBus {
    #[must_use]
    pub fn new(client: Client, cfg: &BusConfig) -> Self {
        Self {
            client,
            queue_group: cfg.queue_group.clone(),
            request_timeout: cfg.request_timeout(),
            capacity: cfg.capacity(),
        }
    }

    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }
}

struct NatsReply {
    client: Client,
    subject: Subject,
}

#[async_trait]
impl Reply for NatsReply {
    async fn send(self: Box<Self>, payload: Bytes) -> Result<(), BusError> {
        self.client
            .publish(self.subject, payload)
            .await
            .map_err(|e| BusError::transport(e.to_string()))
    }
}

#[async_trait]
impl MessageBus for NatsBus {
    async fn request(&self, subject: &str, payload: Bytes) -> Result<Bytes, BusError> {
        let pending = self.client.request(subject.to_owned(), payload);
        let message = tokio::time::timeout(self.request_timeout, pending)
            .await
            .map_err(|_| BusError::Timeout {
                subject: subject.to_owned(),
                timeout: self.request_timeout,
            })?
            .map_err(|e| match e.kind() {
                RequestErrorKind::NoResponders => BusError::no_responders(subject),
                RequestErrorKind::TimedOut => BusError::Timeout {
                    subject: subject.to_owned(),
                    timeout: self.request_timeout,
                },
                RequestErrorKind::Other => BusError::transport(e.to_string()),
            })?;
        Ok(message.payload)
    }

    async fn subscribe(&self, subject: &str) -> Result<Subscription, BusError> {
        let subscribed = match &self.queue_group {
            Some(group) => {
                self.client
                    .queue_subscribe(subject.to_owned(), group.clone())
                    .await
            }
            None => self.client.subscribe(subject.to_owned()).await,
        };
        let mut subscriber = subscribed.map_err(|e| BusError::transport(e.to_string()))?;

        let (tx, rx) = mpsc::channel(self.capacity);
        let client = self.client.clone();
        let name = subject.to_owned();
        // Dropping `subscriber` unsubscribes from the server.
        tokio::spawn(async move {
            loop {
                let message = tokio::select! {
                    () = tx.closed() => break,
                    next = subscriber.next() => match next {
                        Some(message) => message,
                        None => break,
                    },
                };
                let Some(reply_to) = message.reply else {
                    tracing::warn!(subject = %name, "Dropping message without reply subject");
                    continue;
                };
                let reply = NatsReply {
                    client: client.clone(),
                    subject: reply_to,
                };
                let incoming =
                    Incoming::new(message.subject.to_string(), message.payload, Box::new(reply));
                if tx.send(incoming).await.is_err() {
                    break;
                }
            }
            tracing::debug!(subject = %name, "NATS subscription closed");
        });

        Ok(Subscription::new(subject, rx))
    }
}
