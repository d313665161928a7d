#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Request/reply message bus.
//!
//! Services only need two things from a bus: "send a request to a subject and
//! wait for one reply", and "receive every request addressed to a subject and
//! answer it". This crate provides:
//!
//! - [`MessageBus`] - the transport-neutral trait
//! - [`Subscription`] / [`Incoming`] - the responder side of an exchange
//! - [`InProcessBus`] - a tokio-channel backed bus for tests and single-process deployments
//! - `nats::NatsBus` - NATS binding (feature `nats`)
//!
//! ## Usage
//!
//! ```ignore
//! let bus: Arc<dyn MessageBus> = Arc::new(InProcessBus::new(&BusConfig::default()));
//!
//! let mut sub = bus.subscribe("echo").await?;
//! tokio::spawn(async move {
//!     while let Some(msg) = sub.next().await {
//!         let payload = msg.payload().clone();
//!         msg.respond(payload).await.ok();
//!     }
//! });
//!
//! let reply = bus.request("echo", Bytes::from_static(b"ping")).await?;
//! ```

pub mod config;
pub mod error;
pub mod in_process;
#[cfg(feature = "nats")]
pub mod nats;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

pub use config::{BusBackend, BusConfig};
pub use error::BusError;
pub use in_process::InProcessBus;

/// Transport-neutral request/reply bus.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Send `payload` to `subject` and wait for exactly one reply.
    ///
    /// # Errors
    ///
    /// - `NoResponders` if nobody listens on `subject`
    /// - `Timeout` if no reply arrives within the configured request timeout
    /// - `NoReply` if the responder dropped the request without answering
    /// - `Transport` for backend failures
    async fn request(&self, subject: &str, payload: Bytes) -> Result<Bytes, BusError>;

    /// Register as a responder for `subject`.
    ///
    /// When several subscriptions exist for one subject, each request is
    /// delivered to exactly one of them.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the backend rejects the subscription.
    async fn subscribe(&self, subject: &str) -> Result<Subscription, BusError>;
}

/// Answer channel of a single request.
#[async_trait]
pub trait Reply: Send {
    /// Deliver the reply payload to the requester.
    ///
    /// # Errors
    ///
    /// Returns `Closed` when the requester is gone (e.g. it timed out), or
    /// `Transport` for backend failures.
    async fn send(self: Box<Self>, payload: Bytes) -> Result<(), BusError>;
}

/// A request delivered to a responder.
pub struct Incoming {
    subject: String,
    payload: Bytes,
    reply: Box<dyn Reply>,
}

impl Incoming {
    pub fn new(subject: impl Into<String>, payload: Bytes, reply: Box<dyn Reply>) -> Self {
        Self {
            subject: subject.into(),
            payload,
            reply,
        }
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Answer the request. Consumes the message: every request gets one reply.
    ///
    /// # Errors
    ///
    /// See [`Reply::send`].
    pub async fn respond(self, payload: Bytes) -> Result<(), BusError> {
        self.reply.send(payload).await
    }
}

impl std::fmt::Debug for Incoming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Incoming")
            .field("subject", &self.subject)
            .field("payload_len", &self.payload.len())
            .finish_non_exhaustive()
    }
}

/// Stream of requests for one subject.
///
/// Dropping the subscription unregisters the responder.
#[derive(Debug)]
pub struct Subscription {
    subject: String,
    rx: mpsc::Receiver<Incoming>,
}

impl Subscription {
    pub fn new(subject: impl Into<String>, rx: mpsc::Receiver<Incoming>) -> Self {
        Self {
            subject: subject.into(),
            rx,
        }
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Next request, or `None` once the bus side is closed.
    pub async fn next(&mut self) -> Option<Incoming> {
        self.rx.recv().await
    }

    /// Stop accepting new requests. Requests already queued are still
    /// returned by [`next`](Self::next), which yields `None` once they are
    /// drained.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
