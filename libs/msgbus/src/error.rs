//! Bus error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by a [`MessageBus`](crate::MessageBus) backend.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("no responders for subject '{subject}'")]
    NoResponders { subject: String },

    #[error("request on '{subject}' timed out after {timeout:?}")]
    Timeout { subject: String, timeout: Duration },

    #[error("responder dropped the request on '{subject}' without replying")]
    NoReply { subject: String },

    #[error("requester is gone")]
    Closed,

    #[error("transport error: {0}")]
    Transport(String),
}

impl BusError {
    pub fn no_responders(subject: impl Into<String>) -> Self {
        Self::NoResponders {
            subject: subject.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}
