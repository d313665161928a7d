//! Public error types for the `permissions` module.
//!
//! These errors are safe to expose to other modules and consumers. Each one
//! carries a stable wire [`ErrorCode`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ErrorBody, ErrorResponse};

/// Machine-readable error code carried in every error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "apiKey_not_found")]
    ApiKeyNotFound,
    #[serde(rename = "db_error")]
    DbError,
    #[serde(rename = "cache_error")]
    CacheError,
    #[serde(rename = "invalid_payload")]
    InvalidPayload,
    #[serde(rename = "internal_error")]
    InternalError,
    #[serde(rename = "permission_not_found")]
    PermissionNotFound,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiKeyNotFound => "apiKey_not_found",
            Self::DbError => "db_error",
            Self::CacheError => "cache_error",
            Self::InvalidPayload => "invalid_payload",
            Self::InternalError => "internal_error",
            Self::PermissionNotFound => "permission_not_found",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can be returned by a [`PermissionsClient`](crate::PermissionsClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionsError {
    /// The request is missing a required field or could not be decoded.
    #[error("{message}")]
    InvalidPayload { message: String },

    /// Revoke targeted a permission that was never granted.
    #[error("Permission not found")]
    PermissionNotFound,

    /// The API key is unknown.
    #[error("API key not found")]
    ApiKeyNotFound,

    /// The durable store failed.
    #[error("Database operation failed")]
    Database,

    /// The cache failed.
    #[error("Cache operation failed")]
    Cache,

    /// Anything unclassified.
    #[error("Internal server error")]
    Internal,

    /// The request never reached the service or the reply was unreadable.
    /// Only produced on the client side.
    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl PermissionsError {
    /// Create an `InvalidPayload` error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }

    /// Create a `Transport` error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPayload { .. } => ErrorCode::InvalidPayload,
            Self::PermissionNotFound => ErrorCode::PermissionNotFound,
            Self::ApiKeyNotFound => ErrorCode::ApiKeyNotFound,
            Self::Database => ErrorCode::DbError,
            Self::Cache => ErrorCode::CacheError,
            Self::Internal | Self::Transport { .. } => ErrorCode::InternalError,
        }
    }

    /// Wire form of this error.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        }
    }
}

impl From<ErrorResponse> for PermissionsError {
    fn from(response: ErrorResponse) -> Self {
        let ErrorBody { code, message } = response.error;
        match code {
            ErrorCode::InvalidPayload => Self::InvalidPayload { message },
            ErrorCode::PermissionNotFound => Self::PermissionNotFound,
            ErrorCode::ApiKeyNotFound => Self::ApiKeyNotFound,
            ErrorCode::DbError => Self::Database,
            ErrorCode::CacheError => Self::Cache,
            ErrorCode::InternalError => Self::Internal,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn error_codes_use_wire_spelling() {
        let encoded = serde_json::to_string(&[
            ErrorCode::ApiKeyNotFound,
            ErrorCode::DbError,
            ErrorCode::CacheError,
            ErrorCode::InvalidPayload,
            ErrorCode::InternalError,
            ErrorCode::PermissionNotFound,
        ])
        .unwrap();

        assert_eq!(
            encoded,
            r#"["apiKey_not_found","db_error","cache_error","invalid_payload","internal_error","permission_not_found"]"#
        );
    }

    #[test]
    fn invalid_payload_message_is_passed_through() {
        let err = PermissionsError::invalid_payload("Missing required field: apiKey");
        let response = err.to_response();

        assert_eq!(response.error.code, ErrorCode::InvalidPayload);
        assert_eq!(response.error.message, "Missing required field: apiKey");
    }

    #[test]
    fn transport_errors_surface_as_internal_on_the_wire() {
        let err = PermissionsError::transport("timed out");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[test]
    fn error_response_converts_back_by_code() {
        let response = PermissionsError::PermissionNotFound.to_response();
        assert_eq!(
            PermissionsError::from(response),
            PermissionsError::PermissionNotFound
        );
    }
}
