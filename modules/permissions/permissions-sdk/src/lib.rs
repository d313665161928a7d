#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Permissions SDK
//!
//! This crate provides the public contract of the `permissions` module:
//!
//! - [`PermissionsClient`] - Public API trait for consumers
//! - [`BusPermissionsClient`] - Client that talks to the module over a [`msgbus::MessageBus`]
//! - [`Permission`], [`PermissionSet`] - Domain models
//! - [`GrantRequest`], [`RevokeRequest`], [`CheckRequest`], [`ListRequest`] - Request envelopes
//! - [`ResponseEnvelope`], [`ErrorResponse`], [`ErrorCode`] - Response envelopes
//! - [`PermissionsError`] - Error types
//! - [`subjects`] - Bus subjects served by the module
//!
//! ## Usage
//!
//! ```ignore
//! use permissions_sdk::{BusPermissionsClient, CheckRequest, PermissionsClient};
//!
//! let client = BusPermissionsClient::new(bus);
//! let allowed = client
//!     .check(CheckRequest::new("key-123", "inventory", "read"))
//!     .await?;
//! ```

pub mod api;
pub mod bus_client;
pub mod error;
pub mod models;
pub mod subjects;

pub use api::PermissionsClient;
pub use bus_client::BusPermissionsClient;
pub use error::{ErrorCode, PermissionsError};
pub use models::{
    CheckRequest, CheckResponse, ErrorBody, ErrorResponse, GrantRequest, ListRequest,
    ListResponse, Permission, PermissionRequest, PermissionSet, ResponseEnvelope, RevokeRequest,
    Status, StatusResponse,
};
