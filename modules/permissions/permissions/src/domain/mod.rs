//! Domain layer for the permissions module.
//!
//! ## Layering Rules
//!
//! The domain layer:
//! - **MAY** import: `permissions_sdk` (contract types)
//! - **MUST NOT** import: `api::*` or `infra::*`; collaborators are reached
//!   through the [`PermissionStore`] and [`PermissionCache`] ports only

pub mod cache;
pub mod error;
pub mod local_client;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

#[cfg(test)]
mod service_test;

pub use cache::{CacheError, PermissionCache};
pub use error::DomainError;
pub use local_client::PermissionsLocalClient;
pub use model::Grant;
pub use repo::{PermissionStore, StoreError};
pub use service::Service;
pub use validation::ActionCatalog;
