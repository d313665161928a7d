//! Permissions Module
//!
//! Stores, per API key, the `(module, action)` permissions granted to it and
//! answers grant / revoke / check / list requests over a message bus.
//!
//! The relational store is the source of truth; a key-value cache holding the
//! serialized permission set of each key accelerates `check` and `list`.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use module::PermissionsModule;
