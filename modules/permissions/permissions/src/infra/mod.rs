//! Infrastructure adapters for the domain ports.

pub mod cache;
pub mod storage;
