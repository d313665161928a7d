//! Bus surface: one request/reply subject per operation.

pub mod handlers;
pub mod router;

pub use router::RequestRouter;
