//! Bus subjects served by the permissions module.

pub const GRANT: &str = "permissions.grant";
pub const REVOKE: &str = "permissions.revoke";
pub const CHECK: &str = "permissions.check";
pub const LIST: &str = "permissions.list";

/// Every subject the module answers on.
pub const ALL: [&str; 4] = [GRANT, REVOKE, CHECK, LIST];
