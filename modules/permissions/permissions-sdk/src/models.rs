//! Models and wire envelopes for the `permissions` module.
//!
//! Field names follow the JSON contract (`apiKey`, `module`, `action`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, PermissionsError};

/// A two-part permission identifier: a functional area and an operation in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Permission {
    pub module: String,
    pub action: String,
}

impl Permission {
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
        }
    }

    /// Exact, case-sensitive match on both parts.
    #[must_use]
    pub fn matches(&self, module: &str, action: &str) -> bool {
        self.module == module && self.action == action
    }
}

/// Permissions held by one API key.
///
/// Transported as a JSON array; order carries no meaning and duplicates are
/// dropped on construction, decoding included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Permission>", into = "Vec<Permission>")]
pub struct PermissionSet(Vec<Permission>);

impl PermissionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, module: &str, action: &str) -> bool {
        self.0.iter().any(|p| p.matches(module, action))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Permission> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Permission> {
        self.0
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let items = iter
            .into_iter()
            .filter(|permission| seen.insert(permission.clone()))
            .collect();
        Self(items)
    }
}

impl From<Vec<Permission>> for PermissionSet {
    fn from(items: Vec<Permission>) -> Self {
        items.into_iter().collect()
    }
}

impl From<PermissionSet> for Vec<Permission> {
    fn from(set: PermissionSet) -> Self {
        set.0
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Permission;
    type IntoIter = std::slice::Iter<'a, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Request addressing one `(apiKey, module, action)` triple.
///
/// Missing fields decode as empty strings so that validation, not decoding,
/// reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PermissionRequest {
    pub api_key: String,
    pub module: String,
    pub action: String,
}

impl PermissionRequest {
    pub fn new(
        api_key: impl Into<String>,
        module: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            module: module.into(),
            action: action.into(),
        }
    }
}

pub type GrantRequest = PermissionRequest;
pub type RevokeRequest = PermissionRequest;
pub type CheckRequest = PermissionRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListRequest {
    pub api_key: String,
}

impl ListRequest {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
}

/// `{"status": "ok"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: Status,
}

impl StatusResponse {
    #[must_use]
    pub const fn ok() -> Self {
        Self { status: Status::Ok }
    }
}

/// `{"allowed": bool}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub allowed: bool,
}

/// `{"permissions": [{"module", "action"}, ...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub permissions: PermissionSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

/// `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Reply to any request: the success payload or an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope<T> {
    Success(T),
    Error(ErrorResponse),
}

impl<T> ResponseEnvelope<T> {
    /// # Errors
    ///
    /// Returns the decoded [`PermissionsError`] for error envelopes.
    pub fn into_result(self) -> Result<T, PermissionsError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Error(response) => Err(response.into()),
        }
    }
}

impl<T> From<Result<T, PermissionsError>> for ResponseEnvelope<T> {
    fn from(result: Result<T, PermissionsError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(e) => Self::Error(e.to_response()),
        }
    }
}
