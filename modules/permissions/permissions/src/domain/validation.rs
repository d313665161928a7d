//! Request validation: required fields and the optional action vocabulary.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::error::DomainError;

/// Fail with a validation error naming every empty field.
///
/// Presence check only: identifiers are otherwise opaque.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), DomainError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

    match missing.as_slice() {
        [] => Ok(()),
        [field] => Err(DomainError::validation(format!(
            "Missing required field: {field}"
        ))),
        _ => Err(DomainError::validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        ))),
    }
}

/// Allowed actions per module.
///
/// An empty catalog accepts any `(module, action)` pair.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    modules: HashMap<String, HashSet<String>>,
}

impl ActionCatalog {
    #[must_use]
    pub fn from_config(actions: &BTreeMap<String, Vec<String>>) -> Self {
        let modules = actions
            .iter()
            .map(|(module, acts)| (module.clone(), acts.iter().cloned().collect()))
            .collect();
        Self { modules }
    }

    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.modules.is_empty()
    }

    /// # Errors
    ///
    /// Returns a validation error if the catalog is restricted and does not
    /// list `module`, or lists it without `action`.
    pub fn validate(&self, module: &str, action: &str) -> Result<(), DomainError> {
        if self.is_unrestricted() {
            return Ok(());
        }
        let Some(allowed) = self.modules.get(module) else {
            return Err(DomainError::validation(format!("Unknown module: {module}")));
        };
        if allowed.contains(action) {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "Action '{action}' is not defined for module '{module}'"
            )))
        }
    }
}
