//! Inconsistent objects reported by the remote engine.

use serde::{Deserialize, Serialize};

/// One remote configuration entity that is invalid or orphaned.
///
/// Produced fresh by every reconciliation query and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InconsistentObject {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub description: String,
    pub reason: String,
}

impl InconsistentObject {
    pub fn new(
        name: impl Into<String>,
        object_type: impl Into<String>,
        description: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            object_type: object_type.into(),
            description: description.into(),
            reason: reason.into(),
        }
    }
}

/// Result of asking the engine for its self-reported consistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InconsistencyStatus {
    pub is_consistent: bool,
    #[serde(default)]
    pub objects: Vec<InconsistentObject>,
}

impl InconsistencyStatus {
    pub fn consistent() -> Self {
        Self {
            is_consistent: true,
            objects: Vec::new(),
        }
    }

    /// Consistent iff `objects` is empty.
    pub fn from_objects(objects: Vec<InconsistentObject>) -> Self {
        Self {
            is_consistent: objects.is_empty(),
            objects,
        }
    }
}
