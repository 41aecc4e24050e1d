//! Supporting types shared by the COSI CRDs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to another Kubernetes object
///
/// Mirrors the subset of `core/v1.ObjectReference` the COSI resources use to
/// point back at the request that produced them.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    /// Name of the referenced object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Namespace of the referenced object (unset for cluster-scoped kinds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// UID of the referenced object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// What happens to the backing bucket when a Bucket is deleted
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Keep the backing bucket
    #[default]
    Retain,
    /// Delete the backing bucket
    Delete,
}

impl std::fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retain => write!(f, "Retain"),
            Self::Delete => write!(f, "Delete"),
        }
    }
}

/// Returns the value when it is non-empty
pub(crate) fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
