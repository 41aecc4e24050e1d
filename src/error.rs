//! Error types for the COSI node client
//!
//! Every variant names the resource kind and identifier involved so a single
//! log line is enough to tell which link of the access chain broke.

use thiserror::Error;

/// Main error type for node client operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A required volume context key was absent
    #[error("required volume context key unset: {key}")]
    MissingContextKey {
        /// The missing key
        key: String,
    },

    /// The API server rejected or failed a lookup
    #[error("get {kind} {name} failed: {source}")]
    Lookup {
        /// Resource kind (e.g. "bucketAccess")
        kind: &'static str,
        /// Resource identifier, `namespace/name` for namespaced kinds
        name: String,
        /// The underlying kube-rs error
        #[source]
        source: kube::Error,
    },

    /// The API server rejected an update
    #[error("update {kind} {name} failed: {source}")]
    Update {
        /// Resource kind
        kind: &'static str,
        /// Resource identifier
        name: String,
        /// The underlying kube-rs error
        #[source]
        source: kube::Error,
    },

    /// The lookup succeeded but returned no object
    #[error("{kind} is nil {name:?}")]
    NotFound {
        /// Resource kind
        kind: &'static str,
        /// Resource identifier
        name: String,
    },

    /// The resource exists but its readiness flag is false
    #[error("{kind} {message} {name:?}")]
    NotReady {
        /// Resource kind
        kind: &'static str,
        /// Resource identifier
        name: String,
        /// What is not ready (e.g. "does not grant access")
        message: String,
    },

    /// A field the chain depends on is empty
    #[error("{kind}.{field} unset")]
    FieldUnset {
        /// Resource kind
        kind: &'static str,
        /// Field path (e.g. "spec.mintedSecretName")
        field: &'static str,
    },

    /// No known protocol variant is populated on the bucket
    #[error("unrecognized protocol on bucket {bucket:?}, unable to extract connection data")]
    UnrecognizedProtocol {
        /// Bucket name
        bucket: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized
        kind: String,
    },

    /// Kubernetes API error outside a named lookup (e.g. client setup)
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },
}

impl Error {
    /// Create a missing context key error
    pub fn missing_context_key(key: impl Into<String>) -> Self {
        Self::MissingContextKey { key: key.into() }
    }

    /// Wrap a failed lookup of `kind`/`name`
    pub fn lookup(kind: &'static str, name: impl Into<String>, source: kube::Error) -> Self {
        Self::Lookup {
            kind,
            name: name.into(),
            source,
        }
    }

    /// Wrap a failed update of `kind`/`name`
    pub fn update(kind: &'static str, name: impl Into<String>, source: kube::Error) -> Self {
        Self::Update {
            kind,
            name: name.into(),
            source,
        }
    }

    /// Create a nil-result error
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create a not-ready error
    pub fn not_ready(
        kind: &'static str,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::NotReady {
            kind,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an unset-field error
    pub fn field_unset(kind: &'static str, field: &'static str) -> Self {
        Self::FieldUnset { kind, field }
    }

    /// Create an unrecognized protocol error
    pub fn unrecognized_protocol(bucket: impl Into<String>) -> Self {
        Self::UnrecognizedProtocol {
            bucket: bucket.into(),
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: kind.into(),
        }
    }

    /// Get the resource kind if this error is tied to one
    pub fn resource_kind(&self) -> Option<&str> {
        match self {
            Error::Lookup { kind, .. }
            | Error::Update { kind, .. }
            | Error::NotFound { kind, .. }
            | Error::NotReady { kind, .. }
            | Error::FieldUnset { kind, .. } => Some(*kind),
            Error::UnrecognizedProtocol { .. } => Some("bucket"),
            Error::Serialization { kind, .. } => Some(kind.as_str()),
            Error::MissingContextKey { .. } | Error::Kube { .. } => None,
        }
    }

    /// Returns true if the resource does not exist
    ///
    /// Covers both a nil result and a 404 from the API server.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Lookup {
                source: kube::Error::Api(ae),
                ..
            }
            | Error::Update {
                source: kube::Error::Api(ae),
                ..
            }
            | Error::Kube {
                source: kube::Error::Api(ae),
            } => ae.code == 404,
            _ => false,
        }
    }
}
