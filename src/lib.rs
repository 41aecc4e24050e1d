//! COSI node client
//!
//! Node-side helper for a Container Object Storage Interface driver. Given a
//! pod's volume context it resolves the chain
//! BucketAccessRequest -> BucketAccess -> Bucket (+ minted Secret) and yields
//! the bucket's connection data, and it manages the BucketAccess finalizer
//! that protects the grant while the bucket is mounted.
//!
//! # Modules
//!
//! - [`context`] - Volume context parsing
//! - [`crd`] - Typed `objectstorage.k8s.io/v1alpha1` resources
//! - [`client`] - API access trait and its kube-rs implementation
//! - [`resolver`] - Chained lookups with readiness checks
//! - [`protocol`] - Bucket connection data extraction
//! - [`finalizer`] - BucketAccess finalizer add/remove
//! - [`kube_client`] - Kubernetes client construction
//! - [`telemetry`] - Logging setup
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod client;
pub mod context;
pub mod crd;
pub mod error;
pub mod finalizer;
pub mod kube_client;
pub mod protocol;
pub mod resolver;
pub mod telemetry;

pub use context::VolumeContext;
pub use error::Error;
pub use resolver::{NodeClient, ResolvedResources};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Finalizer the node places on a BucketAccess while it is in use
pub const BUCKET_ACCESS_FINALIZER: &str = "cosi.objectstorage.k8s.io/bucketaccess-protection";
