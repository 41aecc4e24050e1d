//! Custom Resource Definitions for the COSI object storage API
//!
//! Typed views of the `objectstorage.k8s.io/v1alpha1` resources the node
//! client reads. The COSI controller owns their lifecycle.

mod bucket;
mod bucket_access;
mod bucket_access_request;
mod bucket_request;
mod types;

pub use bucket::{
    AzureProtocol, Bucket, BucketSpec, BucketStatus, GcsProtocol, Protocol, ProtocolConnection,
    S3Protocol, S3SignatureVersion,
};
pub use bucket_access::{BucketAccess, BucketAccessSpec, BucketAccessStatus};
pub use bucket_access_request::{
    BucketAccessRequest, BucketAccessRequestSpec, BucketAccessRequestStatus,
};
pub use bucket_request::{BucketRequest, BucketRequestSpec, BucketRequestStatus};
pub use types::{DeletionPolicy, ObjectRef};
