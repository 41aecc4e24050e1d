//! BucketRequest CRD
//!
//! A namespaced request for a bucket. Once provisioned, `status.bucketName`
//! names the cluster-scoped Bucket.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::non_empty;

/// BucketRequest asks the provisioner for a new bucket.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "objectstorage.k8s.io",
    version = "v1alpha1",
    kind = "BucketRequest",
    namespaced,
    status = "BucketRequestStatus",
    printcolumn = r#"{"name":"Available","type":"boolean","jsonPath":".status.bucketAvailable"}"#,
    printcolumn = r#"{"name":"Bucket","type":"string","jsonPath":".status.bucketName"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BucketRequestSpec {
    /// Prefix for the generated bucket name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bucket_prefix: String,

    /// BucketClass used to provision the bucket
    #[serde(default)]
    pub bucket_class_name: String,
}

/// BucketRequest status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketRequestStatus {
    /// Whether the bucket has been provisioned
    #[serde(default)]
    pub bucket_available: bool,

    /// Name of the provisioned Bucket
    #[serde(default)]
    pub bucket_name: String,
}

impl BucketRequest {
    /// Returns true once the bucket has been provisioned
    pub fn bucket_available(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.bucket_available)
    }

    /// Name of the provisioned Bucket, if set
    pub fn bucket_name(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| non_empty(&s.bucket_name))
    }
}
