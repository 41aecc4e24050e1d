//! BucketAccessRequest CRD
//!
//! A namespaced request by a workload to use a bucket. Once the COSI
//! controller approves it, `status.bucketAccessName` names the cluster-scoped
//! BucketAccess grant.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::non_empty;

/// BucketAccessRequest asks for credentials to a bucket on behalf of a workload.
///
/// Example:
/// ```yaml
/// apiVersion: objectstorage.k8s.io/v1alpha1
/// kind: BucketAccessRequest
/// metadata:
///   name: my-access
///   namespace: apps
/// spec:
///   serviceAccountName: uploader
///   bucketRequestName: my-bucket
///   bucketAccessClassName: standard
/// ```
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "objectstorage.k8s.io",
    version = "v1alpha1",
    kind = "BucketAccessRequest",
    namespaced,
    status = "BucketAccessRequestStatus",
    printcolumn = r#"{"name":"Granted","type":"boolean","jsonPath":".status.accessGranted"}"#,
    printcolumn = r#"{"name":"Access","type":"string","jsonPath":".status.bucketAccessName"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BucketAccessRequestSpec {
    /// Service account the workload runs as
    #[serde(default)]
    pub service_account_name: String,

    /// Name of the BucketRequest this access targets
    #[serde(default)]
    pub bucket_request_name: String,

    /// BucketAccessClass used to mint the grant
    #[serde(default)]
    pub bucket_access_class_name: String,
}

/// BucketAccessRequest status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketAccessRequestStatus {
    /// Whether the controller approved the request
    #[serde(default)]
    pub access_granted: bool,

    /// Name of the BucketAccess minted for this request
    #[serde(default)]
    pub bucket_access_name: String,
}

impl BucketAccessRequest {
    /// Returns true once the request has been approved
    pub fn access_granted(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.access_granted)
    }

    /// Name of the BucketRequest, if set
    pub fn bucket_request_name(&self) -> Option<&str> {
        non_empty(&self.spec.bucket_request_name)
    }

    /// Name of the granted BucketAccess, if set
    pub fn bucket_access_name(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| non_empty(&s.bucket_access_name))
    }
}
