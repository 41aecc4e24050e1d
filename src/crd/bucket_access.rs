//! BucketAccess CRD
//!
//! The cluster-scoped grant minted for an approved BucketAccessRequest. It
//! names the Bucket and the Secret holding the minted credentials.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{non_empty, ObjectRef};

/// BucketAccess authorizes a principal to use one bucket.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "objectstorage.k8s.io",
    version = "v1alpha1",
    kind = "BucketAccess",
    plural = "bucketaccesses",
    status = "BucketAccessStatus",
    printcolumn = r#"{"name":"Bucket","type":"string","jsonPath":".spec.bucketName"}"#,
    printcolumn = r#"{"name":"Granted","type":"boolean","jsonPath":".status.accessGranted"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BucketAccessSpec {
    /// Name of the Bucket this grant applies to
    #[serde(default)]
    pub bucket_name: String,

    /// The request this grant was minted for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_access_request: Option<ObjectRef>,

    /// Service account bound to the grant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<ObjectRef>,

    /// Name of the Secret holding minted credentials
    #[serde(default)]
    pub minted_secret_name: String,

    /// Policy actions handed to the provisioner
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub policy_actions_config_map_data: String,

    /// Provider-side identity the credentials belong to
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub principal: String,

    /// Opaque provisioner parameters
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

/// BucketAccess status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketAccessStatus {
    /// Whether the provisioner granted access
    #[serde(default)]
    pub access_granted: bool,
}

impl BucketAccess {
    /// Returns true once the provisioner has granted access
    pub fn access_granted(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.access_granted)
    }

    /// Name of the Bucket, if set
    pub fn bucket_name(&self) -> Option<&str> {
        non_empty(&self.spec.bucket_name)
    }

    /// Name of the minted credentials Secret, if set
    pub fn minted_secret_name(&self) -> Option<&str> {
        non_empty(&self.spec.minted_secret_name)
    }
}
