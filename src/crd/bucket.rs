//! Bucket CRD
//!
//! The cluster-scoped record for a provisioned bucket. `spec.protocol` carries
//! the connection details workloads need, as exactly one of a closed set of
//! protocol variants.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{DeletionPolicy, ObjectRef};

/// Bucket describes one provisioned storage bucket.
///
/// Example:
/// ```yaml
/// apiVersion: objectstorage.k8s.io/v1alpha1
/// kind: Bucket
/// metadata:
///   name: bucket-abc
/// spec:
///   bucketID: uploads-7f3a
///   provisioner: s3.objectstorage.k8s.io
///   bucketClassName: standard
///   protocol:
///     s3:
///       endpoint: https://s3.us-east-1.amazonaws.com
///       bucketName: uploads-7f3a
///       region: us-east-1
///       signatureVersion: S3V4
/// ```
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "objectstorage.k8s.io",
    version = "v1alpha1",
    kind = "Bucket",
    status = "BucketStatus",
    printcolumn = r#"{"name":"Provisioner","type":"string","jsonPath":".spec.provisioner"}"#,
    printcolumn = r#"{"name":"Available","type":"boolean","jsonPath":".status.bucketAvailable"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BucketSpec {
    /// Provider-side identifier of the bucket
    #[serde(default, rename = "bucketID", skip_serializing_if = "String::is_empty")]
    pub bucket_id: String,

    /// Name of the driver that provisioned the bucket
    #[serde(default)]
    pub provisioner: String,

    /// BucketClass the bucket was provisioned from
    #[serde(default)]
    pub bucket_class_name: String,

    /// The BucketRequest that produced this bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_request: Option<ObjectRef>,

    /// Namespaces allowed to request access
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_namespaces: Vec<String>,

    /// Connection details
    #[serde(default)]
    pub protocol: Protocol,

    /// Opaque provisioner parameters
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,

    /// What happens to the backing bucket on deletion
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

/// Bucket status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketStatus {
    /// Whether the bucket is ready for use
    #[serde(default)]
    pub bucket_available: bool,

    /// Human-readable message from the provisioner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Protocol connection details. At most one variant is expected to be set.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    /// S3-compatible object store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Protocol>,

    /// Azure Blob storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_blob: Option<AzureProtocol>,

    /// Google Cloud Storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcs: Option<GcsProtocol>,
}

/// S3 request signing scheme
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum S3SignatureVersion {
    /// Signature version 2
    S3V2,
    /// Signature version 4
    #[default]
    S3V4,
}

/// S3 connection details
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct S3Protocol {
    /// Service endpoint URL
    #[serde(default)]
    pub endpoint: String,
    /// Bucket name on the service
    #[serde(default)]
    pub bucket_name: String,
    /// Region
    #[serde(default)]
    pub region: String,
    /// Request signing scheme
    #[serde(default)]
    pub signature_version: S3SignatureVersion,
}

/// Azure Blob connection details
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AzureProtocol {
    /// Blob container name
    #[serde(default)]
    pub container_name: String,
    /// Storage account holding the container
    #[serde(default)]
    pub storage_account: String,
}

/// Google Cloud Storage connection details
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GcsProtocol {
    /// Bucket name on the service
    #[serde(default)]
    pub bucket_name: String,
    /// Name of the service account key
    #[serde(default)]
    pub private_key_name: String,
    /// GCP project
    #[serde(default, rename = "projectID")]
    pub project_id: String,
    /// GCP service account email
    #[serde(default)]
    pub service_account: String,
}

/// A borrowed view of the selected protocol variant
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProtocolConnection<'a> {
    /// S3 connection
    S3(&'a S3Protocol),
    /// Azure Blob connection
    AzureBlob(&'a AzureProtocol),
    /// GCS connection
    Gcs(&'a GcsProtocol),
}

impl ProtocolConnection<'_> {
    /// Short name of the variant, as it appears under `spec.protocol`
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3(_) => "s3",
            Self::AzureBlob(_) => "azureBlob",
            Self::Gcs(_) => "gcs",
        }
    }

    /// Serialize the variant's payload to JSON bytes
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Self::S3(p) => serde_json::to_vec(p),
            Self::AzureBlob(p) => serde_json::to_vec(p),
            Self::Gcs(p) => serde_json::to_vec(p),
        }
    }
}

impl Protocol {
    /// Select the populated variant, checking s3, azureBlob, then gcs.
    ///
    /// When more than one is set the first in that order wins.
    pub fn connection(&self) -> Option<ProtocolConnection<'_>> {
        if let Some(s3) = &self.s3 {
            return Some(ProtocolConnection::S3(s3));
        }
        if let Some(azure) = &self.azure_blob {
            return Some(ProtocolConnection::AzureBlob(azure));
        }
        self.gcs.as_ref().map(ProtocolConnection::Gcs)
    }
}

impl Bucket {
    /// Returns true once the bucket is ready for use
    pub fn bucket_available(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.bucket_available)
    }
}
