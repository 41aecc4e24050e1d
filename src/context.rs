//! Volume context parsing
//!
//! The CSI node plugin hands us the volume context as a flat string map. Four
//! keys identify the access request and the pod mounting the volume.

use std::collections::HashMap;

use tracing::info;

use crate::{Error, Result};

/// Key holding the BucketAccessRequest name
pub const BAR_NAME_KEY: &str = "bar-name";
/// Key holding the BucketAccessRequest namespace
pub const BAR_NAMESPACE_KEY: &str = "bar-namespace";
/// Key the CSI driver sets to the pod name
pub const POD_NAME_KEY: &str = "csi.storage.k8s.io/pod.name";
/// Key the CSI driver sets to the pod namespace
pub const POD_NAMESPACE_KEY: &str = "csi.storage.k8s.io/pod.namespace";

/// Identifiers extracted from a volume context
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VolumeContext {
    /// BucketAccessRequest name
    pub bar_name: String,
    /// BucketAccessRequest namespace
    pub bar_namespace: String,
    /// Name of the pod mounting the volume
    pub pod_name: String,
    /// Namespace of the pod mounting the volume
    pub pod_namespace: String,
}

impl VolumeContext {
    /// Parse the four required keys, failing on the first one missing.
    ///
    /// Keys are checked in order: `bar-name`, `bar-namespace`, pod name, pod
    /// namespace. Empty values are accepted.
    pub fn parse(vol_ctx: &HashMap<String, String>) -> Result<Self> {
        info!("parsing bucketAccessRequest namespace/name from volume context");
        Ok(Self {
            bar_name: required(vol_ctx, BAR_NAME_KEY)?,
            bar_namespace: required(vol_ctx, BAR_NAMESPACE_KEY)?,
            pod_name: required(vol_ctx, POD_NAME_KEY)?,
            pod_namespace: required(vol_ctx, POD_NAMESPACE_KEY)?,
        })
    }
}

fn required(vol_ctx: &HashMap<String, String>, key: &str) -> Result<String> {
    vol_ctx
        .get(key)
        .cloned()
        .ok_or_else(|| Error::missing_context_key(key))
}
