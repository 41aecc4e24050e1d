//! Bucket connection data extraction
//!
//! The node writes the bucket's protocol payload into the pod as JSON. Only
//! the first populated variant (s3, azureBlob, gcs) is written.

use kube::ResourceExt;
use tracing::info;

use crate::crd::Bucket;
use crate::resolver::logged;
use crate::{Error, Result};

/// Serialize the bucket's populated protocol variant to JSON bytes
///
/// Fails if no known variant is set. If several are set, the first in
/// priority order wins without complaint.
pub fn connection_data(bucket: &Bucket) -> Result<Vec<u8>> {
    info!(bucket = %bucket.name_any(), protocol = ?bucket.spec.protocol, "bucket protocol");

    let connection = bucket
        .spec
        .protocol
        .connection()
        .ok_or_else(|| logged(Error::unrecognized_protocol(bucket.name_any())))?;

    connection.to_json().map_err(|e| {
        logged(Error::serialization_for_kind(
            "Bucket",
            format!("{} protocol: {}", connection.name(), e),
        ))
    })
}
