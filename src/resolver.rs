//! Access chain resolution
//!
//! A workload's BucketAccessRequest points at a BucketAccess, which points at
//! a Bucket and a minted credentials Secret. [`NodeClient`] walks that chain
//! one lookup at a time and stops at the first link that is missing or not
//! ready. Nothing is retried; the caller decides whether to try again.

use std::sync::Arc;

use k8s_openapi::api::core::v1::Secret;
use tracing::{error, info, instrument};

use crate::client::{CosiClient, KubeCosiClient};
use crate::crd::{Bucket, BucketAccess, BucketAccessRequest, BucketRequest};
use crate::kube_client::KubeClientProvider;
use crate::{Error, Result};

pub(crate) const KIND_BUCKET_ACCESS_REQUEST: &str = "bucketAccessRequest";
pub(crate) const KIND_BUCKET_ACCESS: &str = "bucketAccess";
pub(crate) const KIND_BUCKET_REQUEST: &str = "bucketRequest";
pub(crate) const KIND_BUCKET: &str = "bucket";
pub(crate) const KIND_SECRET: &str = "secret";

/// Everything a node needs to publish a bucket into a pod
#[derive(Clone, Debug)]
pub struct ResolvedResources {
    /// The bucket being accessed
    pub bucket: Bucket,
    /// The grant authorizing access
    pub bucket_access: BucketAccess,
    /// The minted credentials
    pub secret: Secret,
}

/// Node-side client for the COSI access chain
#[derive(Clone)]
pub struct NodeClient {
    pub(crate) client: Arc<dyn CosiClient>,
}

/// Log an error at the point it is produced and hand it back
pub(crate) fn logged(err: Error) -> Error {
    error!(error = %err, kind = err.resource_kind().unwrap_or("-"), "cosi lookup failed");
    err
}

fn namespaced(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

impl NodeClient {
    /// Create a node client over the given API access
    pub fn new(client: Arc<dyn CosiClient>) -> Self {
        Self { client }
    }

    /// Create a node client backed by a real Kubernetes client
    pub async fn from_provider(provider: &dyn KubeClientProvider) -> Result<Self> {
        let client = provider.create().await?;
        Ok(Self::new(Arc::new(KubeCosiClient::new(client))))
    }

    /// Get a BucketAccessRequest and require it to be granted
    ///
    /// Fails unless `status.accessGranted` is true and both
    /// `spec.bucketRequestName` and `status.bucketAccessName` are set.
    #[instrument(skip(self))]
    pub async fn get_bucket_access_request(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<BucketAccessRequest> {
        let id = namespaced(namespace, name);
        info!(bucket_access_request = %id, "getting bucketAccessRequest");

        let bar = self
            .client
            .get_bucket_access_request(name, namespace)
            .await
            .map_err(|e| logged(Error::lookup(KIND_BUCKET_ACCESS_REQUEST, &id, e)))?
            .ok_or_else(|| logged(Error::not_found(KIND_BUCKET_ACCESS_REQUEST, &id)))?;

        if !bar.access_granted() {
            return Err(logged(Error::not_ready(
                KIND_BUCKET_ACCESS_REQUEST,
                id,
                "does not grant access",
            )));
        }
        if bar.bucket_request_name().is_none() {
            return Err(logged(Error::field_unset(
                KIND_BUCKET_ACCESS_REQUEST,
                "spec.bucketRequestName",
            )));
        }
        if bar.bucket_access_name().is_none() {
            return Err(logged(Error::field_unset(
                KIND_BUCKET_ACCESS_REQUEST,
                "status.bucketAccessName",
            )));
        }
        Ok(bar)
    }

    /// Get a BucketAccess and require it to be granted with minted credentials
    #[instrument(skip(self))]
    pub async fn get_bucket_access(&self, name: &str) -> Result<BucketAccess> {
        info!(bucket_access = %name, "getting bucketAccess");

        let ba = self
            .client
            .get_bucket_access(name)
            .await
            .map_err(|e| logged(Error::lookup(KIND_BUCKET_ACCESS, name, e)))?
            .ok_or_else(|| logged(Error::not_found(KIND_BUCKET_ACCESS, name)))?;

        if !ba.access_granted() {
            return Err(logged(Error::not_ready(
                KIND_BUCKET_ACCESS,
                name,
                "does not grant access",
            )));
        }
        if ba.minted_secret_name().is_none() {
            return Err(logged(Error::field_unset(
                KIND_BUCKET_ACCESS,
                "spec.mintedSecretName",
            )));
        }
        Ok(ba)
    }

    /// Get a BucketRequest and require its bucket to be available
    #[instrument(skip(self))]
    pub async fn get_bucket_request(&self, name: &str, namespace: &str) -> Result<BucketRequest> {
        let id = namespaced(namespace, name);
        info!(bucket_request = %id, "getting bucketRequest");

        let br = self
            .client
            .get_bucket_request(name, namespace)
            .await
            .map_err(|e| logged(Error::lookup(KIND_BUCKET_REQUEST, &id, e)))?
            .ok_or_else(|| logged(Error::not_found(KIND_BUCKET_REQUEST, &id)))?;

        if !br.bucket_available() {
            return Err(logged(Error::not_ready(
                KIND_BUCKET_REQUEST,
                id,
                "is not available yet",
            )));
        }
        if br.bucket_name().is_none() {
            return Err(logged(Error::field_unset(
                KIND_BUCKET_REQUEST,
                "status.bucketName",
            )));
        }
        Ok(br)
    }

    /// Get a Bucket and require it to be available
    #[instrument(skip(self))]
    pub async fn get_bucket(&self, name: &str) -> Result<Bucket> {
        info!(bucket = %name, "getting bucket");

        let bucket = self
            .client
            .get_bucket(name)
            .await
            .map_err(|e| logged(Error::lookup(KIND_BUCKET, name, e)))?
            .ok_or_else(|| logged(Error::not_found(KIND_BUCKET, name)))?;

        if !bucket.bucket_available() {
            return Err(logged(Error::not_ready(
                KIND_BUCKET,
                name,
                "is not available yet",
            )));
        }
        Ok(bucket)
    }

    /// Get a Secret
    #[instrument(skip(self))]
    pub async fn get_secret(&self, name: &str, namespace: &str) -> Result<Secret> {
        let id = namespaced(namespace, name);
        info!(secret = %id, "getting secret");

        self.client
            .get_secret(name, namespace)
            .await
            .map_err(|e| logged(Error::lookup(KIND_SECRET, &id, e)))?
            .ok_or_else(|| logged(Error::not_found(KIND_SECRET, id)))
    }

    /// Resolve a BucketAccessRequest to its Bucket, BucketAccess and Secret
    ///
    /// Lookups run in order and the chain stops at the first failure. The
    /// Secret is read from the access request's namespace.
    pub async fn get_resources(&self, name: &str, namespace: &str) -> Result<ResolvedResources> {
        let bar = self.get_bucket_access_request(name, namespace).await?;

        // Presence checked by get_bucket_access_request
        let access_name = bar.bucket_access_name().unwrap_or_default();
        let bucket_access = self.get_bucket_access(access_name).await?;

        let bucket_name = bucket_access.bucket_name().unwrap_or_default();
        let bucket = self.get_bucket(bucket_name).await?;

        let secret_name = bucket_access.minted_secret_name().unwrap_or_default();
        let secret = self.get_secret(secret_name, namespace).await?;

        Ok(ResolvedResources {
            bucket,
            bucket_access,
            secret,
        })
    }
}
