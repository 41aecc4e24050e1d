//! Kubernetes access for the COSI resources
//!
//! The resolver only talks to the API server through [`CosiClient`], so tests
//! can swap in a mock and count which lookups were attempted.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, PostParams};
use kube::{Client, ResourceExt};
use serde::de::DeserializeOwned;

#[cfg(test)]
use mockall::automock;

use crate::crd::{Bucket, BucketAccess, BucketAccessRequest, BucketRequest};

/// Trait abstracting the API calls the node client makes
///
/// Lookups return `Ok(None)` when the object does not exist; every other
/// API failure is passed through untouched.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CosiClient: Send + Sync {
    /// Get a namespaced BucketAccessRequest
    async fn get_bucket_access_request(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Option<BucketAccessRequest>, kube::Error>;

    /// Get a cluster-scoped BucketAccess
    async fn get_bucket_access(&self, name: &str) -> Result<Option<BucketAccess>, kube::Error>;

    /// Get a namespaced BucketRequest
    async fn get_bucket_request(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Option<BucketRequest>, kube::Error>;

    /// Get a cluster-scoped Bucket
    async fn get_bucket(&self, name: &str) -> Result<Option<Bucket>, kube::Error>;

    /// Get a Secret by name and namespace
    async fn get_secret(&self, name: &str, namespace: &str)
        -> Result<Option<Secret>, kube::Error>;

    /// Replace a BucketAccess with the given value
    async fn update_bucket_access(
        &self,
        access: &BucketAccess,
    ) -> Result<BucketAccess, kube::Error>;
}

/// Real Kubernetes client implementation
#[derive(Clone)]
pub struct KubeCosiClient {
    client: Client,
}

impl KubeCosiClient {
    /// Create a new client wrapper
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Fetch by name, mapping 404 to `None`
async fn get_opt<K>(api: Api<K>, name: &str) -> Result<Option<K>, kube::Error>
where
    K: Clone + DeserializeOwned + std::fmt::Debug,
{
    match api.get(name).await {
        Ok(obj) => Ok(Some(obj)),
        Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl CosiClient for KubeCosiClient {
    async fn get_bucket_access_request(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Option<BucketAccessRequest>, kube::Error> {
        get_opt(Api::namespaced(self.client.clone(), namespace), name).await
    }

    async fn get_bucket_access(&self, name: &str) -> Result<Option<BucketAccess>, kube::Error> {
        get_opt(Api::all(self.client.clone()), name).await
    }

    async fn get_bucket_request(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Option<BucketRequest>, kube::Error> {
        get_opt(Api::namespaced(self.client.clone(), namespace), name).await
    }

    async fn get_bucket(&self, name: &str) -> Result<Option<Bucket>, kube::Error> {
        get_opt(Api::all(self.client.clone()), name).await
    }

    async fn get_secret(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Option<Secret>, kube::Error> {
        get_opt(Api::namespaced(self.client.clone(), namespace), name).await
    }

    async fn update_bucket_access(
        &self,
        access: &BucketAccess,
    ) -> Result<BucketAccess, kube::Error> {
        let api: Api<BucketAccess> = Api::all(self.client.clone());
        api.replace(&access.name_any(), &PostParams::default(), access)
            .await
    }
}
