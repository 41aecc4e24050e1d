//! Node client behaviour against an in-memory resource store
//!
//! Exercises the public API the way a CSI node plugin uses it: parse the
//! volume context, resolve the access chain, extract connection data, and
//! protect the grant with a finalizer while mounted.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

use cosi_node::client::CosiClient;
use cosi_node::context::{BAR_NAMESPACE_KEY, BAR_NAME_KEY, POD_NAMESPACE_KEY, POD_NAME_KEY};
use cosi_node::crd::{
    Bucket, BucketAccess, BucketAccessRequest, BucketAccessRequestSpec,
    BucketAccessRequestStatus, BucketAccessSpec, BucketAccessStatus, BucketRequest, BucketSpec,
    BucketStatus, GcsProtocol, Protocol,
};
use cosi_node::protocol::connection_data;
use cosi_node::{Error, NodeClient, VolumeContext, BUCKET_ACCESS_FINALIZER};

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Default)]
struct Store {
    requests: BTreeMap<(String, String), BucketAccessRequest>,
    accesses: BTreeMap<String, BucketAccess>,
    buckets: BTreeMap<String, Bucket>,
    secrets: BTreeMap<(String, String), Secret>,
    calls: Vec<&'static str>,
}

#[derive(Clone, Default)]
struct FakeClient(Arc<Mutex<Store>>);

impl FakeClient {
    fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl CosiClient for FakeClient {
    async fn get_bucket_access_request(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Option<BucketAccessRequest>, kube::Error> {
        let mut store = self.0.lock().unwrap();
        store.calls.push("bucketAccessRequest");
        Ok(store
            .requests
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn get_bucket_access(&self, name: &str) -> Result<Option<BucketAccess>, kube::Error> {
        let mut store = self.0.lock().unwrap();
        store.calls.push("bucketAccess");
        Ok(store.accesses.get(name).cloned())
    }

    async fn get_bucket_request(
        &self,
        _name: &str,
        _namespace: &str,
    ) -> Result<Option<BucketRequest>, kube::Error> {
        let mut store = self.0.lock().unwrap();
        store.calls.push("bucketRequest");
        Ok(None)
    }

    async fn get_bucket(&self, name: &str) -> Result<Option<Bucket>, kube::Error> {
        let mut store = self.0.lock().unwrap();
        store.calls.push("bucket");
        Ok(store.buckets.get(name).cloned())
    }

    async fn get_secret(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Option<Secret>, kube::Error> {
        let mut store = self.0.lock().unwrap();
        store.calls.push("secret");
        Ok(store
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn update_bucket_access(
        &self,
        access: &BucketAccess,
    ) -> Result<BucketAccess, kube::Error> {
        let mut store = self.0.lock().unwrap();
        store.calls.push("update");
        store.accesses.insert(access.name_any(), access.clone());
        Ok(access.clone())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn seeded() -> FakeClient {
    let fake = FakeClient::default();
    {
        let mut store = fake.0.lock().unwrap();

        let mut bar = BucketAccessRequest::new(
            "photos",
            BucketAccessRequestSpec {
                service_account_name: "gallery".to_string(),
                bucket_request_name: "photos-bucket".to_string(),
                bucket_access_class_name: "read-write".to_string(),
            },
        );
        bar.metadata.namespace = Some("media".to_string());
        bar.status = Some(BucketAccessRequestStatus {
            access_granted: true,
            bucket_access_name: "ba-photos".to_string(),
        });
        store
            .requests
            .insert(("media".to_string(), "photos".to_string()), bar);

        let mut ba = BucketAccess::new(
            "ba-photos",
            BucketAccessSpec {
                bucket_name: "photos-7c1e".to_string(),
                minted_secret_name: "ba-photos-creds".to_string(),
                ..Default::default()
            },
        );
        ba.status = Some(BucketAccessStatus {
            access_granted: true,
        });
        store.accesses.insert("ba-photos".to_string(), ba);

        let mut bucket = Bucket::new(
            "photos-7c1e",
            BucketSpec {
                provisioner: "gcs.objectstorage.k8s.io".to_string(),
                protocol: Protocol {
                    gcs: Some(GcsProtocol {
                        bucket_name: "photos-7c1e".to_string(),
                        project_id: "media-prod".to_string(),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        bucket.status = Some(BucketStatus {
            bucket_available: true,
            message: None,
        });
        store.buckets.insert("photos-7c1e".to_string(), bucket);

        store.secrets.insert(
            ("media".to_string(), "ba-photos-creds".to_string()),
            Secret {
                metadata: ObjectMeta {
                    name: Some("ba-photos-creds".to_string()),
                    namespace: Some("media".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
    }
    fake
}

fn volume_context() -> HashMap<String, String> {
    HashMap::from([
        (BAR_NAME_KEY.to_string(), "photos".to_string()),
        (BAR_NAMESPACE_KEY.to_string(), "media".to_string()),
        (POD_NAME_KEY.to_string(), "gallery-0".to_string()),
        (POD_NAMESPACE_KEY.to_string(), "media".to_string()),
    ])
}

// =============================================================================
// Stories
// =============================================================================

/// Story: a pod mounts a bucket and gets its connection data
#[tokio::test]
async fn story_publish_volume_resolves_connection_data() {
    let fake = seeded();
    let node = NodeClient::new(Arc::new(fake.clone()));

    let ctx = VolumeContext::parse(&volume_context()).unwrap();
    let resolved = node
        .get_resources(&ctx.bar_name, &ctx.bar_namespace)
        .await
        .unwrap();

    assert_eq!(resolved.secret.name_any(), "ba-photos-creds");
    let json: serde_json::Value =
        serde_json::from_slice(&connection_data(&resolved.bucket).unwrap()).unwrap();
    assert_eq!(json["projectID"], "media-prod");
    assert_eq!(
        fake.calls(),
        vec!["bucketAccessRequest", "bucketAccess", "bucket", "secret"]
    );
}

/// Story: the bucket is still provisioning, so the secret is never read
#[tokio::test]
async fn story_unavailable_bucket_short_circuits() {
    let fake = seeded();
    fake.0
        .lock()
        .unwrap()
        .buckets
        .get_mut("photos-7c1e")
        .unwrap()
        .status = None;
    let node = NodeClient::new(Arc::new(fake.clone()));

    let err = node.get_resources("photos", "media").await.unwrap_err();
    assert!(matches!(err, Error::NotReady { .. }));
    assert_eq!(
        fake.calls(),
        vec!["bucketAccessRequest", "bucketAccess", "bucket"]
    );
}

/// Story: the grant is protected while mounted and released on unpublish
#[tokio::test]
async fn story_finalizer_guards_grant_while_mounted() {
    let fake = seeded();
    let node = NodeClient::new(Arc::new(fake.clone()));

    let mut access = node
        .get_resources("photos", "media")
        .await
        .unwrap()
        .bucket_access;
    let original = access.finalizers().to_vec();

    node.add_bucket_access_finalizer(&mut access, BUCKET_ACCESS_FINALIZER)
        .await
        .unwrap();
    let stored = fake.0.lock().unwrap().accesses["ba-photos"].clone();
    assert_eq!(stored.finalizers(), [BUCKET_ACCESS_FINALIZER.to_string()]);

    node.remove_bucket_access_finalizer(&mut access, BUCKET_ACCESS_FINALIZER)
        .await
        .unwrap();
    let stored = fake.0.lock().unwrap().accesses["ba-photos"].clone();
    assert_eq!(stored.finalizers(), original.as_slice());
}

/// Story: a request in another namespace is simply absent
#[tokio::test]
async fn story_wrong_namespace_is_not_found() {
    let fake = seeded();
    let node = NodeClient::new(Arc::new(fake.clone()));

    let err = node.get_resources("photos", "default").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(fake.calls(), vec!["bucketAccessRequest"]);
}
