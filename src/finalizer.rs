//! BucketAccess finalizer handling
//!
//! The node adds a finalizer to the BucketAccess while a pod has the bucket
//! mounted, and removes it on unpublish. Both operations write the whole
//! object back with a replace; there is no conflict retry.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use tracing::info;

use crate::crd::BucketAccess;
use crate::resolver::{logged, NodeClient, KIND_BUCKET_ACCESS};
use crate::{Error, Result};

/// Add `finalizer` to the metadata unless already present.
///
/// Returns true if the list changed.
pub fn add_finalizer(meta: &mut ObjectMeta, finalizer: &str) -> bool {
    let finalizers = meta.finalizers.get_or_insert_with(Vec::new);
    if finalizers.iter().any(|f| f == finalizer) {
        return false;
    }
    finalizers.push(finalizer.to_string());
    true
}

/// Remove every occurrence of `finalizer` from the metadata.
///
/// Returns true if the list changed. A list emptied by the removal is unset.
pub fn remove_finalizer(meta: &mut ObjectMeta, finalizer: &str) -> bool {
    let Some(finalizers) = meta.finalizers.as_mut() else {
        return false;
    };
    let before = finalizers.len();
    finalizers.retain(|f| f != finalizer);
    let removed = finalizers.len() != before;
    if removed && finalizers.is_empty() {
        meta.finalizers = None;
    }
    removed
}

impl NodeClient {
    /// Add a finalizer to a BucketAccess and persist it
    ///
    /// `access` is updated in place; the stored object returned by the API
    /// server is handed back.
    pub async fn add_bucket_access_finalizer(
        &self,
        access: &mut BucketAccess,
        finalizer: &str,
    ) -> Result<BucketAccess> {
        let changed = add_finalizer(&mut access.metadata, finalizer);
        info!(bucket_access = %access.name_any(), %finalizer, changed, "adding bucketAccess finalizer");
        self.update_bucket_access(access).await
    }

    /// Remove a finalizer from a BucketAccess and persist it
    pub async fn remove_bucket_access_finalizer(
        &self,
        access: &mut BucketAccess,
        finalizer: &str,
    ) -> Result<BucketAccess> {
        let changed = remove_finalizer(&mut access.metadata, finalizer);
        info!(bucket_access = %access.name_any(), %finalizer, changed, "removing bucketAccess finalizer");
        self.update_bucket_access(access).await
    }

    async fn update_bucket_access(&self, access: &BucketAccess) -> Result<BucketAccess> {
        self.client
            .update_bucket_access(access)
            .await
            .map_err(|e| logged(Error::update(KIND_BUCKET_ACCESS, access.name_any(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::client::MockCosiClient;
    use crate::resolver::tests::{api_error, granted_access};

    const MARKER: &str = "cosi.objectstorage.k8s.io/bucketaccess-protection";

    /// Mock that echoes updates back and records what was written
    fn recording_client(writes: Arc<Mutex<Vec<Vec<String>>>>) -> NodeClient {
        let mut mock = MockCosiClient::new();
        mock.expect_update_bucket_access().returning(move |ba| {
            writes
                .lock()
                .unwrap()
                .push(ba.finalizers().to_vec());
            Ok(ba.clone())
        });
        NodeClient::new(Arc::new(mock))
    }

    #[test]
    fn add_is_idempotent() {
        let mut meta = ObjectMeta::default();
        assert!(add_finalizer(&mut meta, MARKER));
        assert!(!add_finalizer(&mut meta, MARKER));
        assert_eq!(meta.finalizers, Some(vec![MARKER.to_string()]));
    }

    #[test]
    fn remove_missing_marker_is_noop() {
        let mut meta = ObjectMeta {
            finalizers: Some(vec!["other".to_string()]),
            ..Default::default()
        };
        assert!(!remove_finalizer(&mut meta, MARKER));
        assert_eq!(meta.finalizers, Some(vec!["other".to_string()]));

        let mut empty = ObjectMeta::default();
        assert!(!remove_finalizer(&mut empty, MARKER));
        assert_eq!(empty.finalizers, None);
    }

    #[test]
    fn remove_drops_duplicates() {
        let mut meta = ObjectMeta {
            finalizers: Some(vec![
                MARKER.to_string(),
                "other".to_string(),
                MARKER.to_string(),
            ]),
            ..Default::default()
        };
        assert!(remove_finalizer(&mut meta, MARKER));
        assert_eq!(meta.finalizers, Some(vec!["other".to_string()]));
    }

    #[test]
    fn add_then_remove_restores_original_list() {
        for original in [
            None,
            Some(vec!["a".to_string()]),
            Some(vec!["a".to_string(), "b".to_string()]),
        ] {
            let mut meta = ObjectMeta {
                finalizers: original.clone(),
                ..Default::default()
            };
            add_finalizer(&mut meta, MARKER);
            remove_finalizer(&mut meta, MARKER);
            assert_eq!(meta.finalizers, original);
        }
    }

    #[tokio::test]
    async fn add_persists_the_marker() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let node = recording_client(writes.clone());
        let mut ba = granted_access();

        let stored = node.add_bucket_access_finalizer(&mut ba, MARKER).await.unwrap();
        assert_eq!(stored.finalizers(), [MARKER.to_string()]);
        assert_eq!(ba.finalizers(), [MARKER.to_string()]);
        assert_eq!(*writes.lock().unwrap(), vec![vec![MARKER.to_string()]]);
    }

    #[tokio::test]
    async fn add_then_remove_round_trip_through_updates() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let node = recording_client(writes.clone());
        let mut ba = granted_access();
        ba.metadata.finalizers = Some(vec!["cosi.objectstorage.k8s.io/controller".to_string()]);
        let original = ba.finalizers().to_vec();

        node.add_bucket_access_finalizer(&mut ba, MARKER).await.unwrap();
        node.remove_bucket_access_finalizer(&mut ba, MARKER).await.unwrap();

        assert_eq!(ba.finalizers(), original.as_slice());
        let writes = writes.lock().unwrap();
        assert_eq!(writes.len(), 2);
        assert!(writes[0].contains(&MARKER.to_string()));
        assert_eq!(writes[1], original);
    }

    #[tokio::test]
    async fn update_is_sent_even_when_unchanged() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let node = recording_client(writes.clone());
        let mut ba = granted_access();

        node.remove_bucket_access_finalizer(&mut ba, MARKER).await.unwrap();
        assert_eq!(writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_failure_is_wrapped() {
        let mut mock = MockCosiClient::new();
        mock.expect_update_bucket_access()
            .times(1)
            .returning(|_| Err(api_error(409)));
        let node = NodeClient::new(Arc::new(mock));
        let mut ba = granted_access();

        let err = node
            .add_bucket_access_finalizer(&mut ba, MARKER)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Update { kind: KIND_BUCKET_ACCESS, .. }));
        assert!(err.to_string().starts_with("update bucketAccess ba-1234 failed"));
    }
}
