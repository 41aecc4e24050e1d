//! Kubernetes client construction for the node plugin
//!
//! The node plugin runs as a DaemonSet and talks to the API server through
//! its pod service account. Timeouts are set by the caller (CLI flags) since
//! a stalled lookup blocks the volume publish that triggered it.

use std::time::Duration;

use kube::{Client, Config};
use tracing::debug;

/// User agent sent with every API request
pub const USER_AGENT: &str = concat!("cosi-node/", env!("CARGO_PKG_VERSION"));

/// Timeouts applied to every client
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientTimeouts {
    /// TCP/TLS connect timeout
    pub connect: Duration,
    /// Per-request read timeout
    pub read: Duration,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            read: Duration::from_secs(30),
        }
    }
}

/// Source of Kubernetes clients, mocked in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait KubeClientProvider: Send + Sync {
    /// Create a new Kubernetes client
    async fn create(&self) -> Result<Client, kube::Error>;
}

/// Builds clients from the inferred config: the pod's service account when
/// running in-cluster, the local kubeconfig otherwise
#[derive(Clone, Debug, Default)]
pub struct InClusterClientProvider {
    timeouts: ClientTimeouts,
}

impl InClusterClientProvider {
    /// Create a provider with the given timeouts
    pub fn new(timeouts: ClientTimeouts) -> Self {
        Self { timeouts }
    }

    /// Apply the node's timeouts and user agent to a config
    pub fn configure(&self, mut config: Config) -> Config {
        config.connect_timeout = Some(self.timeouts.connect);
        config.read_timeout = Some(self.timeouts.read);
        config
            .headers
            .push((http::header::USER_AGENT, http::HeaderValue::from_static(USER_AGENT)));
        config
    }

    /// Build a client from an explicit config
    pub fn client_for(&self, config: Config) -> Result<Client, kube::Error> {
        let config = self.configure(config);
        debug!(
            cluster_url = %config.cluster_url,
            connect_timeout = ?self.timeouts.connect,
            read_timeout = ?self.timeouts.read,
            "building kube client"
        );
        Client::try_from(config)
    }
}

#[async_trait::async_trait]
impl KubeClientProvider for InClusterClientProvider {
    async fn create(&self) -> Result<Client, kube::Error> {
        let config = Config::infer().await.map_err(kube::Error::InferConfig)?;
        self.client_for(config)
    }
}
