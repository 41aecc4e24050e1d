//! Logging initialization
//!
//! Installs a `tracing` subscriber filtered by `RUST_LOG`. JSON output is
//! meant for running inside the node plugin pod; plain text for terminals.
//! Logs go to stderr so command output on stdout stays machine-readable.

use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info,cosi_node=debug,kube=info,tower=warn,hyper=warn";

/// Errors that can occur during telemetry initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Configuration for telemetry initialization
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Build a subscriber whose formatted output goes to `writer`
pub fn subscriber<W>(config: &TelemetryConfig, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Clone + Send + Sync + 'static,
{
    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_writer(writer.clone())
    });
    let text_layer =
        (!config.json).then(|| tracing_subscriber::fmt::layer().with_writer(writer));

    Box::new(
        tracing_subscriber::registry()
            .with(env_filter())
            .with(json_layer)
            .with(text_layer),
    )
}

/// Install the global subscriber, logging to stderr
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), TelemetryError> {
    subscriber(&config, std::io::stderr)
        .try_init()
        .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}
