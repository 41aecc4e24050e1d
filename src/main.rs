//! cosi-node - inspect and manage COSI bucket access from a node

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use kube::{CustomResourceExt, ResourceExt};

use cosi_node::client::{CosiClient, KubeCosiClient};
use cosi_node::crd::{Bucket, BucketAccess, BucketAccessRequest, BucketRequest};
use cosi_node::kube_client::{ClientTimeouts, InClusterClientProvider, KubeClientProvider};
use cosi_node::protocol::connection_data;
use cosi_node::telemetry::{init_telemetry, TelemetryConfig};
use cosi_node::{NodeClient, VolumeContext, BUCKET_ACCESS_FINALIZER};

/// cosi-node - resolve COSI bucket access the way the node plugin does
#[derive(Parser, Debug)]
#[command(name = "cosi-node", version, about, long_about = None)]
struct Cli {
    /// Print the COSI CRD manifests and exit
    #[arg(long)]
    crd: bool,

    /// Emit JSON log lines
    #[arg(long, env = "COSI_NODE_LOG_JSON")]
    log_json: bool,

    /// API server connect timeout in seconds
    #[arg(long, env = "COSI_NODE_CONNECT_TIMEOUT_SECS", default_value = "5")]
    connect_timeout_secs: u64,

    /// API request read timeout in seconds
    #[arg(long, env = "COSI_NODE_READ_TIMEOUT_SECS", default_value = "30")]
    read_timeout_secs: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a volume context to its bucket connection data
    ///
    /// Walks BucketAccessRequest -> BucketAccess -> Bucket and the minted
    /// Secret, then prints the bucket's protocol payload.
    Resolve(ResolveArgs),

    /// Add or remove a finalizer on a BucketAccess
    Finalizer {
        #[command(subcommand)]
        action: FinalizerAction,
    },
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Volume context entry as key=value (repeatable)
    #[arg(short = 'c', long = "context", value_parser = parse_key_val)]
    context: Vec<(String, String)>,
}

#[derive(Subcommand, Debug)]
enum FinalizerAction {
    /// Add the finalizer
    Add(FinalizerArgs),
    /// Remove the finalizer
    Remove(FinalizerArgs),
}

#[derive(Parser, Debug)]
struct FinalizerArgs {
    /// BucketAccess name
    #[arg(long)]
    access: String,

    /// Finalizer to add or remove
    #[arg(long, default_value = BUCKET_ACCESS_FINALIZER)]
    finalizer: String,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {s:?}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_telemetry(TelemetryConfig { json: cli.log_json })?;

    if cli.crd {
        let crds = [
            BucketAccessRequest::crd(),
            BucketAccess::crd(),
            BucketRequest::crd(),
            Bucket::crd(),
        ];
        for crd in crds {
            let yaml = serde_yaml::to_string(&crd)
                .map_err(|e| anyhow::anyhow!("Failed to serialize CRD: {}", e))?;
            println!("---\n{yaml}");
        }
        return Ok(());
    }

    let Some(command) = cli.command else {
        anyhow::bail!("no command given, see --help");
    };

    let provider = InClusterClientProvider::new(ClientTimeouts {
        connect: Duration::from_secs(cli.connect_timeout_secs),
        read: Duration::from_secs(cli.read_timeout_secs),
    });
    let kube = provider.create().await?;
    let client = KubeCosiClient::new(kube);
    let node = NodeClient::new(Arc::new(client.clone()));

    match command {
        Commands::Resolve(args) => run_resolve(&node, args).await,
        Commands::Finalizer { action } => run_finalizer(&client, &node, action).await,
    }
}

async fn run_resolve(node: &NodeClient, args: ResolveArgs) -> anyhow::Result<()> {
    let vol_ctx: HashMap<String, String> = args.context.into_iter().collect();
    let ctx = VolumeContext::parse(&vol_ctx)?;

    let resolved = node.get_resources(&ctx.bar_name, &ctx.bar_namespace).await?;
    let protocol: serde_json::Value = serde_json::from_slice(&connection_data(&resolved.bucket)?)?;

    let out = serde_json::json!({
        "pod": format!("{}/{}", ctx.pod_namespace, ctx.pod_name),
        "bucket": resolved.bucket.name_any(),
        "bucketAccess": resolved.bucket_access.name_any(),
        "secret": resolved.secret.name_any(),
        "protocol": protocol,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn run_finalizer(
    client: &KubeCosiClient,
    node: &NodeClient,
    action: FinalizerAction,
) -> anyhow::Result<()> {
    let (args, add) = match action {
        FinalizerAction::Add(args) => (args, true),
        FinalizerAction::Remove(args) => (args, false),
    };

    let mut access = client
        .get_bucket_access(&args.access)
        .await?
        .ok_or_else(|| anyhow::anyhow!("bucketAccess {} not found", args.access))?;

    let stored = if add {
        node.add_bucket_access_finalizer(&mut access, &args.finalizer)
            .await?
    } else {
        node.remove_bucket_access_finalizer(&mut access, &args.finalizer)
            .await?
    };
    println!("{}", stored.finalizers().join("\n"));
    Ok(())
}
