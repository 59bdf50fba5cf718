//! krill Kubelet
//!
//! The kubelet runs on each node and turns declarative Pods into running
//! containers by driving a CRI-compatible runtime over gRPC.
//!
//! Each invocation performs one lifecycle operation against the runtime:
//! create a pod from a manifest, query or list pod status, or tear a pod
//! down. Ctrl-C cancels the in-flight operation at the next step boundary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use krill_api::Pod;
use krill_kubelet::{Config, GrpcConnector, PodReconciler};

/// krill kubelet - Run and inspect Pods on this node.
#[derive(Debug, Parser)]
#[command(name = "kubelet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Runtime endpoint (unix:// socket or http:// address).
    #[arg(long, global = true, env = "KRILL_RUNTIME_ENDPOINT")]
    runtime_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a pod from a YAML manifest.
    Create {
        /// Path to the pod manifest.
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },

    /// Show the observed status of a pod.
    Status {
        /// Sandbox ID returned by `create`.
        sandbox_id: String,
    },

    /// List all pod sandboxes on this node.
    List,

    /// Stop and remove a pod.
    Teardown {
        /// Sandbox ID returned by `create`.
        sandbox_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(endpoint) = cli.runtime_endpoint {
        config.runtime_endpoint = endpoint;
    }
    info!(runtime_endpoint = %config.runtime_endpoint, "Configuration loaded");

    let connector = GrpcConnector::new(&config);
    let reconciler = PodReconciler::new(connector, config);

    // Ctrl-C cancels the in-flight operation at the next step boundary.
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Received interrupt, cancelling");
                cancel.cancel();
            }
        }
    });

    match cli.command {
        Commands::Create { file } => {
            let manifest = std::fs::read_to_string(&file)
                .with_context(|| format!("reading manifest {}", file.display()))?;
            let mut pod: Pod = serde_yaml::from_str(&manifest)
                .with_context(|| format!("parsing manifest {}", file.display()))?;
            if pod.metadata.uid.is_empty() {
                pod.metadata.uid = Uuid::new_v4().to_string();
            }

            let sandbox_id = reconciler.create_pod(&pod, &cancel).await?;
            println!("{sandbox_id}");
        }
        Commands::Status { sandbox_id } => {
            let pod = reconciler.pod_status(&sandbox_id, &cancel).await?;
            print!("{}", serde_yaml::to_string(&pod)?);
        }
        Commands::List => {
            let summaries = reconciler.list_pods(&cancel).await?;
            println!("{:<40} {:<20} {:<12} {:<10}", "SANDBOX", "NAME", "NAMESPACE", "STATE");
            for summary in summaries {
                println!(
                    "{:<40} {:<20} {:<12} {:<10}",
                    summary.id, summary.name, summary.namespace, summary.readiness
                );
            }
        }
        Commands::Teardown { sandbox_id } => {
            reconciler.teardown_pod(&sandbox_id, &cancel).await?;
            println!("{sandbox_id} removed");
        }
    }

    Ok(())
}
