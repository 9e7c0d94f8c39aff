//! Quorum node binary.
//!
//! Starts a subject-initialized node, registers the given peers and
//! serves the node's RPC surface over HTTP.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quorum_core::{ClusterConfiguration, ElectionTimeout, Node, Role};
use quorum_http::{serve, HttpPeer};

/// A single quorum cluster node fronted by HTTP.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to serve the node's RPC surface on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Base URL of another cluster node (repeatable)
    #[arg(long = "peer")]
    peers: Vec<String>,

    /// Lower bound of the election timeout in milliseconds
    #[arg(long, default_value = "3000")]
    min_timeout_ms: u64,

    /// Upper bound of the election timeout in milliseconds
    #[arg(long, default_value = "4000")]
    max_timeout_ms: u64,

    /// Period between leader heartbeats in milliseconds
    #[arg(long, default_value = "1000")]
    heartbeat_ms: u64,

    /// Log filter, e.g. "info" or "quorum_core=debug"
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .init();

    let node = Node::new(Role::subject());
    info!(
        "quorum node {} starting with {} peers",
        node.id(),
        args.peers.len()
    );

    for url in &args.peers {
        node.register_peer(Arc::new(HttpPeer::new(url.clone())));
    }

    let config = Arc::new(ClusterConfiguration::new(
        ElectionTimeout::new(
            Duration::from_millis(args.min_timeout_ms),
            Duration::from_millis(args.max_timeout_ms),
        ),
        Duration::from_millis(args.heartbeat_ms),
    ));

    let listener = TcpListener::bind(("0.0.0.0", args.port)).await?;
    serve(node, config, listener).await?;
    Ok(())
}
