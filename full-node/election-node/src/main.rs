mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use election_db::ElectionStorage;
use election_engine::ElectionService;
use election_rpc::server::rpc_module;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use crate::config::{from_toml_path, NodeConfig};

/// Hosts elections and serves them over JSON-RPC.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// The path to the node configuration.
    #[arg(default_value = "node_config.toml")]
    config_path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize a logger for the node
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into()) // If no logging config is set. default to `info` level logs
                .from_env_lossy(), // Parse the log level from the RUST_LOG env var if set
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Unable to set global default subscriber")?;

    let args = Args::parse();
    let node_config: NodeConfig = from_toml_path(&args.config_path).with_context(|| {
        format!(
            "Failed to read node configuration from {}",
            args.config_path.display()
        )
    })?;

    let storage = ElectionStorage::with_path(&node_config.storage.path, &node_config.rocksdb)
        .context("Failed to open election storage")?;
    let service = ElectionService::new(storage).context("Failed to restore elections")?;
    let methods = rpc_module(service)?;

    let listen_address = node_config.rpc_config.listen_address();
    let server = jsonrpsee::server::ServerBuilder::default()
        .build(listen_address.as_str())
        .await
        .with_context(|| format!("Failed to bind RPC server to {listen_address}"))?;
    let bound_address = server.local_addr()?;
    info!("Starting RPC server at {}", &bound_address);
    let server_handle = server.start(methods);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");
    server_handle.stop()?;
    server_handle.stopped().await;

    Ok(())
}
