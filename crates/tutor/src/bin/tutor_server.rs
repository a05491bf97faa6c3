//! Tutor REST Server
//!
//! HTTP API for the professor review assistant: streams grounded chat answers
//! and ingests professor profile pages into the vector index.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use tutor::config::ServerConfig;
use tutor::server::startup::start_server;

#[derive(Parser)]
#[command(name = "tutor_server")]
#[command(about = "Tutor REST API Server")]
#[command(version)]
struct Args {
  #[command(flatten)]
  config: ServerConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // RUST_LOG wins over the verbosity flag
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(args.config.default_log_filter()));

  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Tutor REST Server");

  start_server(args.config).await?;

  Ok(())
}
