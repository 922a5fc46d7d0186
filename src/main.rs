use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use toon_gateway::observability::init_logging;
use toon_gateway::{GatewayConfig, HttpServer, ToonCodec};

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::parse();
    init_logging(&config.log_filter)?;
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.bind_address(),
        body_limit = config.body_limit,
        "toon-gateway starting"
    );

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;

    let server = HttpServer::new(config, Arc::new(ToonCodec::new()));
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
