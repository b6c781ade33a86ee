//! Chat-completion forwarding gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                  GATEWAY                     │
//!   Client Request        │  ┌─────────┐   ┌───────────┐   ┌──────────┐  │
//!   ──────────────────────┼─▶│  http   │──▶│ validator │──▶│credential│  │
//!                         │  │ server  │   │           │   │ selector │  │
//!                         │  └─────────┘   └───────────┘   └────┬─────┘  │
//!                         │                                     ▼        │
//!   Client Response       │  ┌─────────┐   ┌───────────┐   ┌──────────┐  │
//!   ◀─────────────────────┼──│  cors   │◀──│   relay   │◀──│dispatcher│◀─┼── Upstream
//!                         │  └─────────┘   │+sanitizer │   └──────────┘  │
//!                         │                └───────────┘                 │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use chat_gateway::config::{read_config, validate_config, ConfigError, GatewayConfig};
use chat_gateway::lifecycle::{shutdown_signal, Shutdown};
use chat_gateway::observability::{logging, metrics};
use chat_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "chat-gateway")]
#[command(about = "Forwards chat-completion requests upstream with a randomly chosen API key", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port (overrides the port of the configured bind address).
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Full bind address, e.g. 127.0.0.1:8080. Takes precedence over --port.
    #[arg(long)]
    bind: Option<String>,
}

/// File (or defaults), then CLI overrides, then a single validation pass.
fn resolve_config(cli: &Cli) -> Result<GatewayConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => GatewayConfig::default(),
    };

    if let Some(port) = cli.port {
        config.listener.set_port(port);
    }
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init(&config.observability)?;

    tracing::info!("chat-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Server listening");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.trigger();
        }
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
