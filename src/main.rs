//! Terminal API test-harness proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                    TERMINAL PROXY                     │
//!   Browser       │  ┌──────────┐   ┌─────────────┐   ┌──────────────┐   │
//!   ──────────────┼─▶│  http    │──▶│  handlers   │──▶│ environment  │   │
//!                 │  │  server  │   │ (validate)  │   │  resolver    │   │
//!                 │  └──────────┘   └─────────────┘   └──────┬───────┘   │
//!                 │                                          ▼           │
//!                 │  ┌──────────┐   ┌─────────────┐   ┌──────────────┐   │    Payment
//!   ◀─────────────┼──│ envelope │◀──│ classifier  │◀──│ request      │◀──┼──▶ Gateway
//!                 │  │ + _debug │   │ + trace     │   │ builder/send │   │
//!                 │  └──────────┘   └─────────────┘   └──────────────┘   │
//!                 │                                                      │
//!                 │   config · logging · metrics · request IDs · shutdown │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use terminal_proxy::config::loader::load_config;
use terminal_proxy::config::ProxyConfig;
use terminal_proxy::lifecycle::{signals, Shutdown};
use terminal_proxy::observability::{logging, metrics};
use terminal_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "terminal-proxy")]
#[command(about = "Proxy between the terminal test harness and the payment gateway", long_about = None)]
struct Args {
    /// Path to a TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);

    tracing::info!("terminal-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        production = %config.gateway.production_url,
        test = %config.gateway.test_url,
        report = %config.gateway.report_url,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
