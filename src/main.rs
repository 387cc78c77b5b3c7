//! apikey-gate server.
//!
//! # Request Pipeline
//!
//! ```text
//!   request
//!      │
//!      ▼
//!  ┌──────────────┐  plaintext   ┌───────────────────┐
//!  │ transport    │─────────────▶│ 403 SSL Required  │
//!  │ gate         │              └───────────────────┘
//!  └──────┬───────┘
//!         │ encrypted
//!         ▼
//!  ┌──────────────┐  no route    ┌───────────────────┐
//!  │ route        │─────────────▶│ 404 / 405         │
//!  │ registry     │              └───────────────────┘
//!  └──────┬───────┘
//!         │ protected?
//!         ▼
//!  ┌──────────────┐  bad key     ┌───────────────────┐
//!  │ key validator│─────────────▶│ 401 Unauthorized  │
//!  │ (key source) │              └───────────────────┘
//!  └──────┬───────┘
//!         │ match (or unprotected)
//!         ▼
//!      handler
//! ```

use std::path::PathBuf;

use apikey_gate::config::{load_config, validate_config, ConfigError, GateConfig};
use apikey_gate::handlers::default_routes;
use apikey_gate::lifecycle::{wait_for_signal, Shutdown};
use apikey_gate::observability::{logging, metrics};
use apikey_gate::GateServer;
use clap::Parser;

#[derive(Parser)]
#[command(name = "apikey-gate")]
#[command(about = "HTTP API gate enforcing TLS and a pre-shared key", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "APIKEY_GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Print the effective configuration (key redacted) and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let config = GateConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            config
        }
    };

    if cli.print_config {
        println!("{}", toml::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    logging::init_logging(&config.observability);
    tracing::info!("apikey-gate v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = GateServer::new(config, default_routes()?)?;

    let config = server.config();
    tracing::info!(
        tls = config.listener.tls.is_some(),
        bind_address = %config.listener.bind_address,
        plaintext_address = ?config.listener.plaintext_address,
        request_timeout_secs = config.timeouts.request_secs,
        shutdown_grace_secs = config.timeouts.shutdown_grace_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let mut server_task = tokio::spawn(server.run(server_shutdown));

    tokio::select! {
        _ = wait_for_signal() => {
            shutdown.trigger();
            server_task.await??;
        }
        result = &mut server_task => result??,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
