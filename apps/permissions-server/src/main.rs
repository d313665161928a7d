//! Permissions server.
//!
//! Answers `permissions.grant`, `permissions.revoke`, `permissions.check` and
//! `permissions.list` on the configured message bus until interrupted.

mod config;
mod wiring;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use permissions::PermissionsModule;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{AppConfig, LogFormat, LoggingConfig};

#[derive(Parser, Debug)]
#[command(name = "permissions-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(());
    }

    init_tracing(&cfg.logging, cli.verbose);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting permissions server");

    run(cfg).await.inspect_err(|e| error!(error = ?e, "Permissions server failed"))
}

fn init_tracing(logging: &LoggingConfig, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .init(),
    }
}

async fn run(cfg: AppConfig) -> Result<()> {
    let backends = wiring::build(&cfg).await?;
    let module = PermissionsModule::init(&cfg.permissions, backends.cache).await?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C, shutting down"),
        }
        signal.cancel();
    });

    module
        .router()
        .serve(backends.bus.as_ref(), shutdown)
        .await
        .context("permissions router failed")?;

    module.shutdown().await?;
    info!("Permissions server stopped");
    Ok(())
}
