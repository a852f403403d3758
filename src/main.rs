//! Datadog API integration gateway entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ddog_gateway::api::{create_router, AppState};
use ddog_gateway::config::Config;
use ddog_gateway::metrics;
use ddog_gateway::resources::{fetch_default, ResourceKind};
use ddog_gateway::upstream::UpstreamClient;
use ddog_gateway::utils::shutdown_signal;

/// Datadog API integration gateway.
#[derive(Parser, Debug)]
#[command(name = "ddog-gateway")]
#[command(about = "Serves flattened JSON views of Datadog API resources")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP gateway (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Fetch one resource and print its flattened JSON.
    Fetch {
        /// Resource to fetch: downtimes, monitors, hosts, host_tags, events, or services.
        resource: ResourceKind,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("ddog_gateway=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if args.json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    match args.command {
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Fetch { resource }) => cmd_fetch(resource).await,
        None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration, logging failures.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("DDOG GATEWAY - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Base URL: {}", config.dd_base_url);
    println!("  API Key: {}", if config.dd_api_key.is_some() { "set" } else { "MISSING" });
    println!("  App Key: {}", if config.dd_app_key.is_some() { "set" } else { "MISSING" });
    println!("  HTTP Timeout: {}ms", config.http_timeout_ms);
    println!("  HTTP Pool Size: {}", config.http_pool_size);
    println!("  Port: {}", config.port);
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Fetch one resource and print it.
async fn cmd_fetch(resource: ResourceKind) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = UpstreamClient::new(&config)?;

    let value = fetch_default(&client, resource).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);

    Ok(())
}

/// Run the HTTP gateway until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = load_config()?;
    let port = port_override.unwrap_or(config.port);

    if !config.has_credentials() {
        warn!("DD_API_KEY or DD_APP_KEY not set; upstream requests will likely be rejected");
    }

    info!("Configuration loaded successfully");
    info!("Upstream: {}", config.dd_base_url);

    let client = UpstreamClient::new(&config)?;
    let mut app_state = AppState::new(client);

    if config.metrics_enabled {
        let handle = metrics::install_prometheus()?;
        metrics::init_metrics();
        app_state = app_state.with_metrics(handle);
        info!("Metrics enabled at /metrics");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
