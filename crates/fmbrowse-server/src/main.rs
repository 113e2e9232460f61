//! fmbrowse: browse FileMaker business data from the command line
//!
//! Usage:
//! ```bash
//! # Dev proxy for a browser client (default if no command specified)
//! FM_HOST=fms.example.com FM_DATABASE=Sales FM_USER=web FM_PASSWORD=secret fmbrowse serve
//!
//! # Browse commands print JSON to stdout
//! fmbrowse --config fmbrowse.yaml contacts --search Smith
//! fmbrowse --config fmbrowse.yaml sales --page 2 --start 2024-01-01 --end 2024-01-31
//! fmbrowse --config fmbrowse.yaml line-items S-1002
//! fmbrowse --config fmbrowse.yaml summary --start 2024-01-01 --end 2024-06-30
//! ```
//!
//! Test the proxy with:
//! ```bash
//! curl "http://127.0.0.1:5173/fmi/data/vLatest/databases/Sales/layouts/CMT_Web/records?_limit=5"
//! ```

mod browse;
mod config;

use anyhow::Context;
use browse::BrowseCommand;
use clap::{Parser, Subcommand};
use config::ServerConfig;
use fmbrowse_egress::{RecordFetcher, SessionManager};
use fmbrowse_ingress::{PROXY_PREFIX, ProxyState};
use fmbrowse_resources::Resources;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// fmbrowse - FileMaker Data API browser
#[derive(Parser)]
#[command(name = "fmbrowse")]
#[command(about = "Browse contacts, products and sales stored in FileMaker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "FMBROWSE_CONFIG",
        global = true
    )]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the development proxy
    Serve,
    #[command(flatten)]
    Browse(BrowseCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => ServerConfig::default(),
    };

    // Merge environment variables (they override config file)
    config.merge_env();

    init_tracing(&config.logging.level)?;

    if let Some(path) = &cli.config {
        info!("Loaded configuration from: {}", path);
    }

    let session = Arc::new(SessionManager::new(config.to_filemaker_config()?)?);

    match cli.command {
        Some(Commands::Browse(command)) => {
            let resources = Resources::new(Arc::new(RecordFetcher::new(session)));
            let value = browse::run(&command, &resources).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Some(Commands::Serve) | None => serve(&config, session).await,
    }
}

/// Install the global subscriber; `RUST_LOG` wins over the configured level.
/// Logs go to stderr so browse output on stdout stays valid JSON.
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}", log_level)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn serve(config: &ServerConfig, session: Arc<SessionManager>) -> anyhow::Result<()> {
    let state = Arc::new(ProxyState::new(session));
    let upstream = state.upstream().to_string();
    let app = fmbrowse_ingress::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr).await?;

    info!("fmbrowse dev proxy listening on http://{}", addr);
    info!("   Forwarding {}/* to {}{}/*", PROXY_PREFIX, upstream, PROXY_PREFIX);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
