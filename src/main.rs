//! Gateway engine
//!
//! ```text
//!   gateway.toml ──▶ config loader ──▶ PolicyStore (ArcSwap snapshot)
//!        │                                   ▲           │
//!        └──▶ ConfigWatcher ── reload ───────┘           ▼
//!                                                 PolicyDispatcher ──▶ admin API
//!   access log ──▶ AccessLogTail ──▶ Discovery (UrlTree<()>) ──────────▶ admin API
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::task::JoinHandle;

use gateway_engine::admin::{self, AdminState};
use gateway_engine::config::load_config;
use gateway_engine::config::ConfigWatcher;
use gateway_engine::discovery::{run_ingestion, AccessLogTail, Discovery};
use gateway_engine::lifecycle::{shutdown_signal, Shutdown};
use gateway_engine::obfuscation::PathObfuscator;
use gateway_engine::observability::{logging, metrics};
use gateway_engine::policy::PolicyStore;

#[derive(Parser)]
#[command(name = "gateway-engine")]
#[command(about = "Policy dispatch and traffic discovery over an adaptive URL tree", long_about = None)]
struct Cli {
    /// Gateway configuration file
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,

    /// JSON-lines access log to aggregate into discovered endpoints
    #[arg(long)]
    access_log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init(&config.observability.log_level)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), config = ?cli.config, "gateway-engine starting");

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
        tracing::info!(address = %addr, "Metrics exporter listening");
    }

    let store = Arc::new(PolicyStore::from_config(&config)?);
    let discovery = Arc::new(Mutex::new(Discovery::new(
        &config.discovery.known_endpoints,
        config.urltree,
    )?));
    let shutdown = Shutdown::new();
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    let (watcher, mut updates) = ConfigWatcher::new(&cli.config);
    let _watcher = watcher.run()?;
    {
        let store = store.clone();
        let mut shutdown_rx = shutdown.subscribe();
        tasks.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(new_config) = updates.recv() => {
                        if let Err(e) = store.reload(&new_config) {
                            tracing::error!(error = %e, "Policy reload rejected");
                        }
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        }));
    }

    if config.discovery.enabled {
        match cli.access_log {
            Some(path) => {
                tracing::info!(path = ?path, window_secs = config.discovery.window_secs, "Access log ingestion started");
                tasks.push(tokio::spawn(run_ingestion(
                    discovery.clone(),
                    AccessLogTail::new(&path),
                    Duration::from_secs(config.discovery.window_secs),
                    shutdown.clone(),
                )));
            }
            None => tracing::warn!("Discovery enabled but no --access-log given"),
        }
    }

    if config.admin.enabled {
        let addr: SocketAddr = config.admin.bind_address.parse()?;
        let state = AdminState::new(
            store.clone(),
            discovery.clone(),
            PathObfuscator::new(&config.obfuscation),
            &config.admin.api_key,
        );
        let shutdown = shutdown.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = admin::serve(state, addr, shutdown).await {
                tracing::error!(error = %e, "Admin API failed");
            }
        }));
    }

    shutdown_signal().await;
    let notified = shutdown.trigger();
    tracing::info!(tasks = notified, "Shutting down");

    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Task panicked during shutdown");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
