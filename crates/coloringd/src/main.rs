//! coloringd - Topology Coloring Daemon
//!
//! Entry point: polls the topology source on an interval, runs one
//! reconciliation pass per tick, and serves the color report endpoint.

use anyhow::Context;
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Mutex;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use coloringd::config::defaults;
use coloringd::{
    ColorSync, ColoringConfig, FieldKind, HttpFlowPusher, HttpTopologySource, SharedSync,
    TopologySource,
};

/// Topology coloring daemon command line.
#[derive(Debug, Parser)]
#[command(name = "coloringd", about = "Colors an SDN topology and installs neighbor probe flows")]
struct Cli {
    /// Topology service URL polled every pass
    #[arg(long, default_value = defaults::TOPOLOGY_URL)]
    topology_url: String,

    /// Flow-manager URL template; '{dpid}' is substituted per switch
    #[arg(long, default_value = defaults::FLOW_MANAGER_URL)]
    flow_manager_url: String,

    /// Match field colors are encoded into
    #[arg(long, default_value = defaults::COLOR_FIELD)]
    color_field: FieldKind,

    /// Probe-flow priority
    #[arg(long, default_value_t = defaults::FLOW_PRIORITY)]
    flow_priority: u16,

    /// Seconds between reconciliation passes
    #[arg(long, default_value_t = defaults::COLORING_INTERVAL_SECS)]
    interval: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value_t = defaults::REQUEST_TIMEOUT_SECS)]
    request_timeout: u64,

    /// Listen address for the color report endpoint
    #[arg(long, default_value = defaults::LISTEN_ADDR)]
    listen: String,

    /// Drop installation bookkeeping for vanished neighbors each pass
    #[arg(long)]
    prune_stale_flows: bool,
}

impl Cli {
    fn into_config(self) -> ColoringConfig {
        ColoringConfig {
            topology_url: self.topology_url,
            flow_manager_url: self.flow_manager_url,
            color_field: self.color_field,
            flow_priority: self.flow_priority,
            coloring_interval_secs: self.interval,
            request_timeout_secs: self.request_timeout,
            listen_addr: self.listen,
            prune_stale_flows: self.prune_stale_flows,
        }
    }
}

/// Initializes tracing/logging subsystem
fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Setup signal handlers and return atomic flag for shutdown signaling
fn setup_signal_handlers() -> Arc<AtomicBool> {
    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let shutdown_flag_clone = shutdown_flag.clone();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("coloringd: Received SIGINT/SIGTERM");
            shutdown_flag_clone.store(true, Ordering::Relaxed);
        }
    });

    shutdown_flag
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Cli::parse().into_config();
    config.validate().context("invalid configuration")?;

    info!("--- Starting coloringd ---");
    info!(
        topology_url = %config.topology_url,
        color_field = %config.color_field,
        interval_secs = config.coloring_interval_secs,
        "Configuration loaded"
    );

    let topology = HttpTopologySource::new(&config.topology_url, config.request_timeout())
        .context("failed to build topology client")?;
    let pusher = Arc::new(
        HttpFlowPusher::new(&config.flow_manager_url, config.request_timeout())
            .context("failed to build flow-manager client")?,
    );
    let sync: SharedSync = Arc::new(Mutex::new(ColorSync::new(&config, pusher)));

    // Color report endpoint
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen = %config.listen_addr, "Serving color report on /colors");
    let app = coloringd::rest_api::router(sync.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Color report server exited");
        }
    });

    run_loop(&config, &topology, &sync, setup_signal_handlers()).await;

    info!("coloringd: Graceful shutdown complete");
    Ok(())
}

/// Reconciliation loop: one pass per interval tick. A failed topology
/// fetch skips the pass; it is never fatal.
async fn run_loop(
    config: &ColoringConfig,
    topology: &HttpTopologySource,
    sync: &SharedSync,
    shutdown: Arc<AtomicBool>,
) {
    let mut ticker = tokio::time::interval(config.coloring_interval());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if shutdown.load(Ordering::Relaxed) {
                    info!("coloringd: Received shutdown signal");
                    break;
                }

                let view = match topology.fetch().await {
                    Ok(view) => view,
                    Err(e) => {
                        warn!(error = %e, "Topology fetch failed, skipping this pass");
                        continue;
                    }
                };

                let summary = sync.lock().await.update_colors(&view).await;
                if summary.pushed > 0 || summary.failed > 0 {
                    info!(
                        pushed = summary.pushed,
                        failed = summary.failed,
                        skipped = summary.skipped,
                        "Reconciliation pass complete"
                    );
                }
            }
            _ = signal::ctrl_c() => {
                info!("coloringd: Received shutdown signal");
                break;
            }
        }
    }
}
