//! Fog Node - edge analytics for vehicle telemetry
//!
//! Polls the vehicle device, scores health over a sliding window, actuates
//! the vehicle locally when needed and reports to the cloud.
//!
//! # Usage
//!
//! ```bash
//! # Live device (address from fog_node.toml or override)
//! fog-node --device-ip 192.168.213.78
//!
//! # Bench run against the simulator
//! device-simulator --addr 127.0.0.1:9000 &
//! fog-node --device-ip 127.0.0.1:9000
//!
//! # Offline replay of a recorded JSON-lines capture
//! fog-node --replay capture.jsonl --no-server
//! ```
//!
//! # Environment Variables
//!
//! - `FOG_CONFIG`: Path to the TOML config (default: ./fog_node.toml)
//! - `FOG_DEVICE_IP`: Device address override
//! - `FOG_CORS_ORIGINS`: Comma-separated origins allowed on the operator API
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use fog_node::acquisition::{
    build_http_client, CloudClient, DeviceClient, DeviceSource, HttpSink, ReplaySource,
    SampleSource,
};
use fog_node::api::{create_app, ApiState};
use fog_node::config::watcher::ConfigReloader;
use fog_node::config::{self, LinkSettings, NodeConfig, SettingsCell, SettingsPatch};
use fog_node::pipeline::{DispatchLoop, NodeState};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "fog-node")]
#[command(about = "Fog analytics node for vehicle health monitoring")]
#[command(version)]
struct CliArgs {
    /// Path to the TOML config file (overrides the default search order)
    #[arg(short, long, env = "FOG_CONFIG")]
    config: Option<PathBuf>,

    /// Override the vehicle device address (host or host:port)
    #[arg(long, env = "FOG_DEVICE_IP")]
    device_ip: Option<String>,

    /// Override the operator API address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Replay samples from a JSON-lines file instead of polling the device
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Do not start the operator HTTP server
    #[arg(long)]
    no_server: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

// ============================================================================
// Task Names for Supervisor Logging
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum TaskName {
    HttpServer,
    DispatchLoop,
    ConfigWatcher,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskName::HttpServer => write!(f, "HttpServer"),
            TaskName::DispatchLoop => write!(f, "DispatchLoop"),
            TaskName::ConfigWatcher => write!(f, "ConfigWatcher"),
        }
    }
}

// ============================================================================
// Task Spawning
// ============================================================================

/// Spawn the HTTP server task into the JoinSet.
fn spawn_http_server(
    task_set: &mut JoinSet<Result<TaskName>>,
    listener: tokio::net::TcpListener,
    app: axum::Router,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        info!("[HttpServer] Task starting");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await;

        match result {
            Ok(()) => {
                info!("[HttpServer] Graceful shutdown complete");
                Ok(TaskName::HttpServer)
            }
            Err(e) => {
                error!("[HttpServer] Server error: {}", e);
                Err(anyhow::anyhow!("HTTP server error: {}", e))
            }
        }
    });
}

/// Spawn the dispatch loop over any sample source.
fn spawn_dispatch_loop<S: SampleSource>(
    task_set: &mut JoinSet<Result<TaskName>>,
    mut source: S,
    dispatch_loop: DispatchLoop<HttpSink>,
) {
    task_set.spawn(async move {
        info!("[DispatchLoop] Task starting");
        let _stats = dispatch_loop.run(&mut source).await;
        Ok(TaskName::DispatchLoop)
    });
}

fn spawn_config_watcher(
    task_set: &mut JoinSet<Result<TaskName>>,
    reloader: ConfigReloader,
    settings: SettingsCell,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        config::watcher::run_config_watcher(reloader, settings, cancel_token).await;
        Ok(TaskName::ConfigWatcher)
    });
}

/// Run the supervisor loop: monitor tasks, cancel on failure.
///
/// The dispatch loop finishing (replay exhausted) shuts the node down.
async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    info!("Supervisor: All tasks spawned, monitoring...");

    let outcome = loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("Supervisor: Shutdown signal received");
                break Ok(());
            }
            result = task_set.join_next() => {
                match result {
                    Some(Ok(Ok(TaskName::DispatchLoop))) => {
                        info!("Supervisor: Dispatch loop finished, shutting down");
                        cancel_token.cancel();
                        break Ok(());
                    }
                    Some(Ok(Ok(task_name))) => {
                        info!("Supervisor: Task {} completed normally", task_name);
                    }
                    Some(Ok(Err(e))) => {
                        error!("Supervisor: Task failed with error: {}", e);
                        cancel_token.cancel();
                        break Err(e);
                    }
                    Some(Err(e)) => {
                        error!("Supervisor: Task panicked: {}", e);
                        cancel_token.cancel();
                        break Err(anyhow::anyhow!("Task panicked: {}", e));
                    }
                    None => {
                        info!("Supervisor: All tasks completed");
                        break Ok(());
                    }
                }
            }
        }
    };

    // Let the remaining tasks observe the cancellation and exit cleanly
    while let Some(result) = task_set.join_next().await {
        if let Ok(Ok(task_name)) = result {
            info!("Supervisor: Task {} stopped", task_name);
        }
    }

    outcome
}

// ============================================================================
// Configuration
// ============================================================================

/// Effective config plus what the hot-reloader needs to tell file edits
/// apart from command-line overrides.
struct LoadedConfig {
    node: NodeConfig,
    path: Option<PathBuf>,
    file_link: LinkSettings,
    overrides: SettingsPatch,
}

fn load_config(args: &CliArgs) -> Result<LoadedConfig> {
    let (mut node_config, source_path) = match &args.config {
        Some(path) => {
            let cfg = NodeConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            info!(path = %path.display(), "Loaded node config");
            (cfg, Some(path.clone()))
        }
        None => NodeConfig::load(),
    };
    let file_link = node_config.link_settings();

    let overrides = SettingsPatch {
        device_ip: args.device_ip.as_ref().map(|ip| ip.trim().to_string()),
        ..SettingsPatch::default()
    };
    if let Some(ip) = &overrides.device_ip {
        node_config.device.ip = ip.clone();
    }
    if let Some(addr) = &args.addr {
        node_config.server.addr = addr.clone();
    }
    node_config
        .validate()
        .context("Invalid configuration after command-line overrides")?;

    Ok(LoadedConfig {
        node: node_config,
        path: source_path,
        file_link,
        overrides,
    })
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_json);

    let LoadedConfig {
        node: node_config,
        path: config_path,
        file_link,
        overrides,
    } = load_config(&args)?;
    let link = node_config.link_settings();

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Fog Node v{}", env!("CARGO_PKG_VERSION"));
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(
        device_ip = %link.device_ip,
        sample_period_secs = link.sample_period_secs,
        window_secs = link.window_secs,
        window_capacity = link.window_capacity(),
        "Link settings"
    );

    let settings = SettingsCell::new(link);
    let node_state = Arc::new(RwLock::new(NodeState::default()));

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let http = build_http_client().context("Failed to build HTTP client")?;
    let device = DeviceClient::new(http.clone(), &node_config.device, &node_config.timeouts);
    let cloud = CloudClient::new(http, &node_config.cloud, &node_config.timeouts);
    info!(
        cloud_url = %cloud.url(),
        idle_report_interval_secs = node_config.cloud.idle_report_interval().as_secs_f64(),
        "Cloud reporting"
    );
    let sink = HttpSink::new(device.clone(), cloud);

    let dispatch_loop = DispatchLoop::new(
        settings.clone(),
        sink,
        Arc::clone(&node_state),
        cancel_token.clone(),
    )
    .with_health_model(node_config.health.clone())
    .with_idle_report_interval(node_config.cloud.idle_report_interval());

    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();

    // Task 1: HTTP Server
    if !args.no_server {
        let listener = tokio::net::TcpListener::bind(&node_config.server.addr)
            .await
            .with_context(|| format!("Failed to bind to {}", node_config.server.addr))?;
        info!("Operator API listening on http://{}", node_config.server.addr);

        let app = create_app(ApiState {
            node_state: Arc::clone(&node_state),
            settings: settings.clone(),
        });
        spawn_http_server(&mut task_set, listener, app, cancel_token.clone());
    }

    // Task 2: Dispatch Loop
    match &args.replay {
        Some(path) => {
            let source = ReplaySource::open(path).await?;
            spawn_dispatch_loop(&mut task_set, source, dispatch_loop);
        }
        None => {
            spawn_dispatch_loop(&mut task_set, DeviceSource::new(device), dispatch_loop);
        }
    }

    // Task 3: Config hot-reload (only when a file is in use)
    if let Some(path) = config_path {
        let reloader = ConfigReloader::new(path, file_link, overrides);
        spawn_config_watcher(&mut task_set, reloader, settings, cancel_token.clone());
    }

    run_supervisor(&mut task_set, cancel_token).await
}
