//! probe-demo: a playground for Kubernetes startup, liveness and readiness probes.
//!
//! This is the application entry point. It loads configuration from a TOML file,
//! initializes tracing, builds the probe state machine and the Axum router, and
//! starts the HTTP server.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use probe_demo::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use probe_demo::http::start_server;
use probe_demo::pod::PodInfo;
use probe_demo::templates::init_templates;
use probe_demo::{create_router, AppState};

/// probe-demo: toggle this pod's probe results at runtime
#[derive(Parser, Debug)]
#[command(name = "probe-demo", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "probe_demo=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = AppConfig::load_or_default(&args.config)?;
    if let Some(port) = args.port {
        config.http.port = port;
    }

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        path = %args.config,
        readiness_restore_secs = config.probes.readiness_restore_seconds,
        liveness_restore_min_secs = config.probes.liveness_restore_min_seconds,
        liveness_restore_max_secs = config.probes.liveness_restore_max_seconds,
        "Loaded configuration"
    );

    let pod = PodInfo::from_env();
    tracing::info!(
        pod = %pod.pod_name,
        ip = %pod.pod_ip,
        node = %pod.node_name,
        namespace = %pod.namespace,
        "Pod metadata"
    );

    let tera = init_templates()?;
    tracing::info!("Initialized templates");

    let state = AppState::new(config.clone(), tera, pod);
    let probes = state.probes.clone();

    let app = create_router(state);

    start_server(app, &config, probes).await?;

    Ok(())
}
