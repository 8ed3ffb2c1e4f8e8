//! thermald — the thermal scheduler extender daemon.
//!
//! Serves the scheduler-extender filter and prioritize calls, steering pods
//! away from nodes whose thermal zone runs hot. The metrics backend client
//! is built once at startup and shared by every request.
//!
//! # Usage
//!
//! ```text
//! thermald serve --config /etc/thermal/thermal.toml
//! thermald probe worker-1
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use thermal_core::{CandidateNode, ExtenderConfig};
use thermal_decision::{DecisionLimits, Orchestrator};
use thermal_metrics::{ClusterCredentials, CustomMetricsClient};
use thermal_policy::ThermalPolicy;

#[derive(Parser)]
#[command(name = "thermald", about = "Thermal scheduler extender")]
struct Cli {
    /// Path to thermal.toml. Defaults apply when omitted.
    #[arg(long, env = "THERMAL_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, env = "THERMAL_LOG_JSON", global = true)]
    log_json: bool,

    /// Metrics API server URL, overriding the config file.
    #[arg(long, env = "THERMAL_API_SERVER", global = true)]
    api_server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the extender HTTP server.
    Serve {
        /// Address to listen on, overriding the config file.
        #[arg(long)]
        listen: Option<String>,
    },
    /// Read one node's temperature and print the resulting decision.
    Probe {
        /// Node name.
        node: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = match &cli.config {
        Some(path) => ExtenderConfig::from_file(path)?,
        None => ExtenderConfig::default(),
    };
    if let Some(api_server) = cli.api_server {
        config.metrics.api_server = Some(api_server);
    }

    match cli.command {
        Command::Serve { listen } => {
            if let Some(listen) = listen {
                config.server.listen = listen;
            }
            config.validate()?;
            serve(config).await
        }
        Command::Probe { node } => {
            config.validate()?;
            probe(config, node).await
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,thermald=debug,thermal=debug"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Build the shared orchestrator: one backend client for the whole process.
fn build_orchestrator(config: &ExtenderConfig) -> anyhow::Result<Arc<Orchestrator>> {
    let credentials = ClusterCredentials::load(&config.metrics)?;
    info!(
        api_server = %credentials.api_server,
        metric = %config.metrics.metric_name,
        authenticated = credentials.bearer_token.is_some(),
        "metrics backend resolved"
    );

    let client = CustomMetricsClient::new(credentials, &config.metrics)?;
    let policy = ThermalPolicy::from(&config.policy);
    let limits = DecisionLimits::from_config(&config.decision)?;
    info!(
        max_temperature_celsius = policy.max_temperature_celsius,
        concurrency = limits.concurrency,
        fetch_timeout_ms = limits.fetch_timeout.as_millis() as u64,
        request_timeout_ms = limits.request_timeout.as_millis() as u64,
        "thermal policy loaded"
    );

    Ok(Arc::new(Orchestrator::new(Arc::new(client), policy, limits)))
}

async fn serve(config: ExtenderConfig) -> anyhow::Result<()> {
    info!("thermal extender starting");

    let orchestrator = build_orchestrator(&config)?;
    let router = thermal_api::build_router(orchestrator, &config.server);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    info!(
        addr = %listener.local_addr()?,
        filter = %config.server.filter_path(),
        prioritize = %config.server.prioritize_path(),
        "extender listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("thermal extender stopped");
    Ok(())
}

async fn probe(config: ExtenderConfig, node: String) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(&config)?;

    let readings = orchestrator
        .read_all(&[CandidateNode::named(node.clone())])
        .await?;
    let Some(reading) = readings.into_iter().next() else {
        anyhow::bail!("no reading returned for {node}");
    };

    let policy = orchestrator.policy();
    let report = serde_json::json!({
        "node": node,
        "temperature": reading.temperature,
        "verdict": policy.admit(&reading),
        "score": policy.score(&reading),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
