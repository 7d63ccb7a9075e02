//! # Rostergap Server
//!
//! Main entry point for the rostergap unenrolled-users service: wires the
//! warehouse clients, the query cache, and the REST router together.

use rostergap_config::{ConfigLoader, ObservabilityConfig};
use rostergap_core::{RostergapError, RostergapResult};
use rostergap_rest::{create_router, AppState};
use rostergap_service::{QueryCache, UnenrolledReportServiceImpl};
use rostergap_warehouse::{RosterClient, SnowflakeClient, SnowflakeExecutor};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

mod startup;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // The subscriber may not be installed yet when config loading
        // fails, so report on stderr as well.
        eprintln!("Application error: {}", e);
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> RostergapResult<()> {
    let config = ConfigLoader::from_default_location()?;

    init_logging(&config.observability);

    info!("Starting rostergap server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);
    info!(
        "Cache: enabled={} ttl={}s",
        config.cache.enabled, config.cache.ttl_seconds
    );

    let snowflake = SnowflakeClient::new(config.warehouse.clone())?;
    let roster = RosterClient::new(config.roster.clone())?;
    let executor = Arc::new(SnowflakeExecutor::new(snowflake, roster));

    // One cache for the whole process; every request handler shares it.
    let cache = Arc::new(QueryCache::new(
        executor,
        config.cache.ttl(),
        config.cache.enabled,
    ));
    let report_service = Arc::new(UnenrolledReportServiceImpl::new(cache));

    let state = AppState::new(report_service);
    let router = create_router(state, &config.server);

    startup::print_banner();
    startup::print_startup_info(&config.server);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RostergapError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| RostergapError::internal(format!("Server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence over
/// the configured level and debug toggle.
fn init_logging(observability: &ObservabilityConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directives(observability)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Builds the default filter directives from the observability config.
fn log_directives(observability: &ObservabilityConfig) -> String {
    if observability.debug {
        "debug,rostergap=trace,tower_http=debug".to_string()
    } else {
        format!(
            "{},rostergap=debug,tower_http=debug",
            observability.log_level
        )
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
