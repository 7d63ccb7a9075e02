//! Server startup utilities.

use rostergap_config::ServerConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(
        r#"
                     __
   _________  _____/ /____  _____________ _____
  / ___/ __ \/ ___/ __/ _ \/ ___/ __ `/ __ `/ __ \
 / /  / /_/ (__  ) /_/  __/ /  / /_/ / /_/ / /_/ /
/_/   \____/____/\__/\___/_/   \__, /\__,_/ .___/
                              /____/     /_/
    "#
    );
}

/// Prints server startup information.
pub fn print_startup_info(server: &ServerConfig) {
    let addr = server.addr();
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("REST API:  http://{}", addr);
    info!("Health:    http://{}/health", addr);
    info!("API Docs:  http://{}/swagger-ui", addr);
    info!("{}", separator);
}
