//! HTTP server startup logic.

use std::net::SocketAddr;

use axum::Router;
use axum_server::Handle;

use crate::config::AppConfig;
use crate::probe::ProbeMachine;

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address: {0}")]
    Address(String),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Parse the configured host and port into a socket address.
pub(crate) fn listen_addr(config: &AppConfig) -> Result<SocketAddr, ServerError> {
    format!("{}:{}", config.http.host, config.http.port)
        .parse()
        .map_err(|e| ServerError::Address(format!("Invalid http.host or http.port: {}", e)))
}

/// Start the HTTP server and block until it shuts down.
pub async fn start_server(
    app: Router,
    config: &AppConfig,
    probes: ProbeMachine,
) -> Result<(), ServerError> {
    let addr = listen_addr(config)?;
    let handle = Handle::new();

    tracing::info!(%addr, "Starting HTTP server");

    shutdown::setup_shutdown_handler(handle.clone(), probes);

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_addr_from_defaults() {
        let addr = listen_addr(&AppConfig::default()).unwrap();
        assert_eq!(addr.port(), 8080);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn test_listen_addr_rejects_hostname() {
        let mut config = AppConfig::default();
        config.http.host = "not an ip".to_string();
        assert!(matches!(listen_addr(&config), Err(ServerError::Address(_))));
    }
}
