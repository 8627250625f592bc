use std::sync::Arc;

use parcel_portal::api;
use parcel_portal::config::Config;
use parcel_portal::error::AppError;
use parcel_portal::observability::logging;
use parcel_portal::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    logging::init(&config.log_level, config.log_format);

    let shared_state = Arc::new(AppState::from_config(&config)?);
    tracing::info!(
        backend_url = %config.backend_url,
        session_file = ?config.session_file,
        poll_ms = config.session_poll_ms,
        "portal state ready"
    );

    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
