use std::net::SocketAddr;
use std::sync::Arc;

use activities_bff::{
    clock::SystemClock,
    config::{Config, LogFormat},
    request_tracing, routes,
    state::AppState,
};
use anyhow::Result;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    // Logging first so configuration warnings are not lost
    request_tracing::init_tracing(LogFormat::from_env());
    let config = Config::from_env();

    tracing::info!(
        backend_api_url = %config.backend_api_url,
        allowed_origins = ?config.allowed_origins,
        "Configuration loaded"
    );

    let addr = config.bind_addr();
    let state = AppState::new(config, Arc::new(SystemClock))?;
    let app = routes::app(state);

    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("API server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
