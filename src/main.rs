use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod modules;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use config::settings::AppConfig;
use infrastructure::queue::rabbitmq::RabbitMqService;
use modules::jobs::repository::FirestoreConnector;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    info!("Starting video intake...");

    let config = AppConfig::new()?;
    if config.firestore_credentials.is_none() {
        warn!("FIRESTORE_PRIVATE_KEY_JSON is not set, submissions will fail until it is");
    }
    if let Some(host) = &config.firestore_emulator_host {
        info!("Using Firestore emulator at {}", host);
    }

    let stores = Arc::new(FirestoreConnector::new(&config)?);
    let queue = Arc::new(RabbitMqService::new(&config.rabbitmq_url, &config.video_queue));

    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = AppState::new(config, stores, queue);
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
