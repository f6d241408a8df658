//! HR Companion server

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hr_companion::{
    api::{self, AppState},
    backend::{repositories::Repositories, BackendClient, RestAuthProvider, RestObjectStorage},
    config::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hr_companion=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting HR Companion...");

    // Load configuration
    let path = std::env::var("HRC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.yml"));
    let config = Config::load_with_env(&path)?;
    config.validate()?;
    tracing::info!("Configuration loaded from {}", path.display());

    // Backend client shared by repositories, auth and storage
    let client = BackendClient::new(&config.backend).context("Failed to create backend client")?;
    tracing::info!("Backend: {}", config.backend.url);

    let state = AppState::new(
        config.clone(),
        Repositories::rest(&client),
        RestAuthProvider::boxed(client.clone()),
        RestObjectStorage::boxed(client),
    );

    // Drop expired notifications and abandoned search tickets (runs every minute)
    {
        let notifications = state.notifications.clone();
        let debouncer = state.debouncer.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                notifications.cleanup().await;
                debouncer.cleanup().await;
            }
        });
    }

    let app = api::build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
