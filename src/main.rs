// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use relief_dashboard::application::session::DashboardSession;
use relief_dashboard::infrastructure::config::load_app_config;
use relief_dashboard::infrastructure::http_api::HttpReliefApi;
use relief_dashboard::presentation::app_state::AppState;
use relief_dashboard::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;
    tracing::info!(
        "Using relief API at {} as {:?}",
        config.api.base_url,
        config.session.role
    );

    // Create API client (infrastructure layer)
    let api = Arc::new(HttpReliefApi::new(
        &config.api.base_url,
        config.session.role,
        config.api.timeout(),
    )?);

    // Create session (application layer) and run the initial load
    let session = DashboardSession::new(api, config.notifications.default_ttl());
    session.start().await;

    let state = Arc::new(AppState {
        session: session.clone(),
    });

    // Build router (presentation layer)
    let router = build_router(state);

    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting relief-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    session.shutdown();
    Ok(())
}
