//! Pestiform Web Server
//!
//! Run with: cargo run -p pestiform-web

use tracing::info;
use tracing_subscriber::EnvFilter;

use pestiform_common::PestiformConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Pestiform web server...");

    let config = PestiformConfig::load_default()?;

    // Create app state; the model is loaded exactly once here
    let state = pestiform_web::state::AppState::from_config(&config)?;

    // Build router
    let app = pestiform_web::router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
