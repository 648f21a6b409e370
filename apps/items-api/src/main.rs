use std::time::Duration;

use axum_helpers::server::create_production_app;
use core_config::tracing::{init_tracing, install_color_eyre};
use items_api::{AppState, Config, build_router};
use tracing::info;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let state = AppState::init(config).await?;
    let app = build_router(&state)?;

    info!("Starting Items API with graceful shutdown (30s timeout)");

    let bus = state.bus.clone();
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: waiting for in-flight event handlers");
            bus.drain().await;
            info!("Event handlers finished");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Items API shutdown complete");
    Ok(())
}
