use tracing::{error, info};

use atrium_api::{app, config::AppConfig};
use atrium_auth::RevocationSweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    atrium_observability::init();

    let config = AppConfig::from_env().inspect_err(|e| {
        error!(error = %e, "refusing to start");
    })?;

    let state = app::services::build_services(&config).await?;
    let sweeper = RevocationSweeper::start(state.revocations.clone(), config.auth.sweep_interval)?;

    let app = app::build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.stop();
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
