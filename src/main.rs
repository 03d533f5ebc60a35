use std::sync::Arc;
use student_portal::{AppState, FileStore, PortalConfig, identity::DemoIdentityProvider, router};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = PortalConfig::from_env()?;
    let store = FileStore::open(config.store_path.clone()).await?;
    info!("local storage at {}", store.path().display());

    let addr = config.bind_address();
    let state = AppState::new(config, Arc::new(store), Arc::new(DemoIdentityProvider));
    let shutdown = state.shutdown.clone();
    let app = router(state);

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("failed to listen for shutdown signal: {err}");
                std::future::pending::<()>().await;
            }
            info!("shutting down");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
