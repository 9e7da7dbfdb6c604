use anyhow::Result;
use tracing_subscriber::EnvFilter;

use contactbook_core::config::AppConfig;
use contactbook_server::{AppState, app, singleton};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;

    // Ensure only one instance serves this data directory
    let _lock = singleton::acquire_lock(&config.data_path())?;

    let bind = config.bind.clone();
    let state = AppState::new(config)?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("contactbook-server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
