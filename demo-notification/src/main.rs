mod config;
mod server;

use std::sync::Arc;

use session_bridge_axum::{BridgeConfig, init_with_config};

use crate::config::ListenConfig;
use crate::server::{init_tracing, router, shutdown_signal};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BridgeConfig::from_env()?;
    init_tracing("demo_notification", config.debug);

    // Exits once the session store retry policy is exhausted.
    let authenticator = Arc::new(init_with_config(&config).await?);

    let listen = ListenConfig::from_env()?;
    let listener = tokio::net::TcpListener::bind((listen.host.as_str(), listen.port)).await?;
    tracing::info!("Notification server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(authenticator))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
