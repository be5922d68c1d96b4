use std::sync::Arc;

use axum::{
    Router,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::Response,
    routing::get,
};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session_bridge_axum::{AuthenticatedIdentity, SessionAuthenticator, SessionIdentity};

pub(crate) fn router(authenticator: Arc<SessionAuthenticator>) -> Router {
    Router::new()
        .route("/", get(websocket_handler))
        .with_state(authenticator)
}

/// Upgrades only requests that carry a verified session and CSRF token; the
/// extractor rejects everything else before the handshake.
async fn websocket_handler(identity: SessionIdentity, ws: WebSocketUpgrade) -> Response {
    tracing::info!("Accepting connection for user {}", identity.user_id);
    ws.on_upgrade(move |socket| handle_socket(socket, identity.0))
}

async fn handle_socket(mut socket: WebSocket, identity: AuthenticatedIdentity) {
    let greeting = json!({
        "event": "connection.ready",
        "data": {
            "user_id": identity.user_id,
            "verified": identity.verified,
        },
    });

    if socket
        .send(Message::Text(greeting.to_string().into()))
        .await
        .is_err()
    {
        return;
    }

    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(_) | Message::Binary(_) => {
                if socket.send(message).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            // Pings are answered by the websocket layer
            _ => {}
        }
    }

    tracing::debug!("Connection for user {} closed", identity.user_id);
}

pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

pub(crate) fn init_tracing(app_name: &str, debug: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug || cfg!(debug_assertions) {
            format!("session_bridge_axum=debug,session_bridge=debug,{app_name}=debug,info").into()
        } else {
            "info".into()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("You can increase verbosity by setting the RUST_LOG environment variable.");
    tracing::info!("Example: RUST_LOG=debug ./demo-notification");
}
