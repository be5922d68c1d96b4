//! session-bridge-axum - Axum extractors for session-bridge
//!
//! Put an `Arc<SessionAuthenticator>` in the router state (directly or via
//! `FromRef`) and take [`SessionIdentity`] in any handler that must only run
//! for logged-in users of the web application.

mod error;
mod extractor;

pub use error::{IntoResponseError, status_for};
pub use extractor::{SessionIdentity, SessionRejection};

// Re-export what handlers and startup code need from session-bridge
pub use session_bridge::{
    AuthenticatedIdentity, BridgeConfig, SessionAuthenticator, SessionError, init,
    init_with_config,
};
