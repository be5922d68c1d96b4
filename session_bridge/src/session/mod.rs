mod config;
mod errors;
mod keys;
mod main;
mod types;

pub use config::SessionSettings;
pub use errors::SessionError;
pub use main::SessionAuthenticator;
pub use types::{AuthenticatedIdentity, Session, SessionLookupKey, UNIVERSAL_SCOPE};
