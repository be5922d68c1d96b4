use thiserror::Error;

use crate::storage::StorageError;

/// Every way an authentication attempt can be rejected.
///
/// Anonymous requests are not errors; they surface as `Ok(None)` from
/// [`SessionAuthenticator::verify_request`](super::SessionAuthenticator::verify_request).
#[derive(Debug, Error, Clone)]
pub enum SessionError {
    #[error("Malformed session envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Session data failed HMAC verification")]
    HmacVerificationFailed,

    #[error("Cookie name in session data failed HMAC verification")]
    CookieNameVerificationFailed,

    #[error("Failed decrypting session data: {0}")]
    DecryptionFailed(String),

    #[error("Session store unavailable: {0}")]
    StoreUnavailable(#[from] StorageError),

    #[error("Session payload is corrupt: {0}")]
    SessionPayloadCorrupt(String),

    #[error("Missing CSRF token")]
    MissingCsrfToken,

    #[error("Invalid CSRF token")]
    InvalidCsrfToken,
}
