use http::StatusCode;
use session_bridge::SessionError;

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Status code a rejected session check should be answered with.
pub fn status_for(error: &SessionError) -> StatusCode {
    match error {
        SessionError::MalformedEnvelope(_) => StatusCode::BAD_REQUEST,
        SessionError::HmacVerificationFailed
        | SessionError::CookieNameVerificationFailed
        | SessionError::DecryptionFailed(_) => StatusCode::UNAUTHORIZED,
        SessionError::MissingCsrfToken | SessionError::InvalidCsrfToken => StatusCode::FORBIDDEN,
        SessionError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        SessionError::SessionPayloadCorrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Store details stay in the logs; clients only learn the category.
pub(crate) fn public_message(error: &SessionError) -> String {
    match error {
        SessionError::StoreUnavailable(_) => "Session store unavailable".to_string(),
        SessionError::SessionPayloadCorrupt(_) => "Session could not be read".to_string(),
        _ => error.to_string(),
    }
}

impl<T> IntoResponseError<T> for Result<T, SessionError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (status_for(&e), public_message(&e)))
    }
}
