use http::Uri;
use subtle::ConstantTimeEq;

use crate::session::config::CSRF_QUERY_PARAM;
use crate::session::errors::SessionError;
use crate::session::types::Session;

/// The `csrf` query parameter of the request URI.
///
/// A parameter given more than once is treated as absent.
pub(crate) fn csrf_token_from_uri(uri: &Uri) -> Option<String> {
    let query = uri.query()?;

    let mut tokens = url::form_urlencoded::parse(query.as_bytes())
        .filter(|(name, _)| name == CSRF_QUERY_PARAM)
        .map(|(_, value)| value);

    let token = tokens.next()?;
    if tokens.next().is_some() {
        tracing::warn!("Request carries more than one csrf parameter");
        return None;
    }

    Some(token.into_owned())
}

/// Check the token supplied with the request against the session's token.
pub(crate) fn verify_csrf_token(
    session: &Session,
    supplied: Option<&str>,
) -> Result<(), SessionError> {
    let Some(supplied) = supplied.filter(|token| !token.is_empty()) else {
        tracing::warn!("Missing csrf token");
        return Err(SessionError::MissingCsrfToken);
    };

    let matches = session
        .csrf
        .as_deref()
        .is_some_and(|stored| bool::from(stored.as_bytes().ct_eq(supplied.as_bytes())));

    if matches {
        Ok(())
    } else {
        tracing::warn!("Invalid csrf token");
        Err(SessionError::InvalidCsrfToken)
    }
}
