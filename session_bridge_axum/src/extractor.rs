use std::ops::Deref;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Response},
};
use http::{StatusCode, request::Parts};

use session_bridge::{AuthenticatedIdentity, SessionAuthenticator, SessionError};

use super::error::{public_message, status_for};

/// A logged-in user of the web application, as an Axum extractor
///
/// Extraction runs the full check: session cookie, stored session, and the
/// `csrf` query parameter. Anonymous requests are answered with 401; failed
/// checks with the status from [`status_for`](crate::status_for).
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{routing::get, Router};
/// use session_bridge_axum::{SessionAuthenticator, SessionIdentity};
///
/// async fn whoami(identity: SessionIdentity) -> String {
///     format!("user {}", identity.user_id)
/// }
///
/// fn app(authenticator: Arc<SessionAuthenticator>) -> Router {
///     Router::new()
///         .route("/whoami", get(whoami))
///         .with_state(authenticator)
/// }
/// ```
#[derive(Clone, Debug)]
pub struct SessionIdentity(pub AuthenticatedIdentity);

impl Deref for SessionIdentity {
    type Target = AuthenticatedIdentity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug)]
pub enum SessionRejection {
    /// No session cookie, no stored session, or no user in it.
    Anonymous,
    Failed(SessionError),
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Anonymous => {
                tracing::debug!("Unauthorized");
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
            Self::Failed(e) => (status_for(&e), public_message(&e)).into_response(),
        }
    }
}

async fn verify(
    parts: &Parts,
    authenticator: Arc<SessionAuthenticator>,
) -> Result<Option<AuthenticatedIdentity>, SessionRejection> {
    authenticator
        .verify_parts(&parts.uri, &parts.headers)
        .await
        .map_err(SessionRejection::Failed)
}

impl<S> FromRequestParts<S> for SessionIdentity
where
    Arc<SessionAuthenticator>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = Arc::<SessionAuthenticator>::from_ref(state);
        verify(parts, authenticator)
            .await?
            .map(Self)
            .ok_or(SessionRejection::Anonymous)
    }
}

/// Anonymous requests extract as `None`; failed checks still reject.
impl<S> OptionalFromRequestParts<S> for SessionIdentity
where
    Arc<SessionAuthenticator>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let authenticator = Arc::<SessionAuthenticator>::from_ref(state);
        Ok(verify(parts, authenticator).await?.map(Self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;
    use http::header::COOKIE;
    use session_bridge::{AppKey, InMemorySessionStore, SessionSettings, StorageError};

    fn state() -> Arc<SessionAuthenticator> {
        Arc::new(SessionAuthenticator::new(
            &AppKey::from_bytes([3u8; 32]),
            SessionSettings::default(),
            Arc::new(InMemorySessionStore::new()),
        ))
    }

    fn parts(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/ws?csrf=T1");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_anonymous_is_rejected_with_401() {
        let state = state();
        let mut parts = parts(None);

        let rejection =
            <SessionIdentity as FromRequestParts<_>>::from_request_parts(&mut parts, &state)
                .await
                .unwrap_err();
        assert!(matches!(rejection, SessionRejection::Anonymous));
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_cookie_is_rejected_with_400() {
        let state = state();
        let mut parts = parts(Some("osu_session=garbage"));

        let rejection =
            <SessionIdentity as FromRequestParts<_>>::from_request_parts(&mut parts, &state)
                .await
                .unwrap_err();
        assert!(matches!(
            rejection,
            SessionRejection::Failed(SessionError::MalformedEnvelope(_))
        ));
        assert_eq!(rejection.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_optional_anonymous_is_none() {
        let state = state();
        let mut parts = parts(Some("locale=en"));

        let identity =
            <SessionIdentity as OptionalFromRequestParts<_>>::from_request_parts(&mut parts, &state)
                .await
                .unwrap();
        assert!(identity.is_none());
    }

    #[tokio::test]
    async fn test_optional_still_rejects_bad_cookie() {
        let state = state();
        let mut parts = parts(Some("osu_session=garbage"));

        let result =
            <SessionIdentity as OptionalFromRequestParts<_>>::from_request_parts(&mut parts, &state)
                .await;
        assert!(matches!(result, Err(SessionRejection::Failed(_))));
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_failed_rejection_uses_error_status() {
        let response = SessionRejection::Failed(SessionError::InvalidCsrfToken).into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_text(response).await,
            SessionError::InvalidCsrfToken.to_string()
        );
    }

    #[tokio::test]
    async fn test_failed_rejection_hides_store_details() {
        let error = SessionError::StoreUnavailable(StorageError::Unavailable(
            "redis://10.0.0.5:6379 refused".to_string(),
        ));
        let response = SessionRejection::Failed(error).into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_text(response).await;
        assert_eq!(body, "Session store unavailable");
        assert!(!body.contains("10.0.0.5"));
    }
}
