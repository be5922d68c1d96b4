use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, Request, Uri};

use crate::config::AppKey;
use crate::session::config::SessionSettings;
use crate::session::errors::SessionError;
use crate::session::keys::SessionKeys;
use crate::session::types::{AuthenticatedIdentity, Session};
use crate::storage::SessionStore;

use super::cookie::get_cookie_from_headers;
use super::crypto::open_envelope;
use super::csrf::{csrf_token_from_uri, verify_csrf_token};
use super::envelope::decode_envelope;
use super::fields::parse_session_payload;
use super::lookup_key::resolve_lookup_key;

/// Authorizes incoming connections against the web application's sessions.
///
/// Holds only read-only key material and a shared store handle, so one
/// instance serves any number of concurrent requests.
#[derive(Clone)]
pub struct SessionAuthenticator {
    keys: SessionKeys,
    settings: SessionSettings,
    store: Arc<dyn SessionStore>,
}

impl fmt::Debug for SessionAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionAuthenticator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SessionAuthenticator {
    pub fn new(app_key: &AppKey, settings: SessionSettings, store: Arc<dyn SessionStore>) -> Self {
        Self {
            keys: SessionKeys::derive(app_key, &settings.cookie_name),
            settings,
            store,
        }
    }

    /// Authenticate the request that opens a connection.
    ///
    /// # Returns
    /// * `Ok(Some(identity))` - valid session of a logged-in user with a matching CSRF token
    /// * `Ok(None)` - anonymous: no usable URL, no session cookie, no stored
    ///   session, or a session without a user
    /// * `Err(SessionError)` - the request presented credentials that did not check out,
    ///   or the store could not be read
    pub async fn verify_request<B>(
        &self,
        request: &Request<B>,
    ) -> Result<Option<AuthenticatedIdentity>, SessionError> {
        self.verify_parts(request.uri(), request.headers()).await
    }

    /// [`verify_request`](Self::verify_request) for callers that only hold the
    /// request head, such as extractors.
    #[tracing::instrument(skip_all)]
    pub async fn verify_parts(
        &self,
        uri: &Uri,
        headers: &HeaderMap,
    ) -> Result<Option<AuthenticatedIdentity>, SessionError> {
        if uri.path_and_query().is_none() {
            tracing::debug!("Request has no usable URL");
            return Ok(None);
        }

        let Some(session) = self.session_from_headers(headers).await? else {
            return Ok(None);
        };

        let Some(user_id) = session.user_id else {
            tracing::debug!("Session {} has no authenticated user", session.key.redacted());
            return Ok(None);
        };

        let supplied = csrf_token_from_uri(uri);
        verify_csrf_token(&session, supplied.as_deref())?;

        tracing::debug!("Authenticated user {}", user_id);
        Ok(Some(AuthenticatedIdentity::from_session(session, user_id)))
    }

    /// Load the session named by the request's session cookie.
    ///
    /// Performs no CSRF check. Returns `None` when there is no cookie or the
    /// store holds no record for it.
    pub async fn session_from_headers(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<Session>, SessionError> {
        let Some(cookie) = get_cookie_from_headers(headers, &self.settings.cookie_name)
            .filter(|value| !value.is_empty())
        else {
            return Ok(None);
        };

        let envelope = decode_envelope(&cookie)?;
        let decrypted = open_envelope(&envelope, &self.keys)?;
        let key = resolve_lookup_key(&decrypted, &self.keys, &self.settings.namespace)?;

        let raw = self.store.get(key.as_str()).await.map_err(|e| {
            tracing::error!("Failed reading session store: {}", e);
            SessionError::from(e)
        })?;

        let Some(raw) = raw else {
            tracing::debug!("No stored session for {}", key.redacted());
            return Ok(None);
        };

        let fields = parse_session_payload(&raw).inspect_err(|e| {
            tracing::warn!("Stored session {} is unreadable: {}", key.redacted(), e);
        })?;

        Ok(Some(fields.into_session(key, &self.settings.user_field)))
    }
}
