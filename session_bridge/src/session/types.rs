use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;

/// Scope granted to first-party sessions.
pub const UNIVERSAL_SCOPE: &str = "*";

/// `{iv, value, mac}` as carried (base64 JSON) in the session cookie.
///
/// Fields are kept in their encoded form: the mac covers the encoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EncryptedEnvelope {
    pub(crate) iv: String,
    pub(crate) value: String,
    pub(crate) mac: String,
}

/// Wire shape of the envelope before presence checks. Extra members written by
/// newer framework versions (`tag`) are ignored.
#[derive(Debug, Deserialize)]
pub(super) struct RawEnvelope {
    pub(super) iv: Option<String>,
    pub(super) value: Option<String>,
    pub(super) mac: Option<String>,
}

/// Key of a session record in the shared store: `<namespace>:<session id>`.
///
/// The session id is a bearer credential, so `Debug` and [`redacted`](Self::redacted)
/// leave it out. `Display` and [`as_str`](Self::as_str) give the full key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionLookupKey {
    key: String,
    namespace_len: usize,
}

impl SessionLookupKey {
    pub(crate) fn new(namespace: &str, session_id: &str) -> Self {
        Self {
            key: format!("{namespace}:{session_id}"),
            namespace_len: namespace.len(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn into_inner(self) -> String {
        self.key
    }

    /// The key with the session id masked, for logs.
    pub fn redacted(&self) -> String {
        format!("{}:[redacted]", &self.key[..self.namespace_len])
    }
}

impl fmt::Display for SessionLookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl fmt::Debug for SessionLookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionLookupKey")
            .field(&self.redacted())
            .finish()
    }
}

/// The fields of a stored session this bridge cares about.
///
/// Built fresh for every request; the store is the only source of truth.
#[derive(Clone)]
pub struct Session {
    pub key: SessionLookupKey,
    pub csrf: Option<String>,
    pub user_id: Option<i64>,
    pub verified: bool,
    pub requires_verification: bool,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key)
            .field("csrf", &self.csrf.as_ref().map(|_| "[redacted]"))
            .field("user_id", &self.user_id)
            .field("verified", &self.verified)
            .field("requires_verification", &self.requires_verification)
            .finish()
    }
}

/// A user whose session cookie and CSRF token both checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub key: String,
    pub user_id: i64,
    pub verified: bool,
    pub requires_verification: bool,
    pub scopes: BTreeSet<String>,
}

impl AuthenticatedIdentity {
    pub(crate) fn from_session(session: Session, user_id: i64) -> Self {
        Self {
            key: session.key.into_inner(),
            user_id,
            verified: session.verified,
            requires_verification: session.requires_verification,
            scopes: BTreeSet::from([UNIVERSAL_SCOPE.to_string()]),
        }
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(UNIVERSAL_SCOPE) || self.scopes.contains(scope)
    }
}
