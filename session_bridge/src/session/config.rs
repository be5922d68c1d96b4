use crate::config::Lookup;

pub(crate) const DEFAULT_SESSION_COOKIE_NAME: &str = "osu_session";
pub(crate) const DEFAULT_SESSION_NAMESPACE: &str = "osu-next";
/// `login_<guard>_<sha1 of the guard class>`: where the web application's
/// session guard keeps the authenticated user id.
pub(crate) const DEFAULT_SESSION_USER_FIELD: &str =
    "login_web_59ba36addc2b2f9401580f014c7f58ea4e30989d";

/// Suffix appended to the cookie name before computing the cookie value prefix.
pub(super) const COOKIE_PREFIX_VERSION: &str = "v2";

pub(super) const CSRF_QUERY_PARAM: &str = "csrf";
pub(super) const CSRF_SESSION_FIELD: &str = "_token";
pub(super) const VERIFIED_SESSION_FIELD: &str = "verified";
pub(super) const REQUIRES_VERIFICATION_SESSION_FIELD: &str = "requires_verification";

/// Names shared with the web application that issues the sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Cookie carrying the encrypted session id (`SESSION_COOKIE_NAME`).
    pub cookie_name: String,
    /// Prefix of session records in the shared store (`SESSION_NAMESPACE`).
    pub namespace: String,
    /// Session field holding the user id (`SESSION_USER_FIELD`).
    pub user_field: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            namespace: DEFAULT_SESSION_NAMESPACE.to_string(),
            user_field: DEFAULT_SESSION_USER_FIELD.to_string(),
        }
    }
}

impl SessionSettings {
    pub(crate) fn from_lookup(lookup: Lookup) -> Self {
        let or_default = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            cookie_name: or_default("SESSION_COOKIE_NAME", DEFAULT_SESSION_COOKIE_NAME),
            namespace: or_default("SESSION_NAMESPACE", DEFAULT_SESSION_NAMESPACE),
            user_field: or_default("SESSION_USER_FIELD", DEFAULT_SESSION_USER_FIELD),
        }
    }
}
