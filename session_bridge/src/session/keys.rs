use std::fmt;

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::config::AppKey;

use super::config::COOKIE_PREFIX_VERSION;

type HmacSha1 = Hmac<Sha1>;

/// Length in bytes of the cookie name tag (one SHA-1 output).
pub(crate) const COOKIE_NAME_TAG_LEN: usize = 20;

/// Secrets derived once from the application key.
#[derive(Clone)]
pub(crate) struct SessionKeys {
    encryption_key: AppKey,
    cookie_name_tag: Vec<u8>,
}

impl SessionKeys {
    pub(crate) fn derive(app_key: &AppKey, cookie_name: &str) -> Self {
        Self {
            encryption_key: app_key.clone(),
            cookie_name_tag: cookie_name_tag(app_key, cookie_name),
        }
    }

    pub(crate) fn encryption_key(&self) -> &[u8] {
        self.encryption_key.as_bytes()
    }

    /// Expected prefix on decrypted cookie values, before hex encoding.
    pub(crate) fn cookie_name_tag(&self) -> &[u8] {
        &self.cookie_name_tag
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

/// HMAC-SHA1 over `<cookie name>v2`, which the web framework prepends (hex
/// encoded, followed by `|`) to cookie values before encrypting them.
pub(crate) fn cookie_name_tag(app_key: &AppKey, cookie_name: &str) -> Vec<u8> {
    let mut mac =
        HmacSha1::new_from_slice(app_key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(cookie_name.as_bytes());
    mac.update(COOKIE_PREFIX_VERSION.as_bytes());
    mac.finalize().into_bytes().to_vec()
}
