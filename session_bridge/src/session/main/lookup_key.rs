use subtle::ConstantTimeEq;

use crate::session::errors::SessionError;
use crate::session::keys::{COOKIE_NAME_TAG_LEN, SessionKeys};
use crate::session::types::SessionLookupKey;

/// Hex encoded cookie name tag.
const PREFIX_HEX_LEN: usize = COOKIE_NAME_TAG_LEN * 2;
const PREFIX_SEPARATOR: u8 = b'|';

/// Turn a decrypted cookie value into the store key of its session.
///
/// Values of the form `<40 lowercase hex>|<id>` carry a cookie name tag that
/// must match ours exactly. Anything else is taken as a bare session id.
pub(crate) fn resolve_lookup_key(
    decrypted: &str,
    keys: &SessionKeys,
    namespace: &str,
) -> Result<SessionLookupKey, SessionError> {
    let session_id = match split_cookie_prefix(decrypted) {
        Some((tag_hex, session_id)) => {
            let tag = hex::decode(tag_hex)
                .map_err(|_| SessionError::CookieNameVerificationFailed)?;

            if !bool::from(keys.cookie_name_tag().ct_eq(&tag)) {
                tracing::warn!("Cookie name in session data failed HMAC verification");
                return Err(SessionError::CookieNameVerificationFailed);
            }

            session_id
        }
        None => decrypted,
    };

    Ok(SessionLookupKey::new(namespace, session_id))
}

/// Split `<tag hex>|<rest>`, or `None` when the value does not start with
/// exactly that shape.
fn split_cookie_prefix(decrypted: &str) -> Option<(&str, &str)> {
    let bytes = decrypted.as_bytes();

    let has_prefix = bytes.len() > PREFIX_HEX_LEN
        && bytes[..PREFIX_HEX_LEN]
            .iter()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        && bytes[PREFIX_HEX_LEN] == PREFIX_SEPARATOR;

    // Both split points sit on ASCII bytes, so they are char boundaries.
    has_prefix.then(|| {
        (
            &decrypted[..PREFIX_HEX_LEN],
            &decrypted[PREFIX_HEX_LEN + 1..],
        )
    })
}
