//! Test utilities for session module tests
//!
//! A reference encryptor laid out the way the web framework writes cookies,
//! and builders for stored session payloads.

use aes::Aes256;
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};

use crate::config::AppKey;
use crate::serialized::{SerializedKey, SerializedValue};
use crate::session::config::{
    CSRF_SESSION_FIELD, DEFAULT_SESSION_COOKIE_NAME, DEFAULT_SESSION_USER_FIELD,
    VERIFIED_SESSION_FIELD,
};
use crate::session::keys::SessionKeys;
use crate::session::types::EncryptedEnvelope;
use crate::utils::base64_encode;

use super::crypto::compute_mac;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

pub(super) const TEST_IV: [u8; 16] = *b"0123456789abcdef";
pub(super) const TEST_USER_FIELD: &str = DEFAULT_SESSION_USER_FIELD;

/// `base64:` + bytes 1..=32.
pub(super) const TEST_APP_KEY: &str = "base64:AQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyA=";

pub(super) fn test_app_key() -> AppKey {
    AppKey::parse(TEST_APP_KEY).unwrap()
}

pub(super) fn test_keys() -> SessionKeys {
    SessionKeys::derive(&test_app_key(), DEFAULT_SESSION_COOKIE_NAME)
}

pub(super) fn encrypt_value(keys: &SessionKeys, plaintext: &str, iv: [u8; 16]) -> EncryptedEnvelope {
    let ciphertext = Aes256CbcEnc::new_from_slices(keys.encryption_key(), &iv)
        .unwrap()
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let iv = base64_encode(iv);
    let value = base64_encode(ciphertext);
    let mac = hex::encode(compute_mac(keys.encryption_key(), &iv, &value));

    EncryptedEnvelope { iv, value, mac }
}

/// `<hex cookie name tag>|`, as prepended to cookie values.
pub(super) fn cookie_name_prefix(keys: &SessionKeys) -> String {
    format!("{}|", hex::encode(keys.cookie_name_tag()))
}

/// Full cookie value: base64 of the envelope JSON.
pub(super) fn encrypt_cookie(keys: &SessionKeys, plaintext: &str) -> String {
    let envelope = encrypt_value(keys, plaintext, TEST_IV);
    let json = serde_json::json!({
        "iv": envelope.iv,
        "value": envelope.value,
        "mac": envelope.mac,
        "tag": "",
    });
    base64_encode(json.to_string())
}

/// Cookie for session id `session_id`, with a valid cookie name prefix.
pub(super) fn session_cookie(keys: &SessionKeys, session_id: &str) -> String {
    encrypt_cookie(keys, &format!("{}{}", cookie_name_prefix(keys), session_id))
}

/// Serialize the attributes, then serialize the result once more as a string.
pub(super) fn wrap_payload(attributes: &SerializedValue) -> Vec<u8> {
    SerializedValue::String(attributes.serialize()).serialize()
}

pub(super) fn session_payload(csrf: &str, user_id: Option<i64>, verified: bool) -> Vec<u8> {
    let string = |s: &str| SerializedValue::String(s.as_bytes().to_vec());
    let key = |s: &str| SerializedKey::String(s.as_bytes().to_vec());

    let mut attributes = vec![
        (key(CSRF_SESSION_FIELD), string(csrf)),
        (
            key("_previous"),
            SerializedValue::Array(vec![(key("url"), string("https://osu.ppy.sh/home"))]),
        ),
        (key(VERIFIED_SESSION_FIELD), SerializedValue::Bool(verified)),
    ];
    if let Some(user_id) = user_id {
        attributes.push((key(TEST_USER_FIELD), SerializedValue::Int(user_id)));
    }

    wrap_payload(&SerializedValue::Array(attributes))
}
