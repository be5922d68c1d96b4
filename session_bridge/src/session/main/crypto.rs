//! Envelope authentication and decryption
//!
//! Mirrors the web framework's encrypter: AES-256-CBC with PKCS#7 padding, and
//! an HMAC-SHA256 over the base64 `iv` and `value` strings, hex encoded in `mac`.

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, KeyIvInit, block_padding::Pkcs7};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::session::errors::SessionError;
use crate::session::keys::SessionKeys;
use crate::session::types::EncryptedEnvelope;
use crate::utils::base64_decode;

type HmacSha256 = Hmac<Sha256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Authenticate then decrypt. Decryption is never attempted on an envelope
/// whose mac does not verify.
pub(crate) fn open_envelope(
    envelope: &EncryptedEnvelope,
    keys: &SessionKeys,
) -> Result<String, SessionError> {
    verify_mac(envelope, keys)?;
    decrypt_envelope(envelope, keys)
}

pub(crate) fn compute_mac(key: &[u8], iv: &str, value: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(iv.as_bytes());
    mac.update(value.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

pub(crate) fn verify_mac(
    envelope: &EncryptedEnvelope,
    keys: &SessionKeys,
) -> Result<(), SessionError> {
    let expected = compute_mac(keys.encryption_key(), &envelope.iv, &envelope.value);

    // Undecodable hex can never match; treat it like any other wrong mac.
    let provided = hex::decode(&envelope.mac).unwrap_or_default();

    if bool::from(expected.ct_eq(&provided)) {
        Ok(())
    } else {
        tracing::warn!("Session data failed HMAC verification");
        Err(SessionError::HmacVerificationFailed)
    }
}

pub(crate) fn decrypt_envelope(
    envelope: &EncryptedEnvelope,
    keys: &SessionKeys,
) -> Result<String, SessionError> {
    let iv = base64_decode(&envelope.iv)
        .map_err(|e| SessionError::DecryptionFailed(format!("iv: {e}")))?;
    let ciphertext = base64_decode(&envelope.value)
        .map_err(|e| SessionError::DecryptionFailed(format!("value: {e}")))?;

    let decryptor = Aes256CbcDec::new_from_slices(keys.encryption_key(), &iv).map_err(|_| {
        SessionError::DecryptionFailed(format!("iv must be 16 bytes, got {}", iv.len()))
    })?;

    let plaintext = decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| SessionError::DecryptionFailed("bad padding or block length".to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|_| SessionError::DecryptionFailed("plaintext is not valid UTF-8".to_string()))
}
