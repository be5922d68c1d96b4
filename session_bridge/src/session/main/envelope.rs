use crate::session::errors::SessionError;
use crate::session::types::{EncryptedEnvelope, RawEnvelope};
use crate::utils::base64_decode;

/// Decode a session cookie value into its encrypted envelope.
pub(crate) fn decode_envelope(cookie_value: &str) -> Result<EncryptedEnvelope, SessionError> {
    let json = base64_decode(cookie_value)
        .map_err(|e| SessionError::MalformedEnvelope(format!("Failed parsing session data: {e}")))?;

    let document: serde_json::Value = serde_json::from_slice(&json)
        .map_err(|e| SessionError::MalformedEnvelope(format!("Failed parsing session data: {e}")))?;

    if !document.is_object() {
        return Err(SessionError::MalformedEnvelope(
            "Session data is not an object".to_string(),
        ));
    }

    let raw: RawEnvelope = serde_json::from_value(document).map_err(|e| {
        SessionError::MalformedEnvelope(format!("Session data has unexpected field types: {e}"))
    })?;

    EncryptedEnvelope::try_from(raw)
}

impl TryFrom<RawEnvelope> for EncryptedEnvelope {
    type Error = SessionError;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        fn required(field: Option<String>, name: &str) -> Result<String, SessionError> {
            field.filter(|v| !v.is_empty()).ok_or_else(|| {
                SessionError::MalformedEnvelope(format!(
                    "Session data is missing required field '{name}'"
                ))
            })
        }

        Ok(Self {
            iv: required(raw.iv, "iv")?,
            value: required(raw.value, "value")?,
            mac: required(raw.mac, "mac")?,
        })
    }
}
