//! Session payload decoding
//!
//! The session handler serializes the attribute array, and the cache layer
//! serializes the resulting string once more. So a stored record is a
//! serialized string whose contents are the serialized attributes.

use std::collections::HashMap;

use crate::serialized::{SerializedValue, unserialize};
use crate::session::config::{
    CSRF_SESSION_FIELD, REQUIRES_VERIFICATION_SESSION_FIELD, VERIFIED_SESSION_FIELD,
};
use crate::session::errors::SessionError;
use crate::session::types::{Session, SessionLookupKey};

/// Top-level attributes of a stored session.
#[derive(Debug, Clone, Default)]
pub(crate) struct SessionFields(HashMap<String, SerializedValue>);

impl SessionFields {
    pub(crate) fn get(&self, name: &str) -> Option<&SerializedValue> {
        self.0.get(name)
    }

    /// Pick out the attributes the bridge needs.
    ///
    /// A user id of an unexpected type means "no user", not an error.
    pub(crate) fn into_session(self, key: SessionLookupKey, user_field: &str) -> Session {
        let flag = |name: &str| self.get(name).is_some_and(SerializedValue::is_truthy);

        let user_id = self.get(user_field).and_then(|value| {
            let id = value.as_i64();
            if id.is_none() {
                tracing::debug!("Ignoring non-integer user id in session {}", key.redacted());
            }
            id
        });

        Session {
            csrf: self
                .get(CSRF_SESSION_FIELD)
                .and_then(SerializedValue::as_str)
                .map(str::to_string),
            user_id,
            verified: flag(VERIFIED_SESSION_FIELD),
            requires_verification: flag(REQUIRES_VERIFICATION_SESSION_FIELD),
            key,
        }
    }
}

/// Decode a stored session record into its attributes.
pub(crate) fn parse_session_payload(raw: &[u8]) -> Result<SessionFields, SessionError> {
    let outer = unserialize(raw)
        .map_err(|e| SessionError::SessionPayloadCorrupt(format!("outer layer: {e}")))?;

    let SerializedValue::String(inner) = outer else {
        return Err(SessionError::SessionPayloadCorrupt(
            "outer layer is not a string".to_string(),
        ));
    };

    let attributes = match unserialize(&inner)
        .map_err(|e| SessionError::SessionPayloadCorrupt(format!("inner layer: {e}")))?
    {
        SerializedValue::Array(entries) => entries,
        SerializedValue::Object { properties, .. } => properties,
        _ => {
            return Err(SessionError::SessionPayloadCorrupt(
                "inner layer is not an array".to_string(),
            ));
        }
    };

    Ok(SessionFields(
        attributes
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
    ))
}
