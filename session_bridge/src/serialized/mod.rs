//! Decoder for the framework's legacy serialization format
//!
//! Session payloads are written by the web application using its language's
//! native `serialize()` format: a self-describing text encoding where every
//! string carries its length in bytes. This module only reads the format; it
//! knows nothing about sessions.

mod errors;
mod parser;
mod value;

pub(crate) use errors::SerializedError;
pub(crate) use value::{SerializedKey, SerializedValue};

/// Decode exactly one value spanning the whole input.
pub(crate) fn unserialize(input: &[u8]) -> Result<SerializedValue, SerializedError> {
    parser::Parser::new(input).parse_document()
}
