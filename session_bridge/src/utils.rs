use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use thiserror::Error;

/// Standard alphabet, padding optional on decode. Cookie jars and proxies are
/// not consistent about keeping the trailing `=`.
const BASE64_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub(crate) fn base64_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    BASE64_LENIENT
        .decode(input.trim())
        .map_err(|e| UtilError::Format(format!("Failed to decode base64: {e}")))
}

#[cfg(test)]
pub(crate) fn base64_encode(input: impl AsRef<[u8]>) -> String {
    BASE64_LENIENT.encode(input)
}

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Invalid format: {0}")]
    Format(String),
}
