//! Base64 encoding with the standard alphabet.

use ::base64::alphabet;
use ::base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use ::base64::engine::DecodePaddingMode;
use ::base64::Engine;

use crate::CryptoError;

/// Standard alphabet, padding optional on decode.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode `data` as padded standard Base64.
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode padded standard Base64.
pub fn decode(text: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(STANDARD.decode(text)?)
}

/// Decode standard Base64 whether or not the trailing `=` padding is present.
pub fn decode_lenient(text: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(LENIENT.decode(text)?)
}
