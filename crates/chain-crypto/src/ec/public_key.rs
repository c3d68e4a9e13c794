//! secp256k1 public key.
//!
//! Supports compressed/uncompressed SEC1 serialization and the point
//! conversions needed to combine keys.

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::ProjectivePoint;

use crate::CryptoError;

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key in bytes (prefix + 32 byte x + 32 byte y).
pub const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key.
///
/// Wraps a k256 `VerifyingKey`, which can never hold the point at infinity.
#[derive(Clone, Debug)]
pub struct PublicKey {
    /// The underlying k256 verifying key.
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a PublicKey from raw SEC1 encoded bytes.
    ///
    /// Accepts only compressed (33-byte, prefix 0x02/0x03) and uncompressed
    /// (65-byte, prefix 0x04) formats.
    ///
    /// # Arguments
    /// * `bytes` - SEC1-encoded public key bytes.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error if the length is unsupported or
    /// the bytes don't represent a valid point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        match (bytes.len(), bytes.first()) {
            (COMPRESSED_LEN, Some(0x02 | 0x03)) | (UNCOMPRESSED_LEN, Some(0x04)) => {}
            (COMPRESSED_LEN | UNCOMPRESSED_LEN, Some(prefix)) => {
                return Err(CryptoError::InvalidPublicKey(format!(
                    "prefix {:#04x} invalid for a {}-byte key",
                    prefix,
                    bytes.len()
                )));
            }
            _ => {
                return Err(CryptoError::InvalidPublicKey(format!(
                    "expected {} or {} bytes, got {}",
                    COMPRESSED_LEN,
                    UNCOMPRESSED_LEN,
                    bytes.len()
                )));
            }
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner: vk })
    }

    /// Create a PublicKey from a hex-encoded SEC1 string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string of a compressed (66 chars) or uncompressed (130 chars) key.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error if the hex or point is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the public key in compressed SEC1 format (33 bytes).
    ///
    /// The first byte is 0x02 (even Y) or 0x03 (odd Y), followed by the 32-byte X coordinate.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the public key in uncompressed SEC1 format (65 bytes).
    ///
    /// The first byte is 0x04, followed by 32-byte X and 32-byte Y coordinates.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize in either SEC1 format.
    ///
    /// # Arguments
    /// * `compressed` - `true` for the 33-byte form, `false` for the 65-byte form.
    pub fn serialize(&self, compressed: bool) -> Vec<u8> {
        if compressed {
            self.to_compressed().to_vec()
        } else {
            self.to_uncompressed().to_vec()
        }
    }

    /// Serialize the public key as a lowercase hexadecimal string (compressed format).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Construct a PublicKey from a k256 `VerifyingKey`.
    pub(crate) fn from_verifying_key(vk: VerifyingKey) -> Self {
        PublicKey { inner: vk }
    }

    /// Convert a projective point back into a public key.
    ///
    /// Fails if the point is the identity (point at infinity).
    pub(crate) fn from_projective_point(point: ProjectivePoint) -> Result<Self, CryptoError> {
        let vk = VerifyingKey::from_affine(point.to_affine()).map_err(|_| {
            CryptoError::PrimitiveFailure("result is the point at infinity".to_string())
        })?;
        Ok(PublicKey { inner: vk })
    }

    /// Convert this public key to a k256 `ProjectivePoint` for EC arithmetic.
    pub(crate) fn to_projective_point(&self) -> ProjectivePoint {
        ProjectivePoint::from(*self.inner.as_affine())
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_uncompressed() == other.to_uncompressed()
    }
}

impl Eq for PublicKey {}
