//! secp256k1 private key.
//!
//! Wraps a k256 signing key. Construction always validates the scalar range,
//! so a `PrivateKey` is usable for derivation and signing as soon as it exists.

use std::fmt;

use k256::ecdsa::SigningKey;
use zeroize::Zeroizing;

use crate::ec::public_key::PublicKey;
use crate::ec::signature::RecoverableSignature;
use crate::util::constant_time_eq;
use crate::CryptoError;

/// Length of a serialized private key in bytes.
pub const PRIVATE_KEY_LEN: usize = 32;

/// A secp256k1 private key.
///
/// The inner k256 key zeroizes its scalar when dropped.
#[derive(Clone)]
pub struct PrivateKey {
    /// The underlying k256 signing key.
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key.
    ///
    /// Candidates are drawn from the OS random number generator until one
    /// falls inside the valid scalar range, bounded by the global retry policy.
    ///
    /// # Returns
    /// `Ok(PrivateKey)`, or an error if the random source keeps failing.
    pub fn random() -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(crate::ecdsa::generate_private_key()?);
        Self::from_bytes(&*bytes)
    }

    /// Create a private key from raw 32-byte scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte slice representing the private key scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the bytes represent a valid scalar on secp256k1,
    /// or an error if the length is wrong or the scalar is zero or out of range.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(CryptoError::InvalidLength {
                expected: PRIVATE_KEY_LEN,
                got: bytes.len(),
            });
        }
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|_| CryptoError::InvalidPrivateKey("scalar is zero or not below the curve order".to_string()))?;
        Ok(PrivateKey { inner: signing_key })
    }

    /// Create a private key from a hexadecimal string.
    ///
    /// # Arguments
    /// * `hex_str` - A 64-character hex string representing the 32-byte scalar.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        if hex_str.is_empty() {
            return Err(CryptoError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LEN] {
        let mut out = [0u8; PRIVATE_KEY_LEN];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Serialize the private key as a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Derive the corresponding public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(*self.inner.verifying_key())
    }

    /// Sign a 32-byte message hash, producing a self-verified recoverable signature.
    ///
    /// Uses the process-wide context with fresh extra entropy mixed into the
    /// RFC6979 nonce.
    ///
    /// # Arguments
    /// * `hash` - The message hash to sign (must be 32 bytes).
    pub fn sign(&self, hash: &[u8]) -> Result<RecoverableSignature, CryptoError> {
        let secret = Zeroizing::new(self.to_bytes());
        let wire = crate::ecdsa::sign(hash, &*secret, true)?;
        RecoverableSignature::from_bytes(&wire)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        let ours = Zeroizing::new(self.to_bytes());
        let theirs = Zeroizing::new(other.to_bytes());
        constant_time_eq(&*ours, &*theirs)
    }
}

impl Eq for PrivateKey {}
