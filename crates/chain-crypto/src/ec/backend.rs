//! The elliptic-curve capability consumed by the signing protocol.
//!
//! [`EcBackend`] is the seam between the recoverable-signature protocol in
//! [`crate::ecdsa`] and the curve arithmetic that does the real work.
//! [`K256Backend`] implements it with the pure-Rust `k256` crate, which keeps
//! no mutable state and is safe to share across threads.

use k256::ecdsa::signature::hazmat::RandomizedPrehashSigner;
use k256::ecdsa::{self, RecoveryId, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::ec::public_key::PublicKey;
use crate::ec::signature::RecoverableSignature;
use crate::CryptoError;

/// Curve primitives needed by the signing protocol.
///
/// Implementations must be reentrant: one instance is shared by every caller
/// of the process-wide context.
pub trait EcBackend: Send + Sync {
    /// Check that `secret` is 32 bytes encoding a nonzero scalar below the curve order.
    fn is_valid_secret_key(&self, secret: &[u8]) -> bool;

    /// Multiply the curve generator by `secret`.
    fn derive_public_key(&self, secret: &[u8; 32]) -> Result<PublicKey, CryptoError>;

    /// Add the points of `keys` together.
    ///
    /// Fails on an empty slice or when the sum is the point at infinity.
    fn combine_public_keys(&self, keys: &[PublicKey]) -> Result<PublicKey, CryptoError>;

    /// Produce a recoverable signature over a 32-byte prehash.
    ///
    /// The nonce is derived per RFC6979; with `extra_entropy` set, 32 fresh
    /// bytes from the OS random source are mixed into the derivation.
    fn sign_recoverable(
        &self,
        hash: &[u8; 32],
        secret: &[u8; 32],
        extra_entropy: bool,
    ) -> Result<RecoverableSignature, CryptoError>;

    /// Recover the signing public key from a prehash and recoverable signature.
    fn recover_public_key(
        &self,
        hash: &[u8; 32],
        signature: &RecoverableSignature,
    ) -> Result<PublicKey, CryptoError>;

    /// Fill `buf` from a cryptographically secure random source.
    fn fill_random(&self, buf: &mut [u8]) -> Result<(), CryptoError>;
}

/// [`EcBackend`] over the `k256` crate and the OS random number generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct K256Backend;

impl K256Backend {
    fn signing_key(secret: &[u8; 32]) -> Result<SigningKey, CryptoError> {
        SigningKey::from_slice(secret).map_err(|_| {
            CryptoError::InvalidPrivateKey("scalar is zero or not below the curve order".to_string())
        })
    }
}

impl EcBackend for K256Backend {
    fn is_valid_secret_key(&self, secret: &[u8]) -> bool {
        secret.len() == 32 && SigningKey::from_slice(secret).is_ok()
    }

    fn derive_public_key(&self, secret: &[u8; 32]) -> Result<PublicKey, CryptoError> {
        let signing_key = Self::signing_key(secret)?;
        Ok(PublicKey::from_verifying_key(*signing_key.verifying_key()))
    }

    fn combine_public_keys(&self, keys: &[PublicKey]) -> Result<PublicKey, CryptoError> {
        let (first, rest) = keys
            .split_first()
            .ok_or_else(|| CryptoError::InvalidInput("no public keys to combine".to_string()))?;
        let sum = rest
            .iter()
            .fold(first.to_projective_point(), |acc, key| acc + key.to_projective_point());
        PublicKey::from_projective_point(sum)
    }

    fn sign_recoverable(
        &self,
        hash: &[u8; 32],
        secret: &[u8; 32],
        extra_entropy: bool,
    ) -> Result<RecoverableSignature, CryptoError> {
        let signing_key = Self::signing_key(secret)?;

        let (sig, recovery_id) = if extra_entropy {
            let sig: ecdsa::Signature = signing_key
                .sign_prehash_with_rng(&mut OsRng, hash)
                .map_err(|e| CryptoError::PrimitiveFailure(e.to_string()))?;
            let recovery_id =
                RecoveryId::trial_recovery_from_prehash(signing_key.verifying_key(), hash, &sig)
                    .map_err(|e| CryptoError::PrimitiveFailure(e.to_string()))?;
            (sig, recovery_id)
        } else {
            signing_key
                .sign_prehash_recoverable(hash)
                .map_err(|e| CryptoError::PrimitiveFailure(e.to_string()))?
        };

        Ok(RecoverableSignature::from_k256(&sig, recovery_id))
    }

    fn recover_public_key(
        &self,
        hash: &[u8; 32],
        signature: &RecoverableSignature,
    ) -> Result<PublicKey, CryptoError> {
        let (sig, recovery_id) = signature.to_k256()?;
        // k256 only recovers from low-S; (r, n - s) with the y parity flipped names the same key
        let (sig, recovery_id) = match sig.normalize_s() {
            Some(low) => (
                low,
                RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            ),
            None => (sig, recovery_id),
        };
        let vk = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
            .map_err(|e| CryptoError::PrimitiveFailure(format!("key recovery failed: {}", e)))?;
        Ok(PublicKey::from_verifying_key(vk))
    }

    fn fill_random(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| CryptoError::PrimitiveFailure(format!("random source failed: {}", e)))
    }
}
