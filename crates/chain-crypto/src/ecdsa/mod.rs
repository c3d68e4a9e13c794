//! Recoverable ECDSA signing protocol.
//!
//! [`Secp256k1Context`] layers bounded retries and a self-consistency check
//! on top of an [`EcBackend`]: a signature is only handed out once the public
//! key recovered from it matches the key derived from the signer's secret.
//! The module-level functions run against a process-wide context that is
//! built on first use and never mutated afterwards.
//!
//! All inputs and outputs are raw byte buffers so the functions can sit
//! directly under transaction and identity code that moves opaque blobs.

mod retry;

pub use crate::ec::private_key::PRIVATE_KEY_LEN;
pub use retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};

use std::sync::LazyLock;

use zeroize::Zeroizing;

use crate::ec::backend::{EcBackend, K256Backend};
use crate::ec::public_key::PublicKey;
use crate::ec::signature::{RecoverableSignature, RECOVERABLE_SIGNATURE_LEN};
use crate::util::constant_time_eq;
use crate::CryptoError;

/// Required length of a message hash.
pub const HASH_LEN: usize = 32;

static GLOBAL_CONTEXT: LazyLock<Secp256k1Context> = LazyLock::new(Secp256k1Context::new);

/// Signing, recovery, and key utilities over an EC backend and a retry policy.
///
/// The context holds no mutable state, so a shared reference can be used
/// from any number of threads at once.
#[derive(Debug, Default)]
pub struct Secp256k1Context<B = K256Backend> {
    backend: B,
    policy: RetryPolicy,
}

impl Secp256k1Context<K256Backend> {
    /// A context over `k256` with the default retry policy.
    pub fn new() -> Self {
        Self::with_backend(K256Backend, RetryPolicy::default())
    }

    /// A context over `k256` with a custom retry policy.
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self::with_backend(K256Backend, policy)
    }

    /// The process-wide context used by the module-level functions.
    pub fn global() -> &'static Self {
        &GLOBAL_CONTEXT
    }
}

impl<B: EcBackend> Secp256k1Context<B> {
    /// A context over an arbitrary backend.
    pub fn with_backend(backend: B, policy: RetryPolicy) -> Self {
        Secp256k1Context { backend, policy }
    }

    /// The retry policy applied to signing and key generation.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The underlying EC backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Check that `private_key` is 32 bytes encoding a nonzero scalar below the curve order.
    pub fn is_valid_private_key(&self, private_key: &[u8]) -> bool {
        private_key.len() == PRIVATE_KEY_LEN && self.backend.is_valid_secret_key(private_key)
    }

    /// Generate a random valid private key.
    ///
    /// Draws 32 bytes from the backend's random source per attempt and keeps
    /// the first candidate that passes validation.
    ///
    /// # Returns
    /// The 32-byte key, or `RetryExhausted` if no valid candidate was found.
    pub fn generate_private_key(&self) -> Result<[u8; PRIVATE_KEY_LEN], CryptoError> {
        self.policy.run("generate_private_key", |_| {
            let mut candidate = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
            self.backend.fill_random(&mut candidate[..])?;
            if !self.backend.is_valid_secret_key(&candidate[..]) {
                return Err(CryptoError::InvalidPrivateKey(
                    "random candidate out of range".to_string(),
                ));
            }
            Ok(*candidate)
        })
    }

    /// Derive the public key of `private_key`.
    ///
    /// # Arguments
    /// * `private_key` - 32-byte secret scalar.
    /// * `compressed` - Serialize as 33 bytes instead of 65.
    pub fn derive_public_key(
        &self,
        private_key: &[u8],
        compressed: bool,
    ) -> Result<Vec<u8>, CryptoError> {
        let secret = self.checked_private_key(private_key)?;
        let public_key = self.backend.derive_public_key(&secret)?;
        Ok(public_key.serialize(compressed))
    }

    /// Sign a 32-byte hash, returning the 65-byte `r || s || recovery_id` form.
    ///
    /// # Arguments
    /// * `hash` - Message hash, exactly 32 bytes.
    /// * `private_key` - Valid 32-byte secret scalar.
    /// * `extra_entropy` - Mix fresh random bytes into each nonce.
    ///
    /// # Returns
    /// The self-verified signature, an input error, or `RetryExhausted`.
    pub fn sign(
        &self,
        hash: &[u8],
        private_key: &[u8],
        extra_entropy: bool,
    ) -> Result<[u8; RECOVERABLE_SIGNATURE_LEN], CryptoError> {
        let hash = checked_hash(hash)?;
        let secret = self.checked_private_key(private_key)?;
        let signature = self.sign_verified("sign", &hash, &secret, extra_entropy)?;
        Ok(signature.to_bytes())
    }

    /// Sign a 32-byte hash, returning the DER encoding without a recovery id.
    ///
    /// Runs the same verified signing loop as [`Self::sign`].
    pub fn sign_der(
        &self,
        hash: &[u8],
        private_key: &[u8],
        extra_entropy: bool,
    ) -> Result<Vec<u8>, CryptoError> {
        let hash = checked_hash(hash)?;
        let secret = self.checked_private_key(private_key)?;
        let signature = self.sign_verified("sign_der", &hash, &secret, extra_entropy)?;
        Ok(signature.to_signature().to_der())
    }

    /// Recover the signer's public key from a hash and a 65-byte signature.
    ///
    /// # Arguments
    /// * `hash` - Message hash, exactly 32 bytes.
    /// * `signature` - `r || s || recovery_id`, recovery id 0 to 3.
    /// * `compressed` - Serialize as 33 bytes instead of 65.
    pub fn recover_public_key(
        &self,
        hash: &[u8],
        signature: &[u8],
        compressed: bool,
    ) -> Result<Vec<u8>, CryptoError> {
        let hash = checked_hash(hash)?;
        let signature = RecoverableSignature::from_bytes(signature)?;
        let public_key = self.backend.recover_public_key(&hash, &signature)?;
        Ok(public_key.serialize(compressed))
    }

    /// Add serialized public keys together.
    ///
    /// # Arguments
    /// * `keys` - Non-empty list of 33- or 65-byte SEC1 keys.
    /// * `output_compressed` - Serialize the sum as 33 bytes instead of 65.
    ///
    /// # Returns
    /// The serialized sum, or an error if the list is empty, any key is
    /// malformed, or the sum is the point at infinity.
    pub fn combine_public_keys<K: AsRef<[u8]>>(
        &self,
        keys: &[K],
        output_compressed: bool,
    ) -> Result<Vec<u8>, CryptoError> {
        if keys.is_empty() {
            return Err(CryptoError::InvalidInput(
                "no public keys to combine".to_string(),
            ));
        }
        let parsed = keys
            .iter()
            .map(|key| PublicKey::from_bytes(key.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let combined = self.backend.combine_public_keys(&parsed)?;
        Ok(combined.serialize(output_compressed))
    }

    /// The bounded sign-recover-compare loop shared by [`Self::sign`] and [`Self::sign_der`].
    fn sign_verified(
        &self,
        operation: &'static str,
        hash: &[u8; HASH_LEN],
        secret: &[u8; PRIVATE_KEY_LEN],
        extra_entropy: bool,
    ) -> Result<RecoverableSignature, CryptoError> {
        self.policy.run(operation, |attempt| {
            let signature = self.backend.sign_recoverable(hash, secret, extra_entropy)?;
            let recovered = self.backend.recover_public_key(hash, &signature)?;
            let expected = self.backend.derive_public_key(secret)?;
            if !constant_time_eq(&recovered.to_uncompressed(), &expected.to_uncompressed()) {
                tracing::debug!(operation, attempt, "recovered key does not match signer, discarding signature");
                return Err(CryptoError::PrimitiveFailure(
                    "recovered public key does not match signing key".to_string(),
                ));
            }
            Ok(signature)
        })
    }

    fn checked_private_key(
        &self,
        private_key: &[u8],
    ) -> Result<Zeroizing<[u8; PRIVATE_KEY_LEN]>, CryptoError> {
        if private_key.len() != PRIVATE_KEY_LEN {
            return Err(CryptoError::InvalidLength {
                expected: PRIVATE_KEY_LEN,
                got: private_key.len(),
            });
        }
        if !self.backend.is_valid_secret_key(private_key) {
            return Err(CryptoError::InvalidPrivateKey(
                "scalar is zero or not below the curve order".to_string(),
            ));
        }
        let mut secret = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
        secret.copy_from_slice(private_key);
        Ok(secret)
    }
}

fn checked_hash(hash: &[u8]) -> Result<[u8; HASH_LEN], CryptoError> {
    hash.try_into().map_err(|_| CryptoError::InvalidLength {
        expected: HASH_LEN,
        got: hash.len(),
    })
}

/// Sign with the process-wide context. See [`Secp256k1Context::sign`].
pub fn sign(
    hash: &[u8],
    private_key: &[u8],
    extra_entropy: bool,
) -> Result<[u8; RECOVERABLE_SIGNATURE_LEN], CryptoError> {
    Secp256k1Context::global().sign(hash, private_key, extra_entropy)
}

/// DER-sign with the process-wide context. See [`Secp256k1Context::sign_der`].
pub fn sign_der(hash: &[u8], private_key: &[u8], extra_entropy: bool) -> Result<Vec<u8>, CryptoError> {
    Secp256k1Context::global().sign_der(hash, private_key, extra_entropy)
}

/// Recover a public key with the process-wide context. See [`Secp256k1Context::recover_public_key`].
pub fn recover_public_key(hash: &[u8], signature: &[u8], compressed: bool) -> Result<Vec<u8>, CryptoError> {
    Secp256k1Context::global().recover_public_key(hash, signature, compressed)
}

/// Combine public keys with the process-wide context. See [`Secp256k1Context::combine_public_keys`].
pub fn combine_public_keys<K: AsRef<[u8]>>(
    keys: &[K],
    output_compressed: bool,
) -> Result<Vec<u8>, CryptoError> {
    Secp256k1Context::global().combine_public_keys(keys, output_compressed)
}

/// Validate a private key with the process-wide context.
pub fn is_valid_private_key(private_key: &[u8]) -> bool {
    Secp256k1Context::global().is_valid_private_key(private_key)
}

/// Generate a private key with the process-wide context.
pub fn generate_private_key() -> Result<[u8; PRIVATE_KEY_LEN], CryptoError> {
    Secp256k1Context::global().generate_private_key()
}

/// Derive a public key with the process-wide context.
pub fn derive_public_key(private_key: &[u8], compressed: bool) -> Result<Vec<u8>, CryptoError> {
    Secp256k1Context::global().derive_public_key(private_key, compressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec::signature::Signature;
    use crate::hash::sha256;

    fn key_hex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    /// RFC6979 vectors (Trezor/CoreBitcoin), signing SHA-256 of the message
    /// with deterministic nonces.
    #[test]
    fn test_rfc6979_der() {
        let tests = vec![
            (
                "cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50",
                "sample",
                "3045022100af340daf02cc15c8d5d08d7735dfe6b98a474ed373bdb5fbecf7571be52b384202205009fb27f37034a9b24b707b7c6b79ca23ddef9e25f7282e8a797efe53a8f124",
            ),
            (
                "0000000000000000000000000000000000000000000000000000000000000001",
                "Satoshi Nakamoto",
                "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d802202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
            ),
            (
                "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140",
                "Satoshi Nakamoto",
                "3045022100fd567d121db66e382991534ada77a6bd3106f0a1098c231e47993447cd6af2d002206b39cd0eb1bc8603e159ef5c20a5c8ad685a45b06ce9bebed3f153d10d93bed5",
            ),
            (
                "f8b8af8ce3c7cca5e300d33939540c10d45ce001b8f252bfbc57ba0342904181",
                "Alan Turing",
                "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea",
            ),
        ];

        for (key, msg, expected_der) in &tests {
            let hash = sha256(msg.as_bytes());
            let der = sign_der(&hash, &key_hex(key), false).unwrap();
            assert_eq!(hex::encode(&der), *expected_der, "RFC6979 test for message '{}'", msg);
        }
    }

    #[test]
    fn test_sign_matches_sign_der() {
        let key = key_hex("0000000000000000000000000000000000000000000000000000000000000001");
        let hash = sha256(b"Satoshi Nakamoto");
        let recoverable = sign(&hash, &key, false).unwrap();
        let der = sign_der(&hash, &key, false).unwrap();

        let compact = Signature::from_compact(&recoverable[..64]).unwrap();
        let from_der = Signature::from_der(&der).unwrap();
        assert_eq!(compact, from_der);
        assert!(recoverable[64] <= 3);
    }

    #[test]
    fn test_sign_and_recover() {
        for _ in 0..10 {
            let key = generate_private_key().unwrap();
            let hash = sha256(b"test data for compact signature");

            let sig = sign(&hash, &key, true).unwrap();
            assert_eq!(sig.len(), 65);

            for compressed in [true, false] {
                let recovered = recover_public_key(&hash, &sig, compressed).unwrap();
                assert_eq!(
                    recovered,
                    derive_public_key(&key, compressed).unwrap(),
                    "recovered public key should match"
                );
            }
        }
    }

    #[test]
    fn test_sign_rejects_bad_input() {
        let key = key_hex("0000000000000000000000000000000000000000000000000000000000000001");
        let hash = sha256(b"x");

        assert!(matches!(
            sign(&hash[..31], &key, true),
            Err(CryptoError::InvalidLength { expected: 32, got: 31 })
        ));
        assert!(matches!(
            sign(&hash, &key[..16], true),
            Err(CryptoError::InvalidLength { expected: 32, got: 16 })
        ));
        assert!(matches!(
            sign(&hash, &[0u8; 32], true),
            Err(CryptoError::InvalidPrivateKey(_))
        ));
        assert!(sign_der(&[], &key, false).is_err());
    }

    #[test]
    fn test_recover_rejects_bad_input() {
        let key = key_hex("0000000000000000000000000000000000000000000000000000000000000001");
        let hash = sha256(b"recover");
        let mut sig = sign(&hash, &key, false).unwrap();

        assert!(recover_public_key(&hash, &sig[..64], true).is_err());
        assert!(recover_public_key(&hash[..16], &sig, true).is_err());

        sig[64] = 4;
        assert!(matches!(
            recover_public_key(&hash, &sig, true),
            Err(CryptoError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_recover_accepts_high_s() {
        use k256::elliptic_curve::PrimeField;

        let key = key_hex("0000000000000000000000000000000000000000000000000000000000000001");
        let hash = sha256(b"non-normalized signer");
        let low = sign(&hash, &key, false).unwrap();

        let mut s = [0u8; 32];
        s.copy_from_slice(&low[32..64]);
        let s = Option::<k256::Scalar>::from(k256::Scalar::from_repr(s.into())).unwrap();
        let neg_s: [u8; 32] = (-s).to_bytes().into();

        let mut high = low;
        high[32..64].copy_from_slice(&neg_s);
        high[64] ^= 1;

        assert_eq!(
            hex::encode(recover_public_key(&hash, &high, true).unwrap()),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(
            recover_public_key(&hash, &high, false).unwrap(),
            recover_public_key(&hash, &low, false).unwrap()
        );
    }

    #[test]
    fn test_recover_with_wrong_hash_gives_other_key() {
        let key = generate_private_key().unwrap();
        let sig = sign(&sha256(b"one"), &key, true).unwrap();
        // Recovery either fails or yields an unrelated key; it never yields the signer.
        if let Ok(recovered) = recover_public_key(&sha256(b"two"), &sig, true) {
            assert_ne!(recovered, derive_public_key(&key, true).unwrap());
        }
    }

    #[test]
    fn test_private_key_validity() {
        assert!(is_valid_private_key(&key_hex(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140"
        )));
        assert!(!is_valid_private_key(&key_hex(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        )));
        assert!(!is_valid_private_key(&[0u8; 32]));
        assert!(!is_valid_private_key(&[1u8; 33]));
        assert!(!is_valid_private_key(&[]));
    }

    #[test]
    fn test_generate_private_key() {
        let a = generate_private_key().unwrap();
        let b = generate_private_key().unwrap();
        assert_eq!(a.len(), crate::ec::private_key::PRIVATE_KEY_LEN);
        assert!(is_valid_private_key(&a));
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_public_key_generator() {
        let one = key_hex("0000000000000000000000000000000000000000000000000000000000000001");
        assert_eq!(
            hex::encode(derive_public_key(&one, true).unwrap()),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        let uncompressed = derive_public_key(&one, false).unwrap();
        assert_eq!(uncompressed.len(), 65);
        assert_eq!(uncompressed[0], 0x04);
        assert!(derive_public_key(&[0u8; 32], true).is_err());
    }

    #[test]
    fn test_combine_public_keys() {
        let a = derive_public_key(&generate_private_key().unwrap(), true).unwrap();
        let b = derive_public_key(&generate_private_key().unwrap(), false).unwrap();

        let ab = combine_public_keys(&[a.clone(), b.clone()], true).unwrap();
        let ba = combine_public_keys(&[b.clone(), a.clone()], true).unwrap();
        assert_eq!(ab, ba);

        assert_eq!(combine_public_keys(&[a.clone()], true).unwrap(), a);
        let a_uncompressed = combine_public_keys(&[a.clone()], false).unwrap();
        assert_eq!(a_uncompressed.len(), 65);
        assert_eq!(combine_public_keys(&[a_uncompressed], true).unwrap(), a);
    }

    #[test]
    fn test_combine_rejects_bad_input() {
        let empty: [&[u8]; 0] = [];
        assert!(matches!(
            combine_public_keys(&empty, true),
            Err(CryptoError::InvalidInput(_))
        ));

        let a = derive_public_key(&generate_private_key().unwrap(), true).unwrap();
        assert!(matches!(
            combine_public_keys(&[a.clone(), a[..32].to_vec()], true),
            Err(CryptoError::InvalidPublicKey(_))
        ));

        // 0x05 is a SEC1 tag, not a compressed-key prefix
        let mut tagged = a.clone();
        tagged[0] = 0x05;
        assert!(matches!(
            combine_public_keys(&[tagged.clone()], true),
            Err(CryptoError::InvalidPublicKey(_))
        ));
        assert!(matches!(
            combine_public_keys(&[a.clone(), tagged], true),
            Err(CryptoError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_global_context_is_shared() {
        let first = Secp256k1Context::global() as *const _;
        let second = Secp256k1Context::global() as *const _;
        assert_eq!(first, second);
        assert_eq!(Secp256k1Context::global().policy(), &RetryPolicy::default());
    }
}
