/// Unified error type for all chain-crypto operations.
///
/// Covers errors from encoding, hashing, EC operations, encryption, and the
/// bounded retry loops used for signing and key generation.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("encryption error: {0}")]
    EncryptionError(String),

    #[error("decryption error: {0}")]
    DecryptionError(String),

    #[error("primitive failure: {0}")]
    PrimitiveFailure(String),

    #[error("gave up after {attempts} attempts")]
    RetryExhausted { attempts: usize },
}

/// Coarse classification of a [`CryptoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or wrong-length argument, or a malformed key/signature encoding.
    InvalidInput,
    /// Private key outside the valid scalar range.
    InvalidKey,
    /// Text or checksum could not be decoded.
    DecodeFailure,
    /// The underlying EC, cipher, or random source reported a failure.
    PrimitiveFailure,
    /// A bounded retry loop did not converge.
    RetryExhausted,
}

impl CryptoError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::InvalidInput(_)
            | CryptoError::InvalidLength { .. }
            | CryptoError::InvalidPublicKey(_)
            | CryptoError::InvalidSignature(_) => ErrorKind::InvalidInput,
            CryptoError::InvalidPrivateKey(_) => ErrorKind::InvalidKey,
            CryptoError::InvalidBase58(_)
            | CryptoError::ChecksumMismatch
            | CryptoError::InvalidBase64(_)
            | CryptoError::InvalidHex(_) => ErrorKind::DecodeFailure,
            CryptoError::PrimitiveFailure(_)
            | CryptoError::EncryptionError(_)
            | CryptoError::DecryptionError(_) => ErrorKind::PrimitiveFailure,
            CryptoError::RetryExhausted { .. } => ErrorKind::RetryExhausted,
        }
    }
}

impl From<hex::FromHexError> for CryptoError {
    fn from(e: hex::FromHexError) -> Self {
        CryptoError::InvalidHex(e.to_string())
    }
}

impl From<base64::DecodeError> for CryptoError {
    fn from(e: base64::DecodeError) -> Self {
        CryptoError::InvalidBase64(e.to_string())
    }
}
