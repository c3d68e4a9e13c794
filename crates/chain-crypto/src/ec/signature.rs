//! ECDSA signature types and their wire formats.
//!
//! * [`Signature`]: plain `(r, s)` with DER and 64-byte compact encodings.
//! * [`RecoverableSignature`]: `(r, s, recovery_id)` with the 65-byte
//!   `r || s || recovery_id` wire form.
//! * [`UnmarshaledSignature`]: `(v, r, s)` field access over the 65-byte form.

use k256::ecdsa::{self, RecoveryId};

use crate::CryptoError;

/// Length of a compact `r || s` signature.
pub const COMPACT_SIGNATURE_LEN: usize = 64;

/// Length of a recoverable `r || s || recovery_id` signature.
pub const RECOVERABLE_SIGNATURE_LEN: usize = 65;

/// Largest valid recovery id.
const MAX_RECOVERY_ID: u8 = 3;

/// An ECDSA signature with R and S components and no recovery id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// The R component of the signature (32 bytes, big-endian).
    r: [u8; 32],
    /// The S component of the signature (32 bytes, big-endian).
    s: [u8; 32],
}

impl Signature {
    /// Create a signature from raw R and S 32-byte arrays.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    /// Access the R component of the signature.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// Access the S component of the signature.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Parse a DER-encoded ECDSA signature.
    ///
    /// Expected format: 0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>
    ///
    /// # Arguments
    /// * `bytes` - DER-encoded signature bytes.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if the encoding is malformed or
    /// R or S is zero or not below the curve order.
    pub fn from_der(bytes: &[u8]) -> Result<Self, CryptoError> {
        let sig = ecdsa::Signature::from_der(bytes)
            .map_err(|e| CryptoError::InvalidSignature(format!("malformed DER signature: {}", e)))?;
        Ok(Self::from_k256(&sig))
    }

    /// Serialize the signature in DER format.
    ///
    /// Output format: 0x30 <len> 0x02 <r_len> <r_bytes> 0x02 <s_len> <s_bytes>
    /// with each integer minimally encoded.
    pub fn to_der(&self) -> Vec<u8> {
        let rb = canonicalize_int(&self.r);
        let sb = canonicalize_int(&self.s);

        let total_len = 6 + rb.len() + sb.len();
        let mut out = Vec::with_capacity(total_len);
        out.push(0x30);
        out.push((total_len - 2) as u8);
        out.push(0x02);
        out.push(rb.len() as u8);
        out.extend_from_slice(&rb);
        out.push(0x02);
        out.push(sb.len() as u8);
        out.extend_from_slice(&sb);
        out
    }

    /// Parse a 64-byte compact `r || s` signature.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if the length is wrong or R or
    /// S is zero or not below the curve order.
    pub fn from_compact(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != COMPACT_SIGNATURE_LEN {
            return Err(CryptoError::InvalidLength {
                expected: COMPACT_SIGNATURE_LEN,
                got: bytes.len(),
            });
        }
        let sig = ecdsa::Signature::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        Ok(Self::from_k256(&sig))
    }

    /// Serialize as a 64-byte compact `r || s` signature.
    pub fn to_compact(&self) -> [u8; COMPACT_SIGNATURE_LEN] {
        let mut out = [0u8; COMPACT_SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    fn from_k256(sig: &ecdsa::Signature) -> Self {
        let (r_bytes, s_bytes) = sig.split_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);
        Signature { r, s }
    }
}

/// An ECDSA signature augmented with a recovery id (0 to 3).
///
/// The recovery id selects which of the candidate public keys for `(r, s)`
/// signed the hash, so the key can be recovered from signature and hash alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    r: [u8; 32],
    s: [u8; 32],
    recovery_id: u8,
}

impl RecoverableSignature {
    /// Create a recoverable signature from its components.
    ///
    /// # Returns
    /// An error if the recovery id is above 3 or R or S is zero or not below
    /// the curve order.
    pub fn new(r: [u8; 32], s: [u8; 32], recovery_id: u8) -> Result<Self, CryptoError> {
        if recovery_id > MAX_RECOVERY_ID {
            return Err(CryptoError::InvalidSignature(format!(
                "recovery id {} out of range",
                recovery_id
            )));
        }
        ecdsa::Signature::from_scalars(k256::FieldBytes::from(r), k256::FieldBytes::from(s))
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        Ok(RecoverableSignature { r, s, recovery_id })
    }

    /// Parse the 65-byte wire form `r(32) || s(32) || recovery_id(1)`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != RECOVERABLE_SIGNATURE_LEN {
            return Err(CryptoError::InvalidLength {
                expected: RECOVERABLE_SIGNATURE_LEN,
                got: bytes.len(),
            });
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Self::new(r, s, bytes[64])
    }

    /// Serialize to the 65-byte wire form `r(32) || s(32) || recovery_id(1)`.
    pub fn to_bytes(&self) -> [u8; RECOVERABLE_SIGNATURE_LEN] {
        let mut out = [0u8; RECOVERABLE_SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.recovery_id;
        out
    }

    /// Access the R component.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// Access the S component.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Access the recovery id.
    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    /// Drop the recovery id, keeping the plain `(r, s)` signature.
    pub fn to_signature(&self) -> Signature {
        Signature::new(self.r, self.s)
    }

    pub(crate) fn from_k256(sig: &ecdsa::Signature, recovery_id: RecoveryId) -> Self {
        let plain = Signature::from_k256(sig);
        RecoverableSignature {
            r: plain.r,
            s: plain.s,
            recovery_id: recovery_id.to_byte(),
        }
    }

    pub(crate) fn to_k256(&self) -> Result<(ecdsa::Signature, RecoveryId), CryptoError> {
        let sig = ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(self.r),
            k256::FieldBytes::from(self.s),
        )
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        let recovery_id = RecoveryId::from_byte(self.recovery_id)
            .ok_or_else(|| CryptoError::InvalidSignature("invalid recovery id".to_string()))?;
        Ok((sig, recovery_id))
    }
}

/// Field-level view of a 65-byte `r || s || v` signature.
///
/// Marshaling is pure byte layout; no curve checks are performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnmarshaledSignature {
    pub v: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl UnmarshaledSignature {
    /// Split a 65-byte signature into `(v, r, s)`.
    pub fn unmarshal(signature: &[u8]) -> Result<Self, CryptoError> {
        if signature.len() != RECOVERABLE_SIGNATURE_LEN {
            return Err(CryptoError::InvalidLength {
                expected: RECOVERABLE_SIGNATURE_LEN,
                got: signature.len(),
            });
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&signature[..32]);
        s.copy_from_slice(&signature[32..64]);
        Ok(UnmarshaledSignature {
            v: signature[64],
            r,
            s,
        })
    }

    /// Join the fields back into `r || s || v`.
    pub fn marshal(&self) -> [u8; RECOVERABLE_SIGNATURE_LEN] {
        let mut out = [0u8; RECOVERABLE_SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// Join loose parts into `r || s || v`; `r` and `s` must be exactly 32 bytes.
    pub fn marshal_parts(
        v: u8,
        r: &[u8],
        s: &[u8],
    ) -> Result<[u8; RECOVERABLE_SIGNATURE_LEN], CryptoError> {
        for part in [r, s] {
            if part.len() != 32 {
                return Err(CryptoError::InvalidLength {
                    expected: 32,
                    got: part.len(),
                });
            }
        }
        let mut fields = UnmarshaledSignature {
            v,
            r: [0u8; 32],
            s: [0u8; 32],
        };
        fields.r.copy_from_slice(r);
        fields.s.copy_from_slice(s);
        Ok(fields.marshal())
    }
}

/// Canonicalize an integer for DER encoding.
///
/// Strips leading zeros from the big-endian representation and adds
/// a 0x00 padding byte if the high bit is set (to prevent interpretation
/// as a negative number).
fn canonicalize_int(val: &[u8; 32]) -> Vec<u8> {
    let start = val.iter().position(|&b| b != 0).unwrap_or(31);
    let trimmed = &val[start..];

    if trimmed[0] & 0x80 != 0 {
        let mut out = Vec::with_capacity(trimmed.len() + 1);
        out.push(0x00);
        out.extend_from_slice(trimmed);
        out
    } else {
        trimmed.to_vec()
    }
}
