//! Cryptographic primitives for a blockchain client.
//!
//! This crate provides:
//! - Base58 and Base58Check encoding/decoding
//! - Hash functions (SHA-256, SHA-256d, SHA-512, SHA-512d)
//! - Recoverable secp256k1 ECDSA signatures with self-verification
//! - Key generation, validation, derivation and public key combination
//! - Base64 encoding and AES (CBC and CTR modes)
//! - Constant-time byte comparison

pub mod aes;
pub mod base58;
pub mod base64;
pub mod ec;
pub mod ecdsa;
pub mod hash;
pub mod util;

mod error;
pub use error::{CryptoError, ErrorKind};
