//! Elliptic curve cryptography on secp256k1.
//!
//! Provides private keys, public keys, signature encodings, and the
//! [`EcBackend`] capability the signing protocol is built on.

pub mod backend;
pub mod private_key;
pub mod public_key;
pub mod signature;

pub use backend::{EcBackend, K256Backend};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::{RecoverableSignature, Signature, UnmarshaledSignature};
