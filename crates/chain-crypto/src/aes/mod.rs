//! AES encryption in CBC and CTR modes.
//!
//! The block cipher comes from the `aes` crate; chaining, counter handling,
//! and padding are done here. The key length selects AES-128, AES-192, or
//! AES-256 and the IV is always one block.
//!
//! The counter and zero-padding rules follow CryptoSwift so ciphertexts
//! interoperate with clients built on it: only the low 64 bits of the CTR
//! counter block are incremented, and zero padding always appends at least
//! one byte.

use ::aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use ::aes::{Aes128, Aes192, Aes256};

use crate::CryptoError;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Block chaining mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockMode {
    /// Cipher block chaining.
    Cbc,
    /// Counter mode. The IV's high 8 bytes are a fixed nonce and its low 8
    /// bytes a big-endian counter that wraps without carrying into the nonce.
    Ctr,
}

/// Plaintext padding, applied before the block mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Padding {
    /// PKCS#7: always appends 1 to 16 bytes, each holding the pad length.
    Pkcs7,
    /// Appends 1 to 16 zero bytes up to the next block boundary, a full block
    /// for aligned input. All trailing zeros are stripped on decrypt.
    Zero,
    /// No padding. CBC then requires block-aligned input.
    None,
}

enum BlockCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl BlockCipher {
    fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let invalid = |_| invalid_key_len(key.len());
        match key.len() {
            16 => Aes128::new_from_slice(key).map(BlockCipher::Aes128).map_err(invalid),
            24 => Aes192::new_from_slice(key).map(BlockCipher::Aes192).map_err(invalid),
            32 => Aes256::new_from_slice(key).map(BlockCipher::Aes256).map_err(invalid),
            got => Err(invalid_key_len(got)),
        }
    }

    fn encrypt_block(&self, block: &mut [u8; BLOCK_LEN]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            BlockCipher::Aes128(c) => c.encrypt_block(block),
            BlockCipher::Aes192(c) => c.encrypt_block(block),
            BlockCipher::Aes256(c) => c.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &mut [u8; BLOCK_LEN]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            BlockCipher::Aes128(c) => c.decrypt_block(block),
            BlockCipher::Aes192(c) => c.decrypt_block(block),
            BlockCipher::Aes256(c) => c.decrypt_block(block),
        }
    }
}

/// Encrypt `plaintext` with AES.
///
/// # Arguments
/// * `plaintext` - Data to encrypt.
/// * `key` - 16, 24, or 32 bytes.
/// * `iv` - 16 bytes; the initial counter block in CTR mode.
/// * `mode` - CBC or CTR.
/// * `padding` - Padding applied to the plaintext first.
///
/// # Returns
/// The ciphertext, or an error for a bad key or IV length or unaligned
/// unpadded CBC input.
pub fn encrypt(
    plaintext: &[u8],
    key: &[u8],
    iv: &[u8],
    mode: BlockMode,
    padding: Padding,
) -> Result<Vec<u8>, CryptoError> {
    let cipher = BlockCipher::new(key)?;
    let iv = checked_iv(iv)?;
    let mut data = pad(plaintext, padding);

    match mode {
        BlockMode::Cbc => {
            if data.len() % BLOCK_LEN != 0 {
                return Err(CryptoError::EncryptionError(format!(
                    "CBC input of {} bytes is not a multiple of the block size",
                    data.len()
                )));
            }
            cbc_encrypt(&cipher, &iv, &mut data);
        }
        BlockMode::Ctr => ctr_apply(&cipher, &iv, &mut data),
    }
    Ok(data)
}

/// Decrypt `ciphertext` with AES and strip `padding`.
///
/// Takes the same arguments as [`encrypt`]. Fails with `DecryptionError` on
/// unaligned CBC input or malformed PKCS#7 padding.
pub fn decrypt(
    ciphertext: &[u8],
    key: &[u8],
    iv: &[u8],
    mode: BlockMode,
    padding: Padding,
) -> Result<Vec<u8>, CryptoError> {
    let cipher = BlockCipher::new(key)?;
    let iv = checked_iv(iv)?;
    let mut data = ciphertext.to_vec();

    match mode {
        BlockMode::Cbc => {
            if data.len() % BLOCK_LEN != 0 {
                return Err(CryptoError::DecryptionError(format!(
                    "CBC ciphertext of {} bytes is not a multiple of the block size",
                    data.len()
                )));
            }
            cbc_decrypt(&cipher, &iv, &mut data);
        }
        BlockMode::Ctr => ctr_apply(&cipher, &iv, &mut data),
    }
    unpad(data, padding)
}

fn invalid_key_len(got: usize) -> CryptoError {
    CryptoError::InvalidInput(format!(
        "AES key must be 16, 24 or 32 bytes, got {}",
        got
    ))
}

fn checked_iv(iv: &[u8]) -> Result<[u8; BLOCK_LEN], CryptoError> {
    iv.try_into().map_err(|_| CryptoError::InvalidLength {
        expected: BLOCK_LEN,
        got: iv.len(),
    })
}

fn cbc_encrypt(cipher: &BlockCipher, iv: &[u8; BLOCK_LEN], data: &mut [u8]) {
    let mut prev = *iv;
    for chunk in data.chunks_exact_mut(BLOCK_LEN) {
        let mut block = [0u8; BLOCK_LEN];
        block.copy_from_slice(chunk);
        xor_block(&mut block, &prev);
        cipher.encrypt_block(&mut block);
        chunk.copy_from_slice(&block);
        prev = block;
    }
}

fn cbc_decrypt(cipher: &BlockCipher, iv: &[u8; BLOCK_LEN], data: &mut [u8]) {
    let mut prev = *iv;
    for chunk in data.chunks_exact_mut(BLOCK_LEN) {
        let mut block = [0u8; BLOCK_LEN];
        block.copy_from_slice(chunk);
        let saved = block;
        cipher.decrypt_block(&mut block);
        xor_block(&mut block, &prev);
        chunk.copy_from_slice(&block);
        prev = saved;
    }
}

/// XOR the keystream into `data`. Encryption and decryption are the same operation.
fn ctr_apply(cipher: &BlockCipher, iv: &[u8; BLOCK_LEN], data: &mut [u8]) {
    let mut counter = *iv;
    for chunk in data.chunks_mut(BLOCK_LEN) {
        let mut keystream = counter;
        cipher.encrypt_block(&mut keystream);
        for (b, k) in chunk.iter_mut().zip(keystream.iter()) {
            *b ^= k;
        }
        inc_counter(&mut counter);
    }
}

/// Increment the low 8 bytes as a big-endian integer, wrapping at 2^64.
fn inc_counter(counter: &mut [u8; BLOCK_LEN]) {
    let mut low = [0u8; 8];
    low.copy_from_slice(&counter[8..]);
    let next = u64::from_be_bytes(low).wrapping_add(1);
    counter[8..].copy_from_slice(&next.to_be_bytes());
}

fn xor_block(block: &mut [u8; BLOCK_LEN], other: &[u8; BLOCK_LEN]) {
    for (b, o) in block.iter_mut().zip(other.iter()) {
        *b ^= o;
    }
}

fn pad(data: &[u8], padding: Padding) -> Vec<u8> {
    let mut out = data.to_vec();
    match padding {
        Padding::Pkcs7 => {
            let n = BLOCK_LEN - data.len() % BLOCK_LEN;
            out.resize(data.len() + n, n as u8);
        }
        Padding::Zero => {
            let n = BLOCK_LEN - data.len() % BLOCK_LEN;
            out.resize(data.len() + n, 0);
        }
        Padding::None => {}
    }
    out
}

fn unpad(mut data: Vec<u8>, padding: Padding) -> Result<Vec<u8>, CryptoError> {
    match padding {
        Padding::Pkcs7 => {
            let n = match data.last() {
                Some(&n) => n as usize,
                None => {
                    return Err(CryptoError::DecryptionError(
                        "empty input has no PKCS#7 padding".to_string(),
                    ))
                }
            };
            if n == 0 || n > BLOCK_LEN || n > data.len() {
                return Err(CryptoError::DecryptionError(format!(
                    "invalid PKCS#7 pad length {}",
                    n
                )));
            }
            let body = data.len() - n;
            if data[body..].iter().any(|&b| b as usize != n) {
                return Err(CryptoError::DecryptionError(
                    "inconsistent PKCS#7 padding bytes".to_string(),
                ));
            }
            data.truncate(body);
        }
        Padding::Zero => {
            let body = data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
            data.truncate(body);
        }
        Padding::None => {}
    }
    Ok(data)
}
