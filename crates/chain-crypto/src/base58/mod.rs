//! Base58 encoding and decoding with optional checksum support.
//!
//! Provides raw Base58 encode/decode and Base58Check encode/decode (with a
//! double-SHA-256 checksum) for turning binary payloads such as keys and
//! signatures into human-copyable text.

mod convert;

use crate::hash::sha256d;
use crate::CryptoError;

/// Bitcoin's modified Base58 alphabet.
///
/// Excludes 0, O, I, l (and the Base64 symbols + and /) to reduce visual
/// ambiguity. A symbol's position is its digit value.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of the Base58Check checksum in bytes.
pub const CHECKSUM_LEN: usize = 4;

/// Marker for ASCII characters outside the alphabet.
const INVALID_DIGIT: u8 = 0xff;

/// ASCII-indexed reverse lookup of [`ALPHABET`].
const DECODE_MAP: [u8; 128] = build_decode_map();

const fn build_decode_map() -> [u8; 128] {
    let mut map = [INVALID_DIGIT; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        map[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    map
}

/// Encode a byte slice to a Base58 string.
///
/// Leading zero bytes are encoded as leading '1' characters, one per byte.
/// An empty slice encodes to the empty string.
///
/// # Arguments
/// * `data` - The bytes to encode.
///
/// # Returns
/// A Base58-encoded string.
pub fn encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|&&b| b == 0).count();
    let significant = &data[zeros..];

    let digits = convert::convert(
        significant.iter().copied(),
        256,
        58,
        convert::encoded_capacity(significant.len()),
    );

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat(ALPHABET[0] as char).take(zeros));
    out.extend(digits.iter().map(|&d| ALPHABET[d as usize] as char));
    out
}

/// Decode a Base58 string to a byte vector.
///
/// Surrounding whitespace is ignored. Leading '1' characters decode to
/// leading zero bytes.
///
/// # Arguments
/// * `s` - The Base58 string to decode.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or an error if the input is empty or contains a
/// character outside the alphabet.
pub fn decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(CryptoError::InvalidBase58("empty input".to_string()));
    }

    let mut digits = Vec::with_capacity(trimmed.len());
    for (pos, ch) in trimmed.char_indices() {
        let value = if ch.is_ascii() {
            DECODE_MAP[ch as usize]
        } else {
            INVALID_DIGIT
        };
        if value == INVALID_DIGIT {
            return Err(CryptoError::InvalidBase58(format!(
                "invalid character {:?} at position {}",
                ch, pos
            )));
        }
        digits.push(value);
    }

    let zeros = digits.iter().take_while(|&&d| d == 0).count();
    let significant = &digits[zeros..];

    let bytes = convert::convert(
        significant.iter().copied(),
        58,
        256,
        convert::decoded_capacity(significant.len()),
    );

    let mut out = Vec::with_capacity(zeros + bytes.len());
    out.resize(zeros, 0);
    out.extend_from_slice(&bytes);
    Ok(out)
}

/// Compute the Base58Check checksum: the first 4 bytes of SHA-256d(data).
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = sha256d(data);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

/// Encode a byte slice with a 4-byte double-SHA-256 checksum appended (Base58Check).
///
/// The result is `encode(data || checksum(data))`.
///
/// # Arguments
/// * `data` - The bytes to encode (typically version byte + payload).
///
/// # Returns
/// A Base58Check-encoded string.
pub fn check_encode(data: &[u8]) -> String {
    let mut payload = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum(data));
    encode(&payload)
}

/// Decode a Base58Check string, verifying the 4-byte checksum.
///
/// # Arguments
/// * `s` - The Base58Check string to decode.
///
/// # Returns
/// `Ok(Vec<u8>)` of the payload (without checksum) on success, or an
/// error for invalid encoding, a decoded length of 4 bytes or less, or a
/// checksum mismatch.
pub fn check_decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    let decoded = decode(s)?;
    if decoded.len() <= CHECKSUM_LEN {
        return Err(CryptoError::InvalidBase58(format!(
            "decoded length {} too short for checksum",
            decoded.len()
        )));
    }
    let (payload, carried) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
    if carried != checksum(payload) {
        return Err(CryptoError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_empty() {
        assert_eq!(encode(&[]), "");
        assert!(decode("").is_err());
        assert!(decode("   ").is_err());
    }

    #[test]
    fn test_base58_single_zero_byte() {
        let input = hex::decode("00").unwrap();
        assert_eq!(encode(&input), "1");
        let decoded = decode("1").unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_base58_decoded_address() {
        let input = hex::decode("00010966776006953D5567439E5E39F86A0D273BEED61967F6").unwrap();
        let encoded = encode(&input);
        assert_eq!(encoded, "16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM");
        let decoded = decode("16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM").unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_base58_decoded_hash() {
        let input = hex::decode("0123456789ABCDEF").unwrap();
        let encoded = encode(&input);
        assert_eq!(encoded, "C3CPq7c8PY");
        let decoded = decode("C3CPq7c8PY").unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_base58_leading_zeros() {
        let input = hex::decode("000000287FB4CD").unwrap();
        let encoded = encode(&input);
        assert_eq!(encoded, "111233QC4");
        let decoded = decode("111233QC4").unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_base58_only_zero_symbols() {
        assert_eq!(encode(&[0, 0, 0, 0]), "1111");
        assert_eq!(decode("1111").unwrap(), vec![0u8; 4]);
    }

    #[test]
    fn test_base58_encode_large_number() {
        assert_eq!(encode(&[255, 255, 255, 255]), "7YXq9G");
        assert_eq!(decode("7YXq9G").unwrap(), vec![255, 255, 255, 255]);
    }

    #[test]
    fn test_base58_surrounding_whitespace() {
        assert_eq!(decode("  C3CPq7c8PY\t").unwrap(), hex::decode("0123456789ABCDEF").unwrap());
    }

    #[test]
    fn test_base58_decode_invalid_character() {
        assert!(decode("invalid!@#$%").is_err());
        assert!(decode("1234!@#$%").is_err());
        for bad in ["0", "O", "I", "l", "+", "/", "C3CP q7c8PY", "é"] {
            assert!(
                matches!(decode(bad), Err(CryptoError::InvalidBase58(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_base58_check_roundtrip() {
        let payload = hex::decode("00f54a5851e9372b87810a8e60cdd2e7cfd80b6e31").unwrap();
        let encoded = check_encode(&payload);
        let decoded = check_decode(&encoded).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_base58_check_zero_payload() {
        let payload = [0u8; 21];
        let encoded = check_encode(&payload);
        assert_eq!(encoded, "1111111111111111111114oLvT2");
        assert_eq!(check_decode(&encoded).unwrap(), payload.to_vec());
    }

    #[test]
    fn test_base58_check_bad_checksum() {
        // Encode then tamper with the last character.
        let payload = vec![0x80, 0x01, 0x02, 0x03];
        let mut encoded = check_encode(&payload);
        let last = encoded.pop().unwrap();
        let replacement = if last == '1' { '2' } else { '1' };
        encoded.push(replacement);
        assert!(check_decode(&encoded).is_err());
    }

    #[test]
    fn test_base58_check_too_short() {
        // Four bytes decode fine as Base58 but leave no payload.
        let four = encode(&[1, 2, 3, 4]);
        assert!(matches!(check_decode(&four), Err(CryptoError::InvalidBase58(_))));
        assert!(check_decode("").is_err());
    }

    #[test]
    fn test_checksum_is_sha256d_prefix() {
        let data = b"checksum";
        assert_eq!(checksum(data)[..], sha256d(data)[..4]);
    }
}
