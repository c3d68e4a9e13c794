//! Radix conversion between base-256 bytes and base-58 digits.
//!
//! Works on a fixed-size big-endian digit buffer instead of an
//! arbitrary-precision integer: each input digit is folded in by multiplying
//! the buffer by the source base and adding the digit, propagating the carry
//! from the least significant position upward.

/// Output buffer size for converting `len` bytes to base 58.
///
/// `138 / 100` over-approximates `log(256) / log(58)`.
pub(crate) fn encoded_capacity(len: usize) -> usize {
    (len * 138).div_ceil(100) + 1
}

/// Output buffer size for converting `len` base-58 digits to bytes.
///
/// `733 / 1000` over-approximates `log(58) / log(256)`.
pub(crate) fn decoded_capacity(len: usize) -> usize {
    (len * 733).div_ceil(1000) + 1
}

/// Convert a big-endian digit sequence from `from_base` to `to_base`.
///
/// `capacity` must be large enough to hold the converted magnitude. Leading
/// zero digits left over in the buffer are stripped, so positional zeros in
/// the input are not represented in the output; callers restore them.
///
/// # Arguments
/// * `digits` - Input digits, most significant first, each `< from_base`.
/// * `from_base` - Radix of the input digits (at most 256).
/// * `to_base` - Radix of the output digits (at most 256).
/// * `capacity` - Size of the working buffer.
///
/// # Returns
/// The output digits, most significant first, with no leading zeros.
pub(crate) fn convert<I>(digits: I, from_base: u32, to_base: u32, capacity: usize) -> Vec<u8>
where
    I: IntoIterator<Item = u8>,
{
    let mut buf = vec![0u8; capacity];
    // Number of low-order positions holding significant digits so far.
    let mut length = 0usize;

    for digit in digits {
        let mut carry = u32::from(digit);
        let mut i = 0usize;
        for slot in buf.iter_mut().rev() {
            if carry == 0 && i >= length {
                break;
            }
            carry += from_base * u32::from(*slot);
            *slot = (carry % to_base) as u8;
            carry /= to_base;
            i += 1;
        }
        debug_assert_eq!(carry, 0, "digit buffer too small for conversion");
        length = i;
    }

    let start = buf.iter().position(|&d| d != 0).unwrap_or(buf.len());
    buf.drain(..start);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_small_values() {
        // 255 = 4 * 58 + 23
        assert_eq!(convert([255u8], 256, 58, encoded_capacity(1)), vec![4, 23]);
        assert_eq!(convert([4u8, 23], 58, 256, decoded_capacity(2)), vec![255]);
    }

    #[test]
    fn test_convert_zero_is_empty() {
        assert!(convert([0u8, 0, 0], 256, 58, encoded_capacity(3)).is_empty());
        assert!(convert(std::iter::empty(), 58, 256, decoded_capacity(0)).is_empty());
    }

    #[test]
    fn test_convert_multi_byte() {
        // 0x0100 = 256 = 4 * 58 + 24
        assert_eq!(convert([1u8, 0], 256, 58, encoded_capacity(2)), vec![4, 24]);
        assert_eq!(convert([4u8, 24], 58, 256, decoded_capacity(2)), vec![1, 0]);
    }

    #[test]
    fn test_capacities() {
        assert_eq!(encoded_capacity(0), 1);
        assert_eq!(encoded_capacity(1), 3);
        assert_eq!(encoded_capacity(32), 46);
        assert_eq!(decoded_capacity(0), 1);
        assert_eq!(decoded_capacity(44), 34);
    }
}
