//! Small helpers shared across modules.

/// Constant-time comparison of two byte slices.
///
/// Slices of different lengths compare unequal immediately; lengths are not
/// secret. For equal lengths every byte pair is visited regardless of where
/// the first difference occurs.
///
/// # Arguments
/// * `a` - First slice.
/// * `b` - Second slice.
///
/// # Returns
/// `true` if the slices have the same length and contents.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}
