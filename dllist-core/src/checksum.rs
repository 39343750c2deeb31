//! CRC-32 over list payloads.
//!
//! The console validates lists with the IEEE polynomial (reflected
//! `0xEDB88320`, initial value and final xor `0xFFFFFFFF`), which is the
//! variant `crc32fast` implements.

use crc32fast::Hasher;

/// CRC-32/IEEE of `bytes`.
#[must_use]
pub fn crc32(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// CRC-32/IEEE of `bytes` as if the `width` bytes at `offset` were zero.
///
/// Used to check a payload whose checksum field already holds a value.
/// Ranges that run past the end of `bytes` are clamped.
#[must_use]
pub fn crc32_with_zeroed(bytes: &[u8], offset: usize, width: usize) -> u32 {
    let start = offset.min(bytes.len());
    let end = offset.saturating_add(width).min(bytes.len());

    let mut hasher = Hasher::new();
    hasher.update(&bytes[..start]);
    hasher.update(&vec![0u8; end - start]);
    hasher.update(&bytes[end..]);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_ieee_check_value() {
        // Standard CRC-32/ISO-HDLC check value.
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(b""), 0);
    }

    #[test]
    fn zeroed_range_matches_copy() {
        let bytes: Vec<u8> = (0u8..64).collect();

        let mut copy = bytes.clone();
        copy[8..12].fill(0);

        assert_eq!(crc32_with_zeroed(&bytes, 8, 4), crc32(&copy));
    }

    #[test]
    fn zeroed_range_is_clamped() {
        let bytes = [1u8, 2, 3];
        assert_eq!(crc32_with_zeroed(&bytes, 2, 4), crc32(&[1, 2, 0]));
        assert_eq!(crc32_with_zeroed(&bytes, 10, 4), crc32(&bytes));
    }
}
