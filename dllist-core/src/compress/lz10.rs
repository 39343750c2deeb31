//! LZ77 "type 0x10" container.
//!
//! ```text
//! [0x10][decompressed size: u24 LE]
//! repeat:
//!   [flags: u8]            bit 7 describes the first token
//!   8 tokens:
//!     flag 0 → literal byte
//!     flag 1 → [hi][lo] where (hi << 8 | lo) = (len - 3) << 12 | (distance - 1)
//! ```
//!
//! Lengths run from 3 to 18 and distances from 1 to 4096. The stream is
//! padded with zeros to a multiple of four bytes.

use super::Compressor;
use crate::error::{DllistError, Result};

/// Largest input the 24-bit size field can describe.
pub const MAX_INPUT_LEN: usize = 0x00FF_FFFF;

const MAGIC: u8 = 0x10;
const MIN_MATCH: usize = 3;
const MAX_MATCH: usize = 18;
const WINDOW: usize = 4096;
const HASH_BITS: u32 = 15;
const NONE: usize = usize::MAX;

/// Greedy LZ10 encoder with hash-chain match search.
#[derive(Debug, Clone, Copy)]
pub struct Lz10 {
    max_chain: usize,
}

impl Default for Lz10 {
    fn default() -> Self {
        Self { max_chain: 256 }
    }
}

impl Lz10 {
    /// Create an encoder with the default search depth.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how many earlier positions are tried per match.
    #[must_use]
    pub fn with_max_chain(mut self, max_chain: usize) -> Self {
        self.max_chain = max_chain.max(1);
        self
    }
}

fn hash(bytes: &[u8]) -> usize {
    let key = u32::from(bytes[0]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[2]);
    (key.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
}

struct MatchFinder<'a> {
    input: &'a [u8],
    head: Vec<usize>,
    prev: Vec<usize>,
    max_chain: usize,
}

impl<'a> MatchFinder<'a> {
    fn new(input: &'a [u8], max_chain: usize) -> Self {
        Self {
            input,
            head: vec![NONE; 1 << HASH_BITS],
            prev: vec![NONE; input.len()],
            max_chain,
        }
    }

    fn insert(&mut self, pos: usize) {
        if pos + MIN_MATCH <= self.input.len() {
            let h = hash(&self.input[pos..]);
            self.prev[pos] = self.head[h];
            self.head[h] = pos;
        }
    }

    /// Longest earlier match for `pos` as (length, distance).
    fn longest(&self, pos: usize) -> (usize, usize) {
        let input = self.input;
        if pos + MIN_MATCH > input.len() {
            return (0, 0);
        }

        let limit = MAX_MATCH.min(input.len() - pos);
        let mut best = (0, 0);
        let mut candidate = self.head[hash(&input[pos..])];
        let mut chain = 0;

        while candidate != NONE && pos - candidate <= WINDOW && chain < self.max_chain {
            let len = input[candidate..]
                .iter()
                .zip(&input[pos..pos + limit])
                .take_while(|(a, b)| a == b)
                .count();
            if len > best.0 {
                best = (len, pos - candidate);
                if len == limit {
                    break;
                }
            }
            candidate = self.prev[candidate];
            chain += 1;
        }
        best
    }
}

impl Compressor for Lz10 {
    fn name(&self) -> &'static str {
        "lz10"
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        if input.len() > MAX_INPUT_LEN {
            return Err(DllistError::Compression {
                cause: format!(
                    "{} bytes exceed the {} byte limit of the size field",
                    input.len(),
                    MAX_INPUT_LEN
                ),
            });
        }

        let len = input.len();
        let mut out = Vec::with_capacity(len / 2 + 8);
        out.push(MAGIC);
        out.extend_from_slice(&(len as u32).to_le_bytes()[..3]);

        let mut finder = MatchFinder::new(input, self.max_chain);
        let mut pos = 0;
        while pos < len {
            let flag_at = out.len();
            out.push(0);

            for bit in 0..8 {
                if pos >= len {
                    break;
                }

                let (match_len, distance) = finder.longest(pos);
                if match_len >= MIN_MATCH {
                    let token = ((match_len - MIN_MATCH) << 12) | (distance - 1);
                    out[flag_at] |= 0x80 >> bit;
                    out.push((token >> 8) as u8);
                    out.push(token as u8);
                    for p in pos..pos + match_len {
                        finder.insert(p);
                    }
                    pos += match_len;
                } else {
                    out.push(input[pos]);
                    finder.insert(pos);
                    pos += 1;
                }
            }
        }

        while out.len() % 4 != 0 {
            out.push(0);
        }
        Ok(out)
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let corrupt = |cause: &str| DllistError::Decompression {
            cause: cause.to_string(),
        };

        if input.len() < 4 || input[0] != MAGIC {
            return Err(corrupt("missing LZ10 header"));
        }
        let size = usize::from(input[1]) | usize::from(input[2]) << 8 | usize::from(input[3]) << 16;

        let mut out = Vec::with_capacity(size);
        let mut bytes = input[4..].iter().copied();

        while out.len() < size {
            let flags = bytes.next().ok_or_else(|| corrupt("stream ends before flags"))?;
            for bit in 0..8 {
                if out.len() >= size {
                    break;
                }

                if flags & (0x80 >> bit) == 0 {
                    let literal = bytes.next().ok_or_else(|| corrupt("stream ends in literal"))?;
                    out.push(literal);
                    continue;
                }

                let hi = bytes.next().ok_or_else(|| corrupt("stream ends in reference"))?;
                let lo = bytes.next().ok_or_else(|| corrupt("stream ends in reference"))?;
                let match_len = usize::from(hi >> 4) + MIN_MATCH;
                let distance = (usize::from(hi & 0x0F) << 8 | usize::from(lo)) + 1;
                if distance > out.len() {
                    return Err(corrupt("reference before start of output"));
                }
                for _ in 0..match_len {
                    if out.len() >= size {
                        break;
                    }
                    out.push(out[out.len() - distance]);
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_becomes_one_reference() {
        let out = Lz10::new().compress(b"aaaaaaaaaa").unwrap();
        assert_eq!(out, vec![0x10, 10, 0, 0, 0x40, b'a', 0x60, 0x00]);
    }

    #[test]
    fn empty_input() {
        let lz = Lz10::new();
        let out = lz.compress(&[]).unwrap();
        assert_eq!(out, vec![0x10, 0, 0, 0]);
        assert!(lz.decompress(&out).unwrap().is_empty());
    }

    #[test]
    fn output_is_padded_to_four_bytes() {
        let out = Lz10::new().compress(b"abcde").unwrap();
        assert_eq!(out.len() % 4, 0);
    }

    #[test]
    fn decodes_its_own_output() {
        // Mix of repetitive structure and noise, longer than the window.
        let mut data = Vec::new();
        let mut seed = 0x1234_5678u32;
        for i in 0..20_000u32 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            if i % 7 < 4 {
                data.extend_from_slice(b"TITLE");
            } else {
                data.push((seed >> 16) as u8);
            }
        }

        let lz = Lz10::new();
        let compressed = lz.compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(lz.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn shallow_search_still_decodes() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        let lz = Lz10::new().with_max_chain(1);
        assert_eq!(lz.decompress(&lz.compress(&data).unwrap()).unwrap(), data);
    }

    #[test]
    fn rejects_bad_streams() {
        let lz = Lz10::new();
        assert!(lz.decompress(&[0x11, 1, 0, 0, 0, b'a']).is_err());
        // Reference with nothing decoded yet.
        assert!(lz.decompress(&[0x10, 3, 0, 0, 0x80, 0x00, 0x00]).is_err());
        // Declares 5 bytes, carries 1.
        assert!(lz.decompress(&[0x10, 5, 0, 0, 0x00, b'a']).is_err());
    }

    #[test]
    fn rejects_oversized_input() {
        let data = vec![0u8; MAX_INPUT_LEN + 1];
        let err = Lz10::new().compress(&data).unwrap_err();
        assert_eq!(err.code(), "E301");
    }
}
