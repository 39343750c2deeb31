//! Payload compression.
//!
//! The list payload is stored compressed. The builder treats the compressor
//! as a black box behind [`Compressor`]; [`Lz10`] is the container the
//! console's reader decompresses.

mod lz10;

pub use lz10::{Lz10, MAX_INPUT_LEN};

use crate::error::Result;

/// A lossless, exactly reversible byte transform.
pub trait Compressor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Compress `input`.
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Reverse [`Compressor::compress`].
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>>;
}
