//! Self-referential header resolution.
//!
//! The header stores the list's total length and its CRC-32, both of which
//! describe the bytes the header itself is part of. They are resolved in
//! three full serialization passes instead of patching a buffer:
//!
//! 1. **size pass**: serialize with both fields zero, record length `L`
//! 2. **checksum pass**: serialize with `filesize = L`, checksum still zero,
//!    record `C = crc32(bytes)`
//! 3. **final pass**: serialize with both fields set; this is the payload
//!
//! Writing a different value into a fixed-width field never changes the
//! length, so all three passes produce `L` bytes.

use super::aggregate::List;
use super::header::{CHECKSUM_OFFSET, HEADER_SIZE, ListHeader};
use crate::checksum;
use crate::error::{DllistError, Result};
use tracing::debug;

/// A list whose header fields have been resolved, with its final payload.
#[derive(Debug, Clone)]
pub struct FinalizedList {
    list: List,
    payload: Vec<u8>,
}

impl FinalizedList {
    /// The list the payload was produced from.
    #[must_use]
    pub fn list(&self) -> &List {
        &self.list
    }

    /// The final serialized bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Resolved `filesize`.
    #[must_use]
    pub fn filesize(&self) -> u32 {
        self.list.header.filesize
    }

    /// Resolved `checksum`.
    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.list.header.checksum
    }

    /// Take the payload, dropping the list.
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Run the three-pass protocol. Takes ownership so the list cannot change
/// after its payload is produced.
pub fn finalize(mut list: List) -> Result<FinalizedList> {
    list.header.filesize = 0;
    list.header.checksum = 0;

    let filesize = size_pass(&mut list)?;
    let checksum = checksum_pass(&mut list, filesize)?;
    let payload = final_pass(&list, filesize)?;

    debug!(
        region = %list.target().region,
        language = %list.target().language,
        filesize,
        checksum = %format!("{:#010x}", checksum),
        "resolved list header"
    );

    Ok(FinalizedList { list, payload })
}

/// Pass 1: measure the list and store its length.
pub fn size_pass(list: &mut List) -> Result<u32> {
    let bytes = list.to_bytes()?;
    let filesize = u32::try_from(bytes.len()).map_err(|_| {
        DllistError::encoding("filesize", format!("{} bytes exceed u32", bytes.len()))
    })?;
    list.header.filesize = filesize;
    Ok(filesize)
}

/// Pass 2: checksum the sized list and store the checksum.
///
/// The checksum field must still be zero; it is covered by its own CRC.
pub fn checksum_pass(list: &mut List, filesize: u32) -> Result<u32> {
    if list.header.checksum != 0 {
        return Err(DllistError::HeaderInvariant {
            cause: "checksum field must be zero during the checksum pass".to_string(),
        });
    }

    let bytes = list.to_bytes()?;
    ensure_len("checksum", &bytes, filesize)?;

    let crc = checksum::crc32(&bytes);
    list.header.checksum = crc;
    Ok(crc)
}

/// Pass 3: produce the payload that gets compressed and stored.
pub fn final_pass(list: &List, filesize: u32) -> Result<Vec<u8>> {
    let bytes = list.to_bytes()?;
    ensure_len("final", &bytes, filesize)?;
    Ok(bytes)
}

fn ensure_len(pass: &str, bytes: &[u8], filesize: u32) -> Result<()> {
    if bytes.len() as u64 != u64::from(filesize) {
        return Err(DllistError::HeaderInvariant {
            cause: format!(
                "{} pass produced {} bytes, size pass produced {}",
                pass,
                bytes.len(),
                filesize
            ),
        });
    }
    Ok(())
}

/// Summary of a payload that passed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedPayload {
    /// Stored and actual length.
    pub filesize: u32,
    /// Stored and recomputed checksum.
    pub checksum: u32,
}

/// Check a decompressed payload the way the console does.
///
/// The stored `filesize` must equal the payload length, and a CRC-32 over
/// the payload with the checksum field zeroed must equal the stored checksum.
pub fn verify_payload(payload: &[u8]) -> Result<VerifiedPayload> {
    if payload.len() < HEADER_SIZE {
        return Err(DllistError::SizeMismatch {
            expected: HEADER_SIZE as u64,
            actual: payload.len() as u64,
        });
    }

    let header = ListHeader::from_bytes(payload)?;
    if u64::from(header.filesize) != payload.len() as u64 {
        return Err(DllistError::SizeMismatch {
            expected: u64::from(header.filesize),
            actual: payload.len() as u64,
        });
    }

    let actual = checksum::crc32_with_zeroed(payload, CHECKSUM_OFFSET, 4);
    if actual != header.checksum {
        return Err(DllistError::ChecksumMismatch {
            expected: header.checksum,
            actual,
        });
    }

    Ok(VerifiedPayload {
        filesize: header.filesize,
        checksum: header.checksum,
    })
}
