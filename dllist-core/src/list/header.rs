//! List header structure.

use super::records::{TextField, fixed_ascii};
use super::table::{TableKind, TableSlot};
use crate::error::{DllistError, Result};
use crate::types::BuildTarget;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// List format version understood by the console.
pub const LIST_VERSION: u8 = 6;

/// Format variant byte that follows the version.
pub const LIST_VARIANT: u8 = 2;

/// Fixed size of the list header in bytes.
pub const HEADER_SIZE: usize = 1514;

/// Byte offset of the `filesize` field.
pub const FILESIZE_OFFSET: usize = 4;

/// Byte offset of the `checksum` field.
pub const CHECKSUM_OFFSET: usize = 8;

/// Number of download URL id slots.
pub const DOWNLOAD_URL_SLOTS: usize = 5;

/// Width of one download URL id slot.
pub const DOWNLOAD_URL_LEN: usize = 256;

/// Header values supplied by the data source rather than derived from tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMeta {
    /// List identifier.
    pub list_id: u32,
    /// Thumbnail set identifier.
    pub thumbnail_id: u32,
    /// Text shown as the last update time.
    pub last_update: String,
    /// Download URL ids, at most five.
    pub download_url_ids: Vec<String>,
}

/// List file header.
///
/// Stored at the beginning of every list. Besides region metadata it holds
/// the table directory and the two self-referential fields, `filesize` and
/// `checksum`, which are only known once the whole list is serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListHeader {
    /// Format version.
    pub version: u8,
    /// Format variant.
    pub variant: u8,
    /// Total serialized length of the list.
    pub filesize: u32,
    /// CRC-32 of the serialized list with this field zeroed.
    pub checksum: u32,
    /// List identifier.
    pub list_id: u32,
    /// Thumbnail set identifier.
    pub thumbnail_id: u32,
    /// Console country code.
    pub country_code: u32,
    /// Language code.
    pub language_code: u32,
    /// Table directory, indexed by [`TableKind::index`].
    pub slots: [TableSlot; TableKind::COUNT],
    /// Last update text.
    pub last_update: TextField<31>,
    /// Download URL ids.
    pub download_url_ids: [[u8; DOWNLOAD_URL_LEN]; DOWNLOAD_URL_SLOTS],
}

impl Default for ListHeader {
    fn default() -> Self {
        Self {
            version: LIST_VERSION,
            variant: LIST_VARIANT,
            filesize: 0,
            checksum: 0,
            list_id: 0,
            thumbnail_id: 0,
            country_code: 0,
            language_code: 0,
            slots: [TableSlot::default(); TableKind::COUNT],
            last_update: TextField::default(),
            download_url_ids: [[0u8; DOWNLOAD_URL_LEN]; DOWNLOAD_URL_SLOTS],
        }
    }
}

impl ListHeader {
    /// Create a header for `target` from source-supplied metadata.
    pub fn for_target(target: &BuildTarget, meta: &HeaderMeta) -> Result<Self> {
        if meta.download_url_ids.len() > DOWNLOAD_URL_SLOTS {
            return Err(DllistError::encoding(
                "download_url_ids",
                format!(
                    "{} ids given, header holds {}",
                    meta.download_url_ids.len(),
                    DOWNLOAD_URL_SLOTS
                ),
            ));
        }

        let mut download_url_ids = [[0u8; DOWNLOAD_URL_LEN]; DOWNLOAD_URL_SLOTS];
        for (slot, id) in download_url_ids.iter_mut().zip(&meta.download_url_ids) {
            *slot = fixed_ascii::<DOWNLOAD_URL_LEN>("download_url_ids", id)?;
        }

        Ok(Self {
            list_id: meta.list_id,
            thumbnail_id: meta.thumbnail_id,
            country_code: target.region.country_code(),
            language_code: target.language.code(),
            last_update: TextField::encode("last_update", &meta.last_update)?,
            download_url_ids,
            ..Self::default()
        })
    }

    /// Directory slot for `kind`.
    #[must_use]
    pub fn slot(&self, kind: TableKind) -> TableSlot {
        self.slots[kind.index()]
    }

    /// Write the header. Always writes exactly [`HEADER_SIZE`] bytes.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u16::<BigEndian>(0)?;
        w.write_u8(self.version)?;
        w.write_u8(self.variant)?;
        w.write_u32::<BigEndian>(self.filesize)?;
        w.write_u32::<BigEndian>(self.checksum)?;
        w.write_u32::<BigEndian>(self.list_id)?;
        w.write_u32::<BigEndian>(self.thumbnail_id)?;
        w.write_u32::<BigEndian>(self.country_code)?;
        w.write_u32::<BigEndian>(self.language_code)?;
        w.write_all(&[0u8; 9])?;

        for kind in TableKind::ALL {
            let slot = self.slot(kind);
            w.write_u32::<BigEndian>(slot.count)?;
            w.write_u32::<BigEndian>(slot.offset)?;
            for _ in 0..kind.reserved_words_after() {
                w.write_u32::<BigEndian>(0)?;
            }
        }

        self.last_update.write_to(w)?;
        w.write_all(&[0u8; 3])?;
        for id in &self.download_url_ids {
            w.write_all(id)?;
        }
        w.write_all(&[0u8; 4])
    }

    /// Write header to a byte buffer.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        self.write_to(&mut buf)?;
        debug_assert_eq!(buf.len(), HEADER_SIZE);
        Ok(buf)
    }

    /// Read header from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Buffer too small for header",
            ));
        }

        let mut cursor = io::Cursor::new(bytes);

        let _reserved = cursor.read_u16::<BigEndian>()?;
        let version = cursor.read_u8()?;
        let variant = cursor.read_u8()?;
        let filesize = cursor.read_u32::<BigEndian>()?;
        let checksum = cursor.read_u32::<BigEndian>()?;
        let list_id = cursor.read_u32::<BigEndian>()?;
        let thumbnail_id = cursor.read_u32::<BigEndian>()?;
        let country_code = cursor.read_u32::<BigEndian>()?;
        let language_code = cursor.read_u32::<BigEndian>()?;
        let mut skip = [0u8; 9];
        cursor.read_exact(&mut skip)?;

        let mut slots = [TableSlot::default(); TableKind::COUNT];
        for kind in TableKind::ALL {
            let count = cursor.read_u32::<BigEndian>()?;
            let offset = cursor.read_u32::<BigEndian>()?;
            slots[kind.index()] = TableSlot { count, offset };
            for _ in 0..kind.reserved_words_after() {
                cursor.read_u32::<BigEndian>()?;
            }
        }

        let mut units = [0u16; 31];
        cursor.read_u16_into::<BigEndian>(&mut units)?;
        cursor.read_exact(&mut skip[..3])?;

        let mut download_url_ids = [[0u8; DOWNLOAD_URL_LEN]; DOWNLOAD_URL_SLOTS];
        for id in &mut download_url_ids {
            cursor.read_exact(id)?;
        }

        Ok(Self {
            version,
            variant,
            filesize,
            checksum,
            list_id,
            thumbnail_id,
            country_code,
            language_code,
            slots,
            last_update: TextField::from_units(units),
            download_url_ids,
        })
    }
}
