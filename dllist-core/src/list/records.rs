//! Fixed-size record encodings.
//!
//! Every record is written big-endian with no padding beyond its natural
//! width. Reserved bytes the console ignores are written as zero and are not
//! kept in the structs.

use crate::error::{DllistError, Result};
use byteorder::{BigEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// A fixed-size, big-endian binary record.
pub trait Record {
    /// Encoded size in bytes. `write_to` must write exactly this many.
    const SIZE: usize;

    /// Write the record.
    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()>;
}

/// Index table entries are bare offsets.
impl Record for u32 {
    const SIZE: usize = 4;

    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(*self)
    }
}

/// Zero-padded UTF-16BE text of exactly `N` code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextField<const N: usize>([u16; N]);

impl<const N: usize> TextField<N> {
    /// Encode `text`, failing if it needs more than `N` code units.
    pub fn encode(field: &'static str, text: &str) -> Result<Self> {
        let mut units = [0u16; N];
        let mut len = 0;
        for unit in text.encode_utf16() {
            if len == N {
                return Err(DllistError::encoding(
                    field,
                    format!(
                        "'{}' needs {} UTF-16 units, field holds {}",
                        text,
                        text.encode_utf16().count(),
                        N
                    ),
                ));
            }
            units[len] = unit;
            len += 1;
        }
        Ok(Self(units))
    }

    /// Decode up to the first zero unit.
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        let end = self.0.iter().position(|&u| u == 0).unwrap_or(N);
        String::from_utf16_lossy(&self.0[..end])
    }

    pub(crate) fn from_units(units: [u16; N]) -> Self {
        Self(units)
    }

    pub(crate) fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        for unit in self.0 {
            w.write_u16::<BigEndian>(unit)?;
        }
        Ok(())
    }
}

impl<const N: usize> Default for TextField<N> {
    fn default() -> Self {
        Self([0u16; N])
    }
}

/// Encode an ASCII identifier into a zero-padded `N`-byte array.
pub fn fixed_ascii<const N: usize>(field: &'static str, text: &str) -> Result<[u8; N]> {
    if !text.is_ascii() {
        return Err(DllistError::encoding(
            field,
            format!("'{}' is not ASCII", text),
        ));
    }
    if text.len() > N {
        return Err(DllistError::encoding(
            field,
            format!("'{}' is longer than {} bytes", text, N),
        ));
    }
    let mut bytes = [0u8; N];
    bytes[..text.len()].copy_from_slice(text.as_bytes());
    Ok(bytes)
}

/// Calendar date stored as year/month/day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListDate {
    /// Year.
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day (1-31).
    pub day: u8,
}

impl ListDate {
    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u16::<BigEndian>(self.year)?;
        w.write_u8(self.month)?;
        w.write_u8(self.day)
    }
}

/// Recommendation medal shown next to a title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Medal {
    /// No medal.
    #[default]
    None = 0,
    /// Bronze.
    Bronze = 1,
    /// Silver.
    Silver = 2,
    /// Gold.
    Gold = 3,
    /// Platinum.
    Platinum = 4,
}

/// An age rating and the location of its image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingRecord {
    /// Rating identifier within its group.
    pub rating_id: u8,
    /// Rating board code.
    pub rating_group: u8,
    /// Minimum age.
    pub age: u8,
    /// Offset of the rating image, filled when the image is attached.
    pub jpeg_offset: u32,
    /// Size of the rating image.
    pub jpeg_size: u32,
    /// Rating name.
    pub title: TextField<11>,
}

impl Record for RatingRecord {
    const SIZE: usize = 34;

    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u8(self.rating_id)?;
        w.write_u8(self.rating_group)?;
        w.write_u8(self.age)?;
        w.write_u8(0)?;
        w.write_u32::<BigEndian>(self.jpeg_offset)?;
        w.write_u32::<BigEndian>(self.jpeg_size)?;
        self.title.write_to(w)
    }
}

/// A title category (console and genre family).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleTypeRecord {
    /// Type identifier referenced by titles.
    pub type_id: u8,
    /// Console model code, e.g. `RVL`.
    pub console_model: [u8; 3],
    /// Category name.
    pub title: TextField<51>,
    /// Menu group.
    pub group_id: u8,
}

impl Record for TitleTypeRecord {
    const SIZE: usize = 108;

    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u8(self.type_id)?;
        w.write_all(&self.console_model)?;
        self.title.write_to(w)?;
        w.write_u8(self.group_id)?;
        w.write_u8(0)
    }
}

/// A developer/publisher pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyRecord {
    /// Company identifier.
    pub id: u32,
    /// Developer name.
    pub developer: TextField<31>,
    /// Publisher name.
    pub publisher: TextField<31>,
}

impl Record for CompanyRecord {
    const SIZE: usize = 128;

    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(self.id)?;
        self.developer.write_to(w)?;
        self.publisher.write_to(w)
    }
}

/// A game title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleRecord {
    /// Title identifier.
    pub id: u32,
    /// Four character game code.
    pub game_id: [u8; 4],
    /// Title type identifier.
    pub title_type: u8,
    /// Genre codes.
    pub genre: [u8; 3],
    /// Absolute offset of the company record.
    pub company_offset: u32,
    /// Release date.
    pub release: ListDate,
    /// Rating identifier.
    pub rating_id: u8,
    /// Full title.
    pub title: TextField<31>,
    /// Subtitle.
    pub subtitle: TextField<31>,
    /// Short title for compact views.
    pub short_title: TextField<31>,
}

impl Record for TitleRecord {
    const SIZE: usize = 236;

    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(self.id)?;
        w.write_all(&self.game_id)?;
        w.write_u8(self.title_type)?;
        w.write_all(&self.genre)?;
        w.write_u32::<BigEndian>(self.company_offset)?;
        self.release.write_to(w)?;
        w.write_u8(self.rating_id)?;
        w.write_all(&[0u8; 29])?;
        self.title.write_to(w)?;
        self.subtitle.write_to(w)?;
        self.short_title.write_to(w)
    }
}

/// A video entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoRecord {
    /// Video identifier.
    pub id: u32,
    /// Length in seconds.
    pub length_secs: u16,
    /// Identifier of the title the video belongs to.
    pub title_id: u32,
    /// Rating identifier.
    pub rating_id: u8,
    /// Non-zero when the video carries a "new" tag.
    pub new_tag: u8,
    /// Position of the video among its title's videos.
    pub video_index: u8,
    /// Video name.
    pub title: TextField<123>,
}

impl Record for VideoRecord {
    const SIZE: usize = 278;

    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(self.id)?;
        w.write_u16::<BigEndian>(self.length_secs)?;
        w.write_u32::<BigEndian>(self.title_id)?;
        w.write_all(&[0u8; 16])?;
        w.write_u8(self.rating_id)?;
        w.write_u8(0)?;
        w.write_u8(self.new_tag)?;
        w.write_u8(self.video_index)?;
        w.write_all(&[0u8; 2])?;
        self.title.write_to(w)
    }
}

/// A newly added video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewVideoRecord {
    /// Video identifier.
    pub id: u32,
    /// Identifier of the title the video belongs to.
    pub title_id: u32,
    /// Video name.
    pub title: TextField<102>,
}

impl Record for NewVideoRecord {
    const SIZE: usize = 232;

    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(self.id)?;
        w.write_u16::<BigEndian>(0)?;
        w.write_u32::<BigEndian>(self.title_id)?;
        w.write_all(&[0u8; 18])?;
        self.title.write_to(w)
    }
}

/// A downloadable demo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoRecord {
    /// Demo identifier.
    pub id: u32,
    /// Demo name.
    pub title: TextField<31>,
    /// Subtitle.
    pub subtitle: TextField<31>,
    /// Four character game code.
    pub game_id: [u8; 4],
    /// Absolute offset of the company record.
    pub company_offset: u32,
    /// Date the demo is withdrawn.
    pub removal: ListDate,
    /// Rating identifier.
    pub rating_id: u8,
    /// Non-zero when the demo carries a "new" tag.
    pub new_tag: u8,
    /// Position among demos tagged new.
    pub new_tag_index: u8,
}

impl Record for DemoRecord {
    const SIZE: usize = 352;

    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(self.id)?;
        self.title.write_to(w)?;
        self.subtitle.write_to(w)?;
        w.write_all(&self.game_id)?;
        w.write_u32::<BigEndian>(self.company_offset)?;
        self.removal.write_to(w)?;
        w.write_u32::<BigEndian>(0)?;
        w.write_u8(self.rating_id)?;
        w.write_u8(self.new_tag)?;
        w.write_u8(self.new_tag_index)?;
        w.write_all(&[0u8; 205])
    }
}

/// A recently recommended title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentRecommendationRecord {
    /// Absolute offset of the title record.
    pub title_offset: u32,
    /// Medal earned.
    pub medal: Medal,
}

impl Record for RecentRecommendationRecord {
    const SIZE: usize = 6;

    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(self.title_offset)?;
        w.write_u8(self.medal as u8)?;
        w.write_u8(0)
    }
}

/// A ranked popular video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopularVideoRecord {
    /// Video identifier.
    pub id: u32,
    /// Length in seconds.
    pub length_secs: u16,
    /// Identifier of the title the video belongs to.
    pub title_id: u32,
    /// Colour of the ranking bar.
    pub bar_color: u8,
    /// Rating identifier.
    pub rating_id: u8,
    /// Rank, starting at 1.
    pub video_rank: u8,
    /// Video name.
    pub title: TextField<102>,
}

impl Record for PopularVideoRecord {
    const SIZE: usize = 234;

    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<BigEndian>(self.id)?;
        w.write_u16::<BigEndian>(self.length_secs)?;
        w.write_u32::<BigEndian>(self.title_id)?;
        w.write_u8(self.bar_color)?;
        w.write_all(&[0u8; 15])?;
        w.write_u8(self.rating_id)?;
        w.write_u8(0)?;
        w.write_u8(self.video_rank)?;
        w.write_u8(0)?;
        self.title.write_to(w)
    }
}

/// A rating descriptor ("Mild Violence").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailedRatingRecord {
    /// Rating board code.
    pub rating_group: u8,
    /// Rating identifier.
    pub rating_id: u8,
    /// Descriptor text.
    pub title: TextField<102>,
}

impl Record for DetailedRatingRecord {
    const SIZE: usize = 206;

    fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        w.write_u8(self.rating_group)?;
        w.write_u8(self.rating_id)?;
        self.title.write_to(w)
    }
}
