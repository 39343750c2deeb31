//! Regions, languages and rating groups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Console region a list is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Region {
    /// Japanese consoles.
    Japan = 0,
    /// North American consoles.
    Ntsc = 1,
    /// European and Australian consoles.
    Pal = 2,
}

impl Region {
    /// All regions in code order.
    pub const ALL: [Region; 3] = [Region::Japan, Region::Ntsc, Region::Pal];

    /// Numeric region code, also used as the output directory name.
    #[must_use]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Console country code written into the list header.
    #[must_use]
    pub fn country_code(self) -> u32 {
        match self {
            Self::Japan => 1,
            Self::Ntsc => 49,
            Self::Pal => 110,
        }
    }

    /// Rating board used by this region unless a plan overrides it.
    #[must_use]
    pub fn default_rating_group(self) -> RatingGroup {
        match self {
            Self::Japan => RatingGroup::Cero,
            Self::Ntsc => RatingGroup::Esrb,
            Self::Pal => RatingGroup::Pegi,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Japan => "japan",
            Self::Ntsc => "ntsc",
            Self::Pal => "pal",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display language of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Language {
    /// Japanese.
    Japanese = 0,
    /// English.
    English = 1,
    /// German.
    German = 2,
    /// French.
    French = 3,
    /// Spanish.
    Spanish = 4,
    /// Italian.
    Italian = 5,
    /// Dutch.
    Dutch = 6,
}

impl Language {
    /// Numeric language code, also used as the output directory name.
    #[must_use]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Japanese => "japanese",
            Self::English => "english",
            Self::German => "german",
            Self::French => "french",
            Self::Spanish => "spanish",
            Self::Italian => "italian",
            Self::Dutch => "dutch",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Age rating board whose ratings are shown in a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RatingGroup {
    /// Computer Entertainment Rating Organization (Japan).
    Cero = 1,
    /// Entertainment Software Rating Board (North America).
    Esrb = 2,
    /// Pan European Game Information.
    Pegi = 3,
}

impl RatingGroup {
    /// Value written into rating records.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// One list to build: a region, a language, and the rating board to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildTarget {
    /// Console region.
    pub region: Region,
    /// Display language.
    pub language: Language,
    /// Rating board.
    pub rating_group: RatingGroup,
}

impl BuildTarget {
    /// Create a target using the region's default rating board.
    #[must_use]
    pub fn new(region: Region, language: Language) -> Self {
        Self {
            region,
            language,
            rating_group: region.default_rating_group(),
        }
    }

    /// Override the rating board.
    #[must_use]
    pub fn with_rating_group(mut self, rating_group: RatingGroup) -> Self {
        self.rating_group = rating_group;
        self
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region={} language={}", self.region, self.language)
    }
}
