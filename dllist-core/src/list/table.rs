//! Table identities and their header directory slots.

use std::fmt;

/// The twelve tables of a list, in canonical write order.
///
/// The discriminant is the table's position in the file; the legacy reader
/// parses tables in exactly this sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TableKind {
    /// Age ratings.
    Ratings = 0,
    /// Title categories.
    TitleTypes = 1,
    /// Developers and publishers.
    Companies = 2,
    /// Game titles.
    Titles = 3,
    /// Offsets of newly released titles.
    NewTitles = 4,
    /// Videos.
    Videos = 5,
    /// Newly added videos.
    NewVideos = 6,
    /// Downloadable demos.
    Demos = 7,
    /// Offsets of recommended titles.
    RecommendationIndex = 8,
    /// Recently recommended titles with medals.
    RecentRecommendations = 9,
    /// Popular videos.
    PopularVideos = 10,
    /// Detailed rating descriptors.
    DetailedRatings = 11,
}

impl TableKind {
    /// Number of tables.
    pub const COUNT: usize = 12;

    /// All tables in canonical order.
    pub const ALL: [TableKind; Self::COUNT] = [
        TableKind::Ratings,
        TableKind::TitleTypes,
        TableKind::Companies,
        TableKind::Titles,
        TableKind::NewTitles,
        TableKind::Videos,
        TableKind::NewVideos,
        TableKind::Demos,
        TableKind::RecommendationIndex,
        TableKind::RecentRecommendations,
        TableKind::PopularVideos,
        TableKind::DetailedRatings,
    ];

    /// Position in canonical order.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable table name used in errors and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ratings => "ratings",
            Self::TitleTypes => "title_types",
            Self::Companies => "companies",
            Self::Titles => "titles",
            Self::NewTitles => "new_titles",
            Self::Videos => "videos",
            Self::NewVideos => "new_videos",
            Self::Demos => "demos",
            Self::RecommendationIndex => "recommendation_index",
            Self::RecentRecommendations => "recent_recommendations",
            Self::PopularVideos => "popular_videos",
            Self::DetailedRatings => "detailed_ratings",
        }
    }

    /// Reserved u32 words the header carries after this table's slot.
    pub(crate) fn reserved_words_after(self) -> usize {
        match self {
            Self::Demos => 2,
            Self::RecommendationIndex => 4,
            Self::RecentRecommendations => 2,
            _ => 0,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Header directory entry: where a table starts and how many records it has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSlot {
    /// Number of records.
    pub count: u32,
    /// Absolute byte offset of the first record.
    pub offset: u32,
}
