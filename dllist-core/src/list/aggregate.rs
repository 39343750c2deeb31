//! The in-memory list for one build target.

use super::header::{HeaderMeta, ListHeader};
use super::records::{
    CompanyRecord, DemoRecord, DetailedRatingRecord, Medal, NewVideoRecord, PopularVideoRecord,
    RatingRecord, RecentRecommendationRecord, Record, TitleRecord, TitleTypeRecord, VideoRecord,
};
use super::table::{TableKind, TableSlot};
use crate::error::{DllistError, Result};
use crate::types::BuildTarget;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Vote totals for one title, keyed by game id in the working map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecommendation {
    /// Votes over the title's lifetime.
    pub votes: u32,
    /// Votes in the recent window.
    pub recent_votes: u32,
}

impl TitleRecommendation {
    /// Medal earned by the recent vote count.
    #[must_use]
    pub fn medal(&self) -> Medal {
        match self.recent_votes {
            0 => Medal::None,
            1..=99 => Medal::Bronze,
            100..=499 => Medal::Silver,
            500..=999 => Medal::Gold,
            _ => Medal::Platinum,
        }
    }
}

/// A download list under construction.
///
/// One `List` exists per build target and is owned by that build alone.
/// Tables are filled exactly once each, in [`TableKind`] order; filling a
/// table records its offset and count in the header directory. Rating images
/// are attached last and land in a separate buffer that is not part of the
/// serialized payload.
#[derive(Debug, Clone)]
pub struct List {
    pub(super) header: ListHeader,
    pub(super) ratings: Vec<RatingRecord>,
    pub(super) title_types: Vec<TitleTypeRecord>,
    pub(super) companies: Vec<CompanyRecord>,
    pub(super) titles: Vec<TitleRecord>,
    pub(super) new_titles: Vec<u32>,
    pub(super) videos: Vec<VideoRecord>,
    pub(super) new_videos: Vec<NewVideoRecord>,
    pub(super) demos: Vec<DemoRecord>,
    pub(super) recommendation_index: Vec<u32>,
    pub(super) recent_recommendations: Vec<RecentRecommendationRecord>,
    pub(super) popular_videos: Vec<PopularVideoRecord>,
    pub(super) detailed_ratings: Vec<DetailedRatingRecord>,

    target: BuildTarget,
    filled: usize,
    recommendations: HashMap<String, TitleRecommendation>,
    image_buffer: Vec<u8>,
}

impl List {
    /// Create an empty list with a header derived from `target` alone.
    #[must_use]
    pub fn new(target: BuildTarget) -> Self {
        let header = ListHeader {
            country_code: target.region.country_code(),
            language_code: target.language.code(),
            ..ListHeader::default()
        };

        Self {
            header,
            ratings: Vec::new(),
            title_types: Vec::new(),
            companies: Vec::new(),
            titles: Vec::new(),
            new_titles: Vec::new(),
            videos: Vec::new(),
            new_videos: Vec::new(),
            demos: Vec::new(),
            recommendation_index: Vec::new(),
            recent_recommendations: Vec::new(),
            popular_videos: Vec::new(),
            detailed_ratings: Vec::new(),
            target,
            filled: 0,
            recommendations: HashMap::new(),
            image_buffer: Vec::new(),
        }
    }

    /// The target this list is built for.
    #[must_use]
    pub fn target(&self) -> &BuildTarget {
        &self.target
    }

    /// The current header.
    #[must_use]
    pub fn header(&self) -> &ListHeader {
        &self.header
    }

    /// Replace header metadata. Only valid before any table is filled.
    pub fn apply_header(&mut self, meta: &HeaderMeta) -> Result<()> {
        if self.filled != 0 {
            return Err(DllistError::TableOrder {
                expected: self.next_table().map_or("rating_images", TableKind::name),
                actual: "header",
            });
        }
        self.header = ListHeader::for_target(&self.target, meta)?;
        Ok(())
    }

    /// The next table to be filled, or `None` when all are filled.
    #[must_use]
    pub fn next_table(&self) -> Option<TableKind> {
        TableKind::ALL.get(self.filled).copied()
    }

    /// Whether every table has been filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.filled == TableKind::COUNT
    }

    /// Install the vote working map used by the recommendation tables.
    pub fn set_recommendations(&mut self, recommendations: HashMap<String, TitleRecommendation>) {
        self.recommendations = recommendations;
    }

    /// The vote working map.
    #[must_use]
    pub fn recommendations(&self) -> &HashMap<String, TitleRecommendation> {
        &self.recommendations
    }

    /// Drop the vote working map once the recommendation tables exist.
    pub fn discard_recommendations(&mut self) {
        self.recommendations = HashMap::new();
    }

    /// Rating records.
    #[must_use]
    pub fn ratings(&self) -> &[RatingRecord] {
        &self.ratings
    }

    /// Title type records.
    #[must_use]
    pub fn title_types(&self) -> &[TitleTypeRecord] {
        &self.title_types
    }

    /// Company records.
    #[must_use]
    pub fn companies(&self) -> &[CompanyRecord] {
        &self.companies
    }

    /// Title records.
    #[must_use]
    pub fn titles(&self) -> &[TitleRecord] {
        &self.titles
    }

    /// New-title index (title record offsets).
    #[must_use]
    pub fn new_titles(&self) -> &[u32] {
        &self.new_titles
    }

    /// Video records.
    #[must_use]
    pub fn videos(&self) -> &[VideoRecord] {
        &self.videos
    }

    /// New video records.
    #[must_use]
    pub fn new_videos(&self) -> &[NewVideoRecord] {
        &self.new_videos
    }

    /// Demo records.
    #[must_use]
    pub fn demos(&self) -> &[DemoRecord] {
        &self.demos
    }

    /// Recommendation index (title record offsets).
    #[must_use]
    pub fn recommendation_index(&self) -> &[u32] {
        &self.recommendation_index
    }

    /// Recent recommendation records.
    #[must_use]
    pub fn recent_recommendations(&self) -> &[RecentRecommendationRecord] {
        &self.recent_recommendations
    }

    /// Popular video records.
    #[must_use]
    pub fn popular_videos(&self) -> &[PopularVideoRecord] {
        &self.popular_videos
    }

    /// Detailed rating records.
    #[must_use]
    pub fn detailed_ratings(&self) -> &[DetailedRatingRecord] {
        &self.detailed_ratings
    }

    /// Rating images attached so far.
    #[must_use]
    pub fn image_bytes(&self) -> &[u8] {
        &self.image_buffer
    }

    /// Serialized length plus attached image bytes.
    ///
    /// This is the offset the next table or image will start at.
    pub fn current_size(&self) -> Result<u32> {
        let size = self.encoded_len() + self.image_buffer.len();
        u32::try_from(size)
            .map_err(|_| DllistError::encoding("offset", format!("{} exceeds u32", size)))
    }

    /// Absolute offset of the company record at `position`.
    pub fn company_offset(&self, position: usize) -> Result<u32> {
        self.record_offset::<CompanyRecord>(TableKind::Companies, self.companies.len(), position)
    }

    /// Absolute offset of the title record at `position`.
    pub fn title_offset(&self, position: usize) -> Result<u32> {
        self.record_offset::<TitleRecord>(TableKind::Titles, self.titles.len(), position)
    }

    /// Position of the title whose game id is `game_id`.
    #[must_use]
    pub fn title_position(&self, game_id: &[u8; 4]) -> Option<usize> {
        self.titles.iter().position(|t| &t.game_id == game_id)
    }

    /// Fill the ratings table.
    pub fn fill_ratings(&mut self, rows: Vec<RatingRecord>) -> Result<()> {
        self.fill(TableKind::Ratings, rows, |list| &mut list.ratings)
    }

    /// Fill the title types table.
    pub fn fill_title_types(&mut self, rows: Vec<TitleTypeRecord>) -> Result<()> {
        self.fill(TableKind::TitleTypes, rows, |list| &mut list.title_types)
    }

    /// Fill the companies table.
    pub fn fill_companies(&mut self, rows: Vec<CompanyRecord>) -> Result<()> {
        self.fill(TableKind::Companies, rows, |list| &mut list.companies)
    }

    /// Fill the titles table.
    pub fn fill_titles(&mut self, rows: Vec<TitleRecord>) -> Result<()> {
        self.fill(TableKind::Titles, rows, |list| &mut list.titles)
    }

    /// Fill the new-title index from title positions, in display order.
    pub fn fill_new_titles(&mut self, positions: &[usize]) -> Result<()> {
        let offsets = self.title_offsets(positions)?;
        self.fill(TableKind::NewTitles, offsets, |list| &mut list.new_titles)
    }

    /// Fill the videos table.
    pub fn fill_videos(&mut self, rows: Vec<VideoRecord>) -> Result<()> {
        self.fill(TableKind::Videos, rows, |list| &mut list.videos)
    }

    /// Fill the new videos table.
    pub fn fill_new_videos(&mut self, rows: Vec<NewVideoRecord>) -> Result<()> {
        self.fill(TableKind::NewVideos, rows, |list| &mut list.new_videos)
    }

    /// Fill the demos table.
    pub fn fill_demos(&mut self, rows: Vec<DemoRecord>) -> Result<()> {
        self.fill(TableKind::Demos, rows, |list| &mut list.demos)
    }

    /// Fill the recommendation index from title positions, in display order.
    pub fn fill_recommendation_index(&mut self, positions: &[usize]) -> Result<()> {
        let offsets = self.title_offsets(positions)?;
        self.fill(TableKind::RecommendationIndex, offsets, |list| {
            &mut list.recommendation_index
        })
    }

    /// Fill the recent recommendations table.
    pub fn fill_recent_recommendations(
        &mut self,
        rows: Vec<RecentRecommendationRecord>,
    ) -> Result<()> {
        self.fill(TableKind::RecentRecommendations, rows, |list| {
            &mut list.recent_recommendations
        })
    }

    /// Fill the popular videos table.
    pub fn fill_popular_videos(&mut self, rows: Vec<PopularVideoRecord>) -> Result<()> {
        self.fill(TableKind::PopularVideos, rows, |list| &mut list.popular_videos)
    }

    /// Fill the detailed ratings table.
    pub fn fill_detailed_ratings(&mut self, rows: Vec<DetailedRatingRecord>) -> Result<()> {
        self.fill(TableKind::DetailedRatings, rows, |list| {
            &mut list.detailed_ratings
        })
    }

    /// Append a rating image and point the rating record at it.
    ///
    /// Only valid once every table is filled, so the image offset is final.
    pub fn attach_rating_image(&mut self, position: usize, jpeg: &[u8]) -> Result<()> {
        if let Some(next) = self.next_table() {
            return Err(DllistError::TableOrder {
                expected: next.name(),
                actual: "rating_images",
            });
        }
        if position >= self.ratings.len() {
            return Err(DllistError::IndexOutOfRange {
                table: TableKind::Ratings.name(),
                position,
                len: self.ratings.len(),
            });
        }

        let offset = self.current_size()?;
        let size = u32::try_from(jpeg.len())
            .map_err(|_| DllistError::encoding("jpeg_size", format!("{} bytes", jpeg.len())))?;

        let rating = &mut self.ratings[position];
        rating.jpeg_offset = offset;
        rating.jpeg_size = size;
        self.image_buffer.extend_from_slice(jpeg);
        Ok(())
    }

    fn fill<T: Record>(
        &mut self,
        kind: TableKind,
        rows: Vec<T>,
        table: impl FnOnce(&mut Self) -> &mut Vec<T>,
    ) -> Result<()> {
        match self.next_table() {
            Some(next) if next == kind => {}
            next => {
                return Err(DllistError::TableOrder {
                    expected: next.map_or("rating_images", TableKind::name),
                    actual: kind.name(),
                });
            }
        }

        let offset = self.current_size()?;
        let count = u32::try_from(rows.len()).map_err(|_| {
            DllistError::encoding(kind.name(), format!("{} records exceed u32", rows.len()))
        })?;

        *table(self) = rows;
        self.header.slots[kind.index()] = TableSlot { count, offset };
        self.filled += 1;
        Ok(())
    }

    fn record_offset<T: Record>(&self, kind: TableKind, len: usize, position: usize) -> Result<u32> {
        if kind.index() >= self.filled {
            return Err(DllistError::TableOrder {
                expected: kind.name(),
                actual: "index reference",
            });
        }
        if position >= len {
            return Err(DllistError::IndexOutOfRange {
                table: kind.name(),
                position,
                len,
            });
        }

        let base = self.header.slot(kind).offset as usize;
        u32::try_from(base + position * T::SIZE)
            .map_err(|_| DllistError::encoding(kind.name(), "record offset exceeds u32"))
    }

    fn title_offsets(&self, positions: &[usize]) -> Result<Vec<u32>> {
        positions
            .iter()
            .map(|&position| self.title_offset(position))
            .collect()
    }
}
