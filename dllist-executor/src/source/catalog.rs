//! JSON catalog source.
//!
//! A [`Catalog`] is a single JSON document describing every title, video,
//! demo and rating for all regions. [`CatalogSource`] loads it once in
//! `prepare` and derives each target's tables from it:
//!
//! - titles and demos are filtered by region (an empty region list means all)
//! - ratings and detailed ratings are filtered by the target's rating board
//! - videos follow their title into the list
//! - new titles are ordered newest release first
//! - the recommendation index is ordered by total votes, most first
//! - recent recommendations are ordered by recent votes and carry a medal
//! - popular videos are ordered by views and ranked from 1
//!
//! Video indexes, new-demo indexes and popular ranks are single bytes; a
//! catalog that needs a larger value fails the table with an encoding error.

use super::{ListSource, SourceFuture};
use dllist_core::error::{DllistError, Result};
use dllist_core::list::{
    CompanyRecord, DemoRecord, DetailedRatingRecord, HeaderMeta, List, ListDate, NewVideoRecord,
    PopularVideoRecord, RatingRecord, RecentRecommendationRecord, TextField, TitleRecommendation,
    TitleRecord, TitleTypeRecord, VideoRecord, fixed_ascii,
};
use dllist_core::types::{BuildTarget, Language, RatingGroup, Region};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::info;

/// Display text keyed by language.
///
/// Missing languages fall back to English, then to any available text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Localized(pub BTreeMap<Language, String>);

impl Localized {
    /// Text for `language`.
    #[must_use]
    pub fn resolve(&self, language: Language) -> &str {
        self.0
            .get(&language)
            .or_else(|| self.0.get(&Language::English))
            .or_else(|| self.0.values().next())
            .map_or("", String::as_str)
    }

    /// Add or replace the text for `language`.
    #[must_use]
    pub fn with(mut self, language: Language, text: impl Into<String>) -> Self {
        self.0.insert(language, text.into());
        self
    }
}

impl From<&str> for Localized {
    fn from(text: &str) -> Self {
        Self::default().with(Language::English, text)
    }
}

/// An age rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRating {
    /// Rating identifier within its board.
    pub id: u8,
    /// Rating board.
    pub group: RatingGroup,
    /// Minimum age.
    #[serde(default)]
    pub age: u8,
    /// Rating name.
    pub name: Localized,
    /// JPEG file, relative to the catalog.
    #[serde(default)]
    pub image: Option<PathBuf>,
}

/// A title category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTitleType {
    /// Type identifier.
    pub id: u8,
    /// Console model code.
    pub console_model: String,
    /// Menu group.
    #[serde(default)]
    pub group_id: u8,
    /// Category name.
    pub name: Localized,
}

/// A developer/publisher pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCompany {
    /// Company identifier.
    pub id: u32,
    /// Developer name.
    pub developer: String,
    /// Publisher name.
    pub publisher: String,
}

/// A game title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTitle {
    /// Title identifier.
    pub id: u32,
    /// Four character game code.
    pub game_id: String,
    /// Title type identifier.
    #[serde(default)]
    pub title_type: u8,
    /// Genre codes.
    #[serde(default)]
    pub genre: [u8; 3],
    /// Company identifier.
    pub company_id: u32,
    /// Release date.
    #[serde(default)]
    pub release: ListDate,
    /// Rating identifier.
    #[serde(default)]
    pub rating_id: u8,
    /// Regions the title is sold in; empty means all.
    #[serde(default)]
    pub regions: Vec<Region>,
    /// Full title.
    pub name: Localized,
    /// Subtitle.
    #[serde(default)]
    pub subtitle: Localized,
    /// Short title.
    #[serde(default)]
    pub short_name: Localized,
    /// Listed among new titles.
    #[serde(default)]
    pub is_new: bool,
    /// Lifetime recommendation votes.
    #[serde(default)]
    pub votes: u32,
    /// Recommendation votes in the recent window.
    #[serde(default)]
    pub recent_votes: u32,
}

/// A video attached to a title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogVideo {
    /// Video identifier.
    pub id: u32,
    /// Identifier of the owning title.
    pub title_id: u32,
    /// Length in seconds.
    #[serde(default)]
    pub length_secs: u16,
    /// Rating identifier.
    #[serde(default)]
    pub rating_id: u8,
    /// Video name.
    pub name: Localized,
    /// Listed among new videos.
    #[serde(default)]
    pub is_new: bool,
    /// View count used for the popular ranking.
    #[serde(default)]
    pub views: u32,
    /// Ranking bar colour.
    #[serde(default)]
    pub bar_color: u8,
}

/// A downloadable demo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDemo {
    /// Demo identifier.
    pub id: u32,
    /// Four character game code.
    pub game_id: String,
    /// Company identifier.
    pub company_id: u32,
    /// Date the demo is withdrawn.
    #[serde(default)]
    pub removal: ListDate,
    /// Rating identifier.
    #[serde(default)]
    pub rating_id: u8,
    /// Regions the demo is offered in; empty means all.
    #[serde(default)]
    pub regions: Vec<Region>,
    /// Demo name.
    pub name: Localized,
    /// Subtitle.
    #[serde(default)]
    pub subtitle: Localized,
    /// Carries a "new" tag.
    #[serde(default)]
    pub is_new: bool,
}

/// A rating descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDetailedRating {
    /// Rating board.
    pub group: RatingGroup,
    /// Rating identifier.
    pub id: u8,
    /// Descriptor text.
    pub text: Localized,
}

/// Everything the lists are built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// List identifier written to every header.
    pub list_id: u32,
    /// Thumbnail set identifier.
    pub thumbnail_id: u32,
    /// Last update text.
    pub last_update: String,
    /// Download URL ids.
    pub download_url_ids: Vec<String>,
    /// Ratings of all boards.
    pub ratings: Vec<CatalogRating>,
    /// Title categories.
    pub title_types: Vec<CatalogTitleType>,
    /// Companies.
    pub companies: Vec<CatalogCompany>,
    /// Titles of all regions.
    pub titles: Vec<CatalogTitle>,
    /// Videos.
    pub videos: Vec<CatalogVideo>,
    /// Demos of all regions.
    pub demos: Vec<CatalogDemo>,
    /// Rating descriptors of all boards.
    pub detailed_ratings: Vec<CatalogDetailedRating>,
}

#[derive(Debug)]
struct LoadedCatalog {
    catalog: Catalog,
    images: HashMap<(RatingGroup, u8), Vec<u8>>,
}

/// [`ListSource`] backed by a JSON [`Catalog`].
#[derive(Debug)]
pub struct CatalogSource {
    path: Option<PathBuf>,
    loaded: OnceCell<LoadedCatalog>,
}

fn available_in(regions: &[Region], region: Region) -> bool {
    regions.is_empty() || regions.contains(&region)
}

/// Narrow a per-list counter to its one-byte record field.
fn counter(field: &'static str, value: usize) -> Result<u8> {
    u8::try_from(value)
        .map_err(|_| DllistError::encoding(field, format!("{} exceeds {}", value, u8::MAX)))
}

fn company_position(list: &List, company_id: u32) -> Result<usize> {
    list.companies()
        .iter()
        .position(|c| c.id == company_id)
        .ok_or_else(|| DllistError::ConfigValue {
            field: "company_id".to_string(),
            cause: format!("unknown company {}", company_id),
        })
}

async fn load(path: &Path) -> Result<LoadedCatalog> {
    let parse_error = |path: &Path, cause: String| DllistError::ConfigParse {
        path: path.to_path_buf(),
        cause,
    };

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| parse_error(path, e.to_string()))?;
    let catalog: Catalog =
        serde_json::from_str(&text).map_err(|e| parse_error(path, e.to_string()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut images = HashMap::new();
    for rating in &catalog.ratings {
        if let Some(image) = &rating.image {
            let image_path = base.join(image);
            let bytes = tokio::fs::read(&image_path)
                .await
                .map_err(|e| parse_error(&image_path, e.to_string()))?;
            images.insert((rating.group, rating.id), bytes);
        }
    }

    info!(
        path = %path.display(),
        titles = catalog.titles.len(),
        videos = catalog.videos.len(),
        demos = catalog.demos.len(),
        images = images.len(),
        "Loaded catalog"
    );
    Ok(LoadedCatalog { catalog, images })
}

impl CatalogSource {
    /// Source that reads `path` during `prepare`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            loaded: OnceCell::new(),
        }
    }

    /// Source over an already loaded catalog without rating images.
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self::from_parts(catalog, HashMap::new())
    }

    /// Source over an already loaded catalog and its rating images, keyed by
    /// (board, rating id).
    pub fn from_parts(catalog: Catalog, images: HashMap<(RatingGroup, u8), Vec<u8>>) -> Self {
        Self {
            path: None,
            loaded: OnceCell::from(LoadedCatalog { catalog, images }),
        }
    }

    fn loaded(&self) -> Result<&LoadedCatalog> {
        self.loaded.get().ok_or_else(|| DllistError::Connection {
            cause: "catalog used before prepare".to_string(),
        })
    }

    fn catalog(&self) -> Result<&Catalog> {
        Ok(&self.loaded()?.catalog)
    }

    fn titles_by_id(&self) -> Result<HashMap<u32, &CatalogTitle>> {
        Ok(self.catalog()?.titles.iter().map(|t| (t.id, t)).collect())
    }

    fn build_ratings(&self, list: &List) -> Result<Vec<RatingRecord>> {
        let target = list.target();
        self.catalog()?
            .ratings
            .iter()
            .filter(|r| r.group == target.rating_group)
            .map(|r| {
                Ok(RatingRecord {
                    rating_id: r.id,
                    rating_group: r.group.code(),
                    age: r.age,
                    title: TextField::encode("rating.name", r.name.resolve(target.language))?,
                    ..RatingRecord::default()
                })
            })
            .collect()
    }

    fn build_title_types(&self, list: &List) -> Result<Vec<TitleTypeRecord>> {
        let language = list.target().language;
        self.catalog()?
            .title_types
            .iter()
            .map(|t| {
                Ok(TitleTypeRecord {
                    type_id: t.id,
                    console_model: fixed_ascii("console_model", &t.console_model)?,
                    title: TextField::encode("title_type.name", t.name.resolve(language))?,
                    group_id: t.group_id,
                })
            })
            .collect()
    }

    fn build_companies(&self) -> Result<Vec<CompanyRecord>> {
        self.catalog()?
            .companies
            .iter()
            .map(|c| {
                Ok(CompanyRecord {
                    id: c.id,
                    developer: TextField::encode("developer", &c.developer)?,
                    publisher: TextField::encode("publisher", &c.publisher)?,
                })
            })
            .collect()
    }

    fn build_titles(&self, list: &List) -> Result<Vec<TitleRecord>> {
        let target = list.target();
        let language = target.language;
        self.catalog()?
            .titles
            .iter()
            .filter(|t| available_in(&t.regions, target.region))
            .map(|t| {
                let company = company_position(list, t.company_id)?;
                Ok(TitleRecord {
                    id: t.id,
                    game_id: fixed_ascii("game_id", &t.game_id)?,
                    title_type: t.title_type,
                    genre: t.genre,
                    company_offset: list.company_offset(company)?,
                    release: t.release,
                    rating_id: t.rating_id,
                    title: TextField::encode("title.name", t.name.resolve(language))?,
                    subtitle: TextField::encode("title.subtitle", t.subtitle.resolve(language))?,
                    short_title: TextField::encode(
                        "title.short_name",
                        t.short_name.resolve(language),
                    )?,
                })
            })
            .collect()
    }

    fn build_new_titles(&self, list: &List) -> Result<Vec<usize>> {
        let by_id = self.titles_by_id()?;
        let mut positions: Vec<(usize, ListDate)> = list
            .titles()
            .iter()
            .enumerate()
            .filter_map(|(position, record)| {
                by_id
                    .get(&record.id)
                    .filter(|t| t.is_new)
                    .map(|t| (position, t.release))
            })
            .collect();
        positions.sort_by_key(|&(_, release)| Reverse(release));
        Ok(positions.into_iter().map(|(position, _)| position).collect())
    }

    /// Catalog videos whose title made it into `list`, in catalog order.
    fn listed_videos<'a>(&'a self, list: &List) -> Result<Vec<&'a CatalogVideo>> {
        Ok(self
            .catalog()?
            .videos
            .iter()
            .filter(|v| list.titles().iter().any(|t| t.id == v.title_id))
            .collect())
    }

    fn build_videos(&self, list: &List) -> Result<Vec<VideoRecord>> {
        let language = list.target().language;
        let mut per_title: HashMap<u32, usize> = HashMap::new();
        self.listed_videos(list)?
            .into_iter()
            .map(|v| {
                let index = per_title.entry(v.title_id).or_insert(0);
                let video_index = counter("video_index", *index)?;
                *index += 1;
                Ok(VideoRecord {
                    id: v.id,
                    length_secs: v.length_secs,
                    title_id: v.title_id,
                    rating_id: v.rating_id,
                    new_tag: u8::from(v.is_new),
                    video_index,
                    title: TextField::encode("video.name", v.name.resolve(language))?,
                })
            })
            .collect()
    }

    fn build_new_videos(&self, list: &List) -> Result<Vec<NewVideoRecord>> {
        let language = list.target().language;
        self.listed_videos(list)?
            .into_iter()
            .filter(|v| v.is_new)
            .map(|v| {
                Ok(NewVideoRecord {
                    id: v.id,
                    title_id: v.title_id,
                    title: TextField::encode("video.name", v.name.resolve(language))?,
                })
            })
            .collect()
    }

    fn build_demos(&self, list: &List) -> Result<Vec<DemoRecord>> {
        let target = list.target();
        let language = target.language;
        let mut new_count = 0usize;
        self.catalog()?
            .demos
            .iter()
            .filter(|d| available_in(&d.regions, target.region))
            .map(|d| {
                let company = company_position(list, d.company_id)?;
                let new_tag_index = if d.is_new {
                    new_count += 1;
                    counter("new_tag_index", new_count - 1)?
                } else {
                    0
                };
                Ok(DemoRecord {
                    id: d.id,
                    title: TextField::encode("demo.name", d.name.resolve(language))?,
                    subtitle: TextField::encode("demo.subtitle", d.subtitle.resolve(language))?,
                    game_id: fixed_ascii("game_id", &d.game_id)?,
                    company_offset: list.company_offset(company)?,
                    removal: d.removal,
                    rating_id: d.rating_id,
                    new_tag: u8::from(d.is_new),
                    new_tag_index,
                })
            })
            .collect()
    }

    fn build_recommendations(
        &self,
        target: &BuildTarget,
    ) -> Result<HashMap<String, TitleRecommendation>> {
        Ok(self
            .catalog()?
            .titles
            .iter()
            .filter(|t| available_in(&t.regions, target.region))
            .filter(|t| t.votes > 0 || t.recent_votes > 0)
            .map(|t| {
                (
                    t.game_id.clone(),
                    TitleRecommendation {
                        votes: t.votes,
                        recent_votes: t.recent_votes,
                    },
                )
            })
            .collect())
    }
}

/// Titles of `list` with their vote totals from the working map.
fn voted_titles(list: &List) -> Vec<(usize, &TitleRecommendation)> {
    list.titles()
        .iter()
        .enumerate()
        .filter_map(|(position, record)| {
            let game_id = std::str::from_utf8(&record.game_id).ok()?;
            list.recommendations()
                .get(game_id.trim_end_matches('\0'))
                .map(|votes| (position, votes))
        })
        .collect()
}

fn build_recommendation_index(list: &List) -> Vec<usize> {
    let mut voted: Vec<_> = voted_titles(list)
        .into_iter()
        .filter(|(_, votes)| votes.votes > 0)
        .collect();
    voted.sort_by_key(|(_, votes)| Reverse(votes.votes));
    voted.into_iter().map(|(position, _)| position).collect()
}

fn build_recent_recommendations(list: &List) -> Result<Vec<RecentRecommendationRecord>> {
    let mut voted: Vec<_> = voted_titles(list)
        .into_iter()
        .filter(|(_, votes)| votes.recent_votes > 0)
        .collect();
    voted.sort_by_key(|(_, votes)| Reverse(votes.recent_votes));
    voted
        .into_iter()
        .map(|(position, votes)| {
            Ok(RecentRecommendationRecord {
                title_offset: list.title_offset(position)?,
                medal: votes.medal(),
            })
        })
        .collect()
}

impl ListSource for CatalogSource {
    fn prepare(&self) -> SourceFuture<'_, ()> {
        Box::pin(async move {
            if self.loaded.initialized() {
                return Ok(());
            }
            let path = self.path.as_deref().ok_or_else(|| DllistError::Connection {
                cause: "catalog source has no path".to_string(),
            })?;
            self.loaded.get_or_try_init(|| load(path)).await?;
            Ok(())
        })
    }

    fn recommendations<'a>(
        &'a self,
        target: &'a BuildTarget,
    ) -> SourceFuture<'a, HashMap<String, TitleRecommendation>> {
        Box::pin(async move { self.build_recommendations(target) })
    }

    fn header_meta<'a>(&'a self, _target: &'a BuildTarget) -> SourceFuture<'a, HeaderMeta> {
        Box::pin(async move {
            let catalog = self.catalog()?;
            Ok(HeaderMeta {
                list_id: catalog.list_id,
                thumbnail_id: catalog.thumbnail_id,
                last_update: catalog.last_update.clone(),
                download_url_ids: catalog.download_url_ids.clone(),
            })
        })
    }

    fn ratings<'a>(&'a self, list: &'a List) -> SourceFuture<'a, Vec<RatingRecord>> {
        Box::pin(async move { self.build_ratings(list) })
    }

    fn title_types<'a>(&'a self, list: &'a List) -> SourceFuture<'a, Vec<TitleTypeRecord>> {
        Box::pin(async move { self.build_title_types(list) })
    }

    fn companies<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<CompanyRecord>> {
        Box::pin(async move { self.build_companies() })
    }

    fn titles<'a>(&'a self, list: &'a List) -> SourceFuture<'a, Vec<TitleRecord>> {
        Box::pin(async move { self.build_titles(list) })
    }

    fn new_titles<'a>(&'a self, list: &'a List) -> SourceFuture<'a, Vec<usize>> {
        Box::pin(async move { self.build_new_titles(list) })
    }

    fn videos<'a>(&'a self, list: &'a List) -> SourceFuture<'a, Vec<VideoRecord>> {
        Box::pin(async move { self.build_videos(list) })
    }

    fn new_videos<'a>(&'a self, list: &'a List) -> SourceFuture<'a, Vec<NewVideoRecord>> {
        Box::pin(async move { self.build_new_videos(list) })
    }

    fn demos<'a>(&'a self, list: &'a List) -> SourceFuture<'a, Vec<DemoRecord>> {
        Box::pin(async move { self.build_demos(list) })
    }

    fn recommendation_index<'a>(&'a self, list: &'a List) -> SourceFuture<'a, Vec<usize>> {
        Box::pin(async move { Ok(build_recommendation_index(list)) })
    }

    fn recent_recommendations<'a>(
        &'a self,
        list: &'a List,
    ) -> SourceFuture<'a, Vec<RecentRecommendationRecord>> {
        Box::pin(async move { build_recent_recommendations(list) })
    }

    fn popular_videos<'a>(&'a self, list: &'a List) -> SourceFuture<'a, Vec<PopularVideoRecord>> {
        Box::pin(async move {
            let language = list.target().language;
            let mut videos = self.listed_videos(list)?;
            videos.sort_by_key(|v| Reverse(v.views));
            videos
                .into_iter()
                .zip(1usize..)
                .map(|(v, rank)| {
                    let video_rank = counter("video_rank", rank)?;
                    Ok(PopularVideoRecord {
                        id: v.id,
                        length_secs: v.length_secs,
                        title_id: v.title_id,
                        bar_color: v.bar_color,
                        rating_id: v.rating_id,
                        video_rank,
                        title: TextField::encode("video.name", v.name.resolve(language))?,
                    })
                })
                .collect()
        })
    }

    fn detailed_ratings<'a>(
        &'a self,
        list: &'a List,
    ) -> SourceFuture<'a, Vec<DetailedRatingRecord>> {
        Box::pin(async move {
            let target = list.target();
            self.catalog()?
                .detailed_ratings
                .iter()
                .filter(|d| d.group == target.rating_group)
                .map(|d| {
                    Ok(DetailedRatingRecord {
                        rating_group: d.group.code(),
                        rating_id: d.id,
                        title: TextField::encode("detailed_rating", d.text.resolve(target.language))?,
                    })
                })
                .collect()
        })
    }

    fn rating_images<'a>(&'a self, list: &'a List) -> SourceFuture<'a, Vec<(usize, Vec<u8>)>> {
        Box::pin(async move {
            let images = &self.loaded()?.images;
            let group = list.target().rating_group;
            Ok(list
                .ratings()
                .iter()
                .enumerate()
                .filter_map(|(position, rating)| {
                    images
                        .get(&(group, rating.rating_id))
                        .map(|jpeg| (position, jpeg.clone()))
                })
                .collect())
        })
    }
}
