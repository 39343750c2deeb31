//! Data source seam.
//!
//! A [`ListSource`] supplies the rows of every table. The builder calls it
//! once per table, in canonical order, handing in the list built so far so
//! later tables can reference earlier records by position or offset.
//!
//! Every table method defaults to an empty table, so a source only
//! implements what it actually provides.

mod catalog;

pub use catalog::{
    Catalog, CatalogCompany, CatalogDemo, CatalogDetailedRating, CatalogRating, CatalogSource,
    CatalogTitle, CatalogTitleType, CatalogVideo, Localized,
};

use dllist_core::error::Result;
use dllist_core::list::{
    CompanyRecord, DemoRecord, DetailedRatingRecord, HeaderMeta, List, NewVideoRecord,
    PopularVideoRecord, RatingRecord, RecentRecommendationRecord, TitleRecommendation,
    TitleRecord, TitleTypeRecord, VideoRecord,
};
use dllist_core::types::BuildTarget;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Future returned by source methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

fn ready<'a, T: Send + 'a>(value: T) -> SourceFuture<'a, T> {
    Box::pin(async move { Ok(value) })
}

/// Provider of list contents for every build target.
///
/// Implementations are shared by all concurrent builds and must not keep
/// per-build state.
pub trait ListSource: Send + Sync {
    /// One-time preparation before any build starts.
    fn prepare(&self) -> SourceFuture<'_, ()> {
        ready(())
    }

    /// Vote totals keyed by game id, installed before any table is built.
    fn recommendations<'a>(
        &'a self,
        _target: &'a BuildTarget,
    ) -> SourceFuture<'a, HashMap<String, TitleRecommendation>> {
        ready(HashMap::new())
    }

    /// Header metadata for `target`.
    fn header_meta<'a>(&'a self, _target: &'a BuildTarget) -> SourceFuture<'a, HeaderMeta> {
        ready(HeaderMeta::default())
    }

    /// Rating records.
    fn ratings<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<RatingRecord>> {
        ready(Vec::new())
    }

    /// Title type records.
    fn title_types<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<TitleTypeRecord>> {
        ready(Vec::new())
    }

    /// Company records.
    fn companies<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<CompanyRecord>> {
        ready(Vec::new())
    }

    /// Title records.
    fn titles<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<TitleRecord>> {
        ready(Vec::new())
    }

    /// Positions in the title table to list as new, in display order.
    fn new_titles<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<usize>> {
        ready(Vec::new())
    }

    /// Video records.
    fn videos<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<VideoRecord>> {
        ready(Vec::new())
    }

    /// New video records.
    fn new_videos<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<NewVideoRecord>> {
        ready(Vec::new())
    }

    /// Demo records.
    fn demos<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<DemoRecord>> {
        ready(Vec::new())
    }

    /// Positions in the title table to recommend, in display order.
    fn recommendation_index<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<usize>> {
        ready(Vec::new())
    }

    /// Recent recommendation records.
    fn recent_recommendations<'a>(
        &'a self,
        _list: &'a List,
    ) -> SourceFuture<'a, Vec<RecentRecommendationRecord>> {
        ready(Vec::new())
    }

    /// Popular video records.
    fn popular_videos<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<PopularVideoRecord>> {
        ready(Vec::new())
    }

    /// Detailed rating records.
    fn detailed_ratings<'a>(
        &'a self,
        _list: &'a List,
    ) -> SourceFuture<'a, Vec<DetailedRatingRecord>> {
        ready(Vec::new())
    }

    /// Rating images as (rating position, JPEG bytes).
    fn rating_images<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<(usize, Vec<u8>)>> {
        ready(Vec::new())
    }
}
