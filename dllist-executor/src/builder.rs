//! Per-target list construction.
//!
//! [`ListBuilder`] owns one [`List`] for the duration of a build and asks the
//! [`ListSource`] for each table in canonical order. A source failure stops
//! the build and is reported with the table and target it happened in.

use crate::source::ListSource;
use dllist_core::error::{DllistError, Result};
use dllist_core::list::{List, TableKind};
use dllist_core::types::BuildTarget;
use tracing::debug;

fn source_error(table: &'static str, target: &BuildTarget) -> impl FnOnce(DllistError) -> DllistError {
    let target = target.to_string();
    move |err| match err {
        DllistError::Source { .. } => err,
        other => DllistError::Source {
            table,
            target,
            cause: other.to_string(),
        },
    }
}

fn filled(list: &List, kind: TableKind) {
    let slot = list.header().slot(kind);
    debug!(
        table = kind.name(),
        rows = slot.count,
        offset = slot.offset,
        "Filled table"
    );
}

/// Drives a [`ListSource`] through every table of one list.
pub struct ListBuilder<'a> {
    source: &'a dyn ListSource,
}

impl<'a> ListBuilder<'a> {
    /// Create a builder over `source`.
    pub fn new(source: &'a dyn ListSource) -> Self {
        Self { source }
    }

    /// Build the complete list for `target`.
    ///
    /// The returned list has every table filled and its rating images
    /// attached; its header still has `filesize` and `checksum` unset.
    pub async fn build(&self, target: BuildTarget) -> Result<List> {
        let source = self.source;
        let mut list = List::new(target);

        let recommendations = source
            .recommendations(&target)
            .await
            .map_err(source_error("recommendations", &target))?;
        list.set_recommendations(recommendations);

        let meta = source
            .header_meta(&target)
            .await
            .map_err(source_error("header", &target))?;
        list.apply_header(&meta)?;

        let rows = source
            .ratings(&list)
            .await
            .map_err(source_error(TableKind::Ratings.name(), &target))?;
        list.fill_ratings(rows)?;
        filled(&list, TableKind::Ratings);

        let rows = source
            .title_types(&list)
            .await
            .map_err(source_error(TableKind::TitleTypes.name(), &target))?;
        list.fill_title_types(rows)?;
        filled(&list, TableKind::TitleTypes);

        let rows = source
            .companies(&list)
            .await
            .map_err(source_error(TableKind::Companies.name(), &target))?;
        list.fill_companies(rows)?;
        filled(&list, TableKind::Companies);

        let rows = source
            .titles(&list)
            .await
            .map_err(source_error(TableKind::Titles.name(), &target))?;
        list.fill_titles(rows)?;
        filled(&list, TableKind::Titles);

        let positions = source
            .new_titles(&list)
            .await
            .map_err(source_error(TableKind::NewTitles.name(), &target))?;
        list.fill_new_titles(&positions)?;
        filled(&list, TableKind::NewTitles);

        let rows = source
            .videos(&list)
            .await
            .map_err(source_error(TableKind::Videos.name(), &target))?;
        list.fill_videos(rows)?;
        filled(&list, TableKind::Videos);

        let rows = source
            .new_videos(&list)
            .await
            .map_err(source_error(TableKind::NewVideos.name(), &target))?;
        list.fill_new_videos(rows)?;
        filled(&list, TableKind::NewVideos);

        let rows = source
            .demos(&list)
            .await
            .map_err(source_error(TableKind::Demos.name(), &target))?;
        list.fill_demos(rows)?;
        filled(&list, TableKind::Demos);

        let positions = source
            .recommendation_index(&list)
            .await
            .map_err(source_error(TableKind::RecommendationIndex.name(), &target))?;
        list.fill_recommendation_index(&positions)?;
        filled(&list, TableKind::RecommendationIndex);

        let rows = source
            .recent_recommendations(&list)
            .await
            .map_err(source_error(TableKind::RecentRecommendations.name(), &target))?;
        list.fill_recent_recommendations(rows)?;
        filled(&list, TableKind::RecentRecommendations);

        // Votes are only needed by the two recommendation tables.
        list.discard_recommendations();

        let rows = source
            .popular_videos(&list)
            .await
            .map_err(source_error(TableKind::PopularVideos.name(), &target))?;
        list.fill_popular_videos(rows)?;
        filled(&list, TableKind::PopularVideos);

        let rows = source
            .detailed_ratings(&list)
            .await
            .map_err(source_error(TableKind::DetailedRatings.name(), &target))?;
        list.fill_detailed_ratings(rows)?;
        filled(&list, TableKind::DetailedRatings);

        let images = source
            .rating_images(&list)
            .await
            .map_err(source_error("rating_images", &target))?;
        for (position, jpeg) in &images {
            list.attach_rating_image(*position, jpeg)?;
        }
        debug!(
            images = images.len(),
            image_bytes = list.image_bytes().len(),
            "Attached rating images"
        );

        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceFuture;
    use dllist_core::list::{RatingRecord, TitleRecommendation, TitleRecord};
    use dllist_core::types::{Language, Region};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Records the order in which stages are requested.
    #[derive(Default)]
    struct StageLog {
        stages: Mutex<Vec<&'static str>>,
        saw_votes_after_discard: Mutex<bool>,
    }

    impl StageLog {
        fn push<'a, T: Send + 'a>(&'a self, stage: &'static str, value: T) -> SourceFuture<'a, T> {
            self.stages.lock().push(stage);
            Box::pin(async move { Ok(value) })
        }
    }

    impl ListSource for StageLog {
        fn recommendations<'a>(
            &'a self,
            _target: &'a BuildTarget,
        ) -> SourceFuture<'a, HashMap<String, TitleRecommendation>> {
            let mut votes = HashMap::new();
            votes.insert("RAAE".to_string(), TitleRecommendation::default());
            self.push("recommendations", votes)
        }

        fn header_meta<'a>(
            &'a self,
            _target: &'a BuildTarget,
        ) -> SourceFuture<'a, dllist_core::list::HeaderMeta> {
            self.push("header", Default::default())
        }

        fn ratings<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<RatingRecord>> {
            self.push("ratings", vec![RatingRecord::default()])
        }

        fn titles<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<TitleRecord>> {
            self.push("titles", vec![TitleRecord::default()])
        }

        fn new_titles<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<usize>> {
            self.push("new_titles", vec![0])
        }

        fn recent_recommendations<'a>(
            &'a self,
            list: &'a List,
        ) -> SourceFuture<'a, Vec<dllist_core::list::RecentRecommendationRecord>> {
            assert_eq!(list.recommendations().len(), 1);
            self.push("recent_recommendations", Vec::new())
        }

        fn popular_videos<'a>(
            &'a self,
            list: &'a List,
        ) -> SourceFuture<'a, Vec<dllist_core::list::PopularVideoRecord>> {
            *self.saw_votes_after_discard.lock() = !list.recommendations().is_empty();
            self.push("popular_videos", Vec::new())
        }

        fn rating_images<'a>(&'a self, _list: &'a List) -> SourceFuture<'a, Vec<(usize, Vec<u8>)>> {
            self.push("rating_images", vec![(0, vec![1, 2, 3])])
        }
    }

    struct BrokenDemos;

    impl ListSource for BrokenDemos {
        fn demos<'a>(
            &'a self,
            _list: &'a List,
        ) -> SourceFuture<'a, Vec<dllist_core::list::DemoRecord>> {
            Box::pin(async {
                Err(DllistError::Connection {
                    cause: "connection reset".to_string(),
                })
            })
        }
    }

    fn target() -> BuildTarget {
        BuildTarget::new(Region::Ntsc, Language::French)
    }

    #[tokio::test]
    async fn stages_run_in_canonical_order() {
        let source = StageLog::default();
        let list = ListBuilder::new(&source).build(target()).await.unwrap();

        assert!(list.is_complete());
        assert_eq!(
            *source.stages.lock(),
            vec![
                "recommendations",
                "header",
                "ratings",
                "titles",
                "new_titles",
                "recent_recommendations",
                "popular_videos",
                "rating_images",
            ]
        );
    }

    #[tokio::test]
    async fn votes_discarded_after_recent_recommendations() {
        let source = StageLog::default();
        let list = ListBuilder::new(&source).build(target()).await.unwrap();
        assert!(!*source.saw_votes_after_discard.lock());
        assert!(list.recommendations().is_empty());
    }

    #[tokio::test]
    async fn images_attached_after_tables() {
        let source = StageLog::default();
        let list = ListBuilder::new(&source).build(target()).await.unwrap();
        assert_eq!(list.image_bytes(), &[1, 2, 3]);
        assert_eq!(list.ratings()[0].jpeg_offset as usize, list.encoded_len());
    }

    #[tokio::test]
    async fn source_failure_names_table_and_target() {
        let err = ListBuilder::new(&BrokenDemos)
            .build(target())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "E101");
        let message = err.to_string();
        assert!(message.contains("demos"), "{}", message);
        assert!(message.contains("region=ntsc language=french"), "{}", message);
        assert!(message.contains("connection reset"), "{}", message);
    }
}
