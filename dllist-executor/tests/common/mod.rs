//! Common test utilities for integration tests.

#![allow(dead_code)]

use dllist_core::list::{List, ListDate, TitleRecord};
use dllist_core::types::{BuildTarget, Language, RatingGroup, Region};
use dllist_executor::scheduler::{BuildContext, PreparedContext};
use dllist_executor::source::{
    Catalog, CatalogCompany, CatalogDemo, CatalogDetailedRating, CatalogRating, CatalogTitle,
    CatalogTitleType, CatalogVideo, ListSource, Localized, SourceFuture,
};
use dllist_executor::storage::{ListStorage, MemoryStorage};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn rating(id: u8, group: RatingGroup, age: u8, name: &str) -> CatalogRating {
    CatalogRating {
        id,
        group,
        age,
        name: Localized::from(name),
        image: None,
    }
}

fn title(id: u32, game_id: &str, name: Localized) -> CatalogTitle {
    CatalogTitle {
        id,
        game_id: game_id.to_string(),
        title_type: 1,
        company_id: 1 + id % 2,
        rating_id: 1,
        name,
        ..CatalogTitle::default()
    }
}

/// A catalog with something in every table for every region.
pub fn sample_catalog() -> Catalog {
    let mut kart = title(
        1,
        "RMCE",
        Localized::from("Kart Racing")
            .with(Language::Japanese, "カートレース")
            .with(Language::German, "Kartrennen"),
    );
    kart.is_new = true;
    kart.release = ListDate {
        year: 2008,
        month: 4,
        day: 10,
    };
    kart.votes = 1200;
    kart.recent_votes = 1100;

    let mut party = title(2, "RMPE", Localized::from("Party Games"));
    party.regions = vec![Region::Ntsc, Region::Pal];
    party.votes = 300;
    party.recent_votes = 150;

    let mut puzzle = title(3, "RPZJ", Localized::from("Puzzle"));
    puzzle.regions = vec![Region::Japan];
    puzzle.is_new = true;
    puzzle.release = ListDate {
        year: 2009,
        month: 1,
        day: 5,
    };
    puzzle.votes = 80;
    puzzle.recent_votes = 20;

    Catalog {
        list_id: 42,
        thumbnail_id: 7,
        last_update: "2026/10/17 09:00".to_string(),
        download_url_ids: vec!["0a1b2c3d".to_string()],
        ratings: vec![
            rating(1, RatingGroup::Cero, 0, "A"),
            rating(1, RatingGroup::Esrb, 6, "E"),
            rating(2, RatingGroup::Esrb, 13, "T"),
            rating(1, RatingGroup::Pegi, 3, "3"),
            rating(2, RatingGroup::Pegi, 12, "12"),
        ],
        title_types: vec![CatalogTitleType {
            id: 1,
            console_model: "RVL".to_string(),
            group_id: 1,
            name: Localized::from("Disc").with(Language::French, "Disque"),
        }],
        companies: vec![
            CatalogCompany {
                id: 1,
                developer: "Studio One".to_string(),
                publisher: "Publisher One".to_string(),
            },
            CatalogCompany {
                id: 2,
                developer: "Studio Two".to_string(),
                publisher: "Publisher Two".to_string(),
            },
        ],
        titles: vec![kart, party, puzzle],
        videos: vec![
            CatalogVideo {
                id: 10,
                title_id: 1,
                length_secs: 95,
                name: Localized::from("Launch trailer"),
                views: 900,
                ..CatalogVideo::default()
            },
            CatalogVideo {
                id: 11,
                title_id: 2,
                length_secs: 60,
                name: Localized::from("Minigames"),
                views: 1500,
                is_new: true,
                ..CatalogVideo::default()
            },
            CatalogVideo {
                id: 12,
                title_id: 3,
                length_secs: 30,
                name: Localized::from("Tutorial"),
                views: 40,
                ..CatalogVideo::default()
            },
        ],
        demos: vec![CatalogDemo {
            id: 100,
            game_id: "RMCE".to_string(),
            company_id: 1,
            removal: ListDate {
                year: 2027,
                month: 1,
                day: 1,
            },
            name: Localized::from("Kart Racing Demo"),
            is_new: true,
            ..CatalogDemo::default()
        }],
        detailed_ratings: vec![
            CatalogDetailedRating {
                group: RatingGroup::Esrb,
                id: 1,
                text: Localized::from("Comic Mischief"),
            },
            CatalogDetailedRating {
                group: RatingGroup::Pegi,
                id: 1,
                text: Localized::from("Violence").with(Language::Dutch, "Geweld"),
            },
        ],
    }
}

/// Prepare a context over `source` that stores into memory.
pub async fn memory_context(source: Arc<dyn ListSource>) -> (PreparedContext, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let context = BuildContext::new(source, Arc::clone(&storage) as Arc<dyn ListStorage>)
        .prepare()
        .await
        .unwrap();
    (context, storage)
}

/// A source that holds each build in its titles stage for a while and
/// records how many builds were there at once.
pub struct TrackingSource {
    pub current: AtomicUsize,
    pub max_observed: AtomicUsize,
    hold: Duration,
}

impl TrackingSource {
    pub fn new(hold_ms: u64) -> Self {
        Self {
            current: AtomicUsize::new(0),
            max_observed: AtomicUsize::new(0),
            hold: Duration::from_millis(hold_ms),
        }
    }

    pub fn max_observed(&self) -> usize {
        self.max_observed.load(Ordering::SeqCst)
    }
}

impl ListSource for TrackingSource {
    fn titles<'a>(&'a self, list: &'a List) -> SourceFuture<'a, Vec<TitleRecord>> {
        Box::pin(async move {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_observed.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.hold).await;

            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![TitleRecord {
                id: list.target().language.code(),
                ..TitleRecord::default()
            }])
        })
    }
}

/// How a [`FaultySource`] misbehaves for its chosen target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The titles stage returns an error.
    Error,
    /// The titles stage panics.
    Panic,
}

/// A source that fails the titles stage for one target and records which
/// targets reached that stage.
pub struct FaultySource {
    fail_for: BuildTarget,
    fault: Fault,
    pub started: Mutex<Vec<BuildTarget>>,
}

impl FaultySource {
    pub fn new(fail_for: BuildTarget, fault: Fault) -> Self {
        Self {
            fail_for,
            fault,
            started: Mutex::new(Vec::new()),
        }
    }

    pub fn started(&self) -> Vec<BuildTarget> {
        self.started.lock().clone()
    }
}

impl ListSource for FaultySource {
    fn titles<'a>(&'a self, list: &'a List) -> SourceFuture<'a, Vec<TitleRecord>> {
        Box::pin(async move {
            let target = *list.target();
            self.started.lock().push(target);
            tokio::time::sleep(Duration::from_millis(5)).await;

            if target == self.fail_for {
                match self.fault {
                    Fault::Error => {
                        return Err(dllist_core::DllistError::Connection {
                            cause: "lost connection to title database".to_string(),
                        });
                    }
                    Fault::Panic => panic!("title row decoder crashed"),
                }
            }
            Ok(Vec::new())
        })
    }
}
