//! Prelude for convenient imports.
//!
//! ```ignore
//! use dllist_core::prelude::*;
//! ```

// Core types
pub use crate::types::{BuildId, BuildTarget, Language, RatingGroup, Region};

// Error handling
pub use crate::error::{DllistError, Result};

// Aggregate and records
pub use crate::list::{
    CompanyRecord, DemoRecord, DetailedRatingRecord, HeaderMeta, List, ListDate, Medal,
    NewVideoRecord, PopularVideoRecord, RatingRecord, RecentRecommendationRecord, TableKind,
    TextField, TitleRecommendation, TitleRecord, TitleTypeRecord, VideoRecord,
};

// Header protocol
pub use crate::list::{FinalizedList, VerifiedPayload, finalize, verify_payload};

// Compression and planning
pub use crate::compress::{Compressor, Lz10};
pub use crate::plan::{BuildPlan, RegionPlan};
