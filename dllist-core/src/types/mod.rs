//! Core types for download list builds.
//!
//! - `BuildId`: Unique identifier for a single build (log correlation only)
//! - `Region`, `Language`, `RatingGroup`: the enumerated build dimensions
//! - `BuildTarget`: one (region, language, rating group) combination

mod ids;
mod region;

pub use ids::BuildId;
pub use region::{BuildTarget, Language, RatingGroup, Region};
