//! dllist Core Library
//!
//! This crate provides the list aggregate, its binary encoding and the
//! self-referential header protocol for the download list (`dllist.bin`)
//! served to the console's channel.
//!
//! # Key Components
//!
//! - **List**: per-target aggregate of fixed-size record tables
//! - **Protocol**: three-pass resolution of `filesize` and `checksum`
//! - **Compress**: LZ10 container the console decompresses
//! - **Plan**: which (region, language) pairs get a list
//!
//! # Example
//!
//! ```ignore
//! use dllist_core::prelude::*;
//!
//! let mut list = List::new(BuildTarget::new(Region::Pal, Language::German));
//! list.fill_ratings(ratings)?;
//! // ... remaining tables in order ...
//! let finalized = finalize(list)?;
//! let compressed = Lz10::new().compress(finalized.payload())?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checksum;
pub mod compress;
pub mod error;
pub mod list;
pub mod plan;
pub mod prelude;
pub mod types;

// Re-export key types at crate root for convenience
pub use compress::{Compressor, Lz10};
pub use error::{DllistError, Result};
pub use list::{FinalizedList, HeaderMeta, List, TableKind, finalize, verify_payload};
pub use plan::BuildPlan;
pub use types::{BuildId, BuildTarget, Language, RatingGroup, Region};
