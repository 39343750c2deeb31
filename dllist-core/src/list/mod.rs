//! The list aggregate and its binary encoding.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Header (1514 bytes: metadata, filesize, checksum,        │
//! │         table directory of (count, offset) pairs)        │
//! ├──────────────────────────────────────────────────────────┤
//! │ ratings                 [RatingRecord; n]                │
//! │ title types             [TitleTypeRecord; n]             │
//! │ companies               [CompanyRecord; n]               │
//! │ titles                  [TitleRecord; n]                 │
//! │ new titles              [u32 title offset; n]            │
//! │ videos                  [VideoRecord; n]                 │
//! │ new videos              [NewVideoRecord; n]              │
//! │ demos                   [DemoRecord; n]                  │
//! │ recommendation index    [u32 title offset; n]            │
//! │ recent recommendations  [RecentRecommendationRecord; n]  │
//! │ popular videos          [PopularVideoRecord; n]          │
//! │ detailed ratings        [DetailedRatingRecord; n]        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are big-endian. Rating images are not part of this payload:
//! they are collected in a separate buffer ([`List::image_bytes`]) whose
//! offsets continue from the end of the payload, and are stored beside the
//! compressed list.

mod aggregate;
mod header;
mod protocol;
mod records;
mod serialize;
mod table;

pub use aggregate::{List, TitleRecommendation};
pub use header::{
    CHECKSUM_OFFSET, DOWNLOAD_URL_LEN, DOWNLOAD_URL_SLOTS, FILESIZE_OFFSET, HEADER_SIZE,
    HeaderMeta, LIST_VARIANT, LIST_VERSION, ListHeader,
};
pub use protocol::{
    FinalizedList, VerifiedPayload, checksum_pass, final_pass, finalize, size_pass,
    verify_payload,
};
pub use records::{
    CompanyRecord, DemoRecord, DetailedRatingRecord, ListDate, Medal, NewVideoRecord,
    PopularVideoRecord, RatingRecord, RecentRecommendationRecord, Record, TextField,
    TitleRecord, TitleTypeRecord, VideoRecord, fixed_ascii,
};
pub use table::{TableKind, TableSlot};
