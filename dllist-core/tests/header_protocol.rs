//! Integration tests for list serialization and header resolution.
//!
//! These tests drive the public API the way a build does: fill every table
//! in order, finalize, compress, then verify what the console would see.

use dllist_core::list::{
    CHECKSUM_OFFSET, FILESIZE_OFFSET, HEADER_SIZE, ListHeader, RatingRecord, Record, TitleRecord,
    checksum_pass, final_pass, size_pass,
};
use dllist_core::prelude::*;

/// Bitwise CRC-32/IEEE, kept separate from the crate's implementation.
fn reference_crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

fn fill_rest_empty(list: &mut List) {
    list.fill_videos(Vec::new()).unwrap();
    list.fill_new_videos(Vec::new()).unwrap();
    list.fill_demos(Vec::new()).unwrap();
    list.fill_recommendation_index(&[]).unwrap();
    list.fill_recent_recommendations(Vec::new()).unwrap();
    list.fill_popular_videos(Vec::new()).unwrap();
    list.fill_detailed_ratings(Vec::new()).unwrap();
}

/// One rating, one title, every other table empty.
fn rating_and_title() -> List {
    let mut list = List::new(BuildTarget::new(Region::Japan, Language::Japanese));
    list.fill_ratings(vec![RatingRecord::default()]).unwrap();
    list.fill_title_types(Vec::new()).unwrap();
    list.fill_companies(Vec::new()).unwrap();
    list.fill_titles(vec![TitleRecord::default()]).unwrap();
    list.fill_new_titles(&[]).unwrap();
    fill_rest_empty(&mut list);
    list
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

#[test]
fn test_header_plus_rating_plus_title() {
    let expected = HEADER_SIZE + RatingRecord::SIZE + TitleRecord::SIZE;

    let mut list = rating_and_title();
    assert_eq!(list.to_bytes().unwrap().len(), expected);

    let filesize = size_pass(&mut list).unwrap();
    assert_eq!(filesize as usize, expected);
    assert_eq!(list.header().filesize as usize, expected);

    let checksum = checksum_pass(&mut list, filesize).unwrap();
    let mut zeroed = final_pass(&list, filesize).unwrap();
    zeroed[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].fill(0);
    assert_eq!(checksum, reference_crc32(&zeroed));
}

#[test]
fn test_payload_carries_resolved_fields() {
    let finalized = finalize(rating_and_title()).unwrap();
    let payload = finalized.payload();

    assert_eq!(read_u32(payload, FILESIZE_OFFSET) as usize, payload.len());
    assert_eq!(read_u32(payload, CHECKSUM_OFFSET), finalized.checksum());

    let mut zeroed = payload.to_vec();
    zeroed[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].fill(0);
    assert_eq!(reference_crc32(&zeroed), finalized.checksum());
}

#[test]
fn test_finalize_is_deterministic() {
    let a = finalize(rating_and_title()).unwrap();
    let b = finalize(rating_and_title()).unwrap();
    assert_eq!(a.payload(), b.payload());
    assert_eq!(a.checksum(), b.checksum());
}

#[test]
fn test_empty_list_is_header_only() {
    let mut list = List::new(BuildTarget::new(Region::Ntsc, Language::Spanish));
    list.fill_ratings(Vec::new()).unwrap();
    list.fill_title_types(Vec::new()).unwrap();
    list.fill_companies(Vec::new()).unwrap();
    list.fill_titles(Vec::new()).unwrap();
    list.fill_new_titles(&[]).unwrap();
    fill_rest_empty(&mut list);

    let finalized = finalize(list).unwrap();
    assert_eq!(finalized.filesize() as usize, HEADER_SIZE);
    verify_payload(finalized.payload()).unwrap();
}

#[test]
fn test_index_tables_point_at_titles() {
    let mut list = List::new(BuildTarget::new(Region::Pal, Language::Dutch));
    list.fill_ratings(Vec::new()).unwrap();
    list.fill_title_types(Vec::new()).unwrap();
    list.fill_companies(Vec::new()).unwrap();
    let titles = (0..3u32)
        .map(|id| TitleRecord {
            id,
            ..TitleRecord::default()
        })
        .collect();
    list.fill_titles(titles).unwrap();
    list.fill_new_titles(&[2, 0]).unwrap();
    list.fill_videos(Vec::new()).unwrap();
    list.fill_new_videos(Vec::new()).unwrap();
    list.fill_demos(Vec::new()).unwrap();
    list.fill_recommendation_index(&[1]).unwrap();
    list.fill_recent_recommendations(Vec::new()).unwrap();
    list.fill_popular_videos(Vec::new()).unwrap();
    list.fill_detailed_ratings(Vec::new()).unwrap();

    let payload = finalize(list).unwrap().into_payload();
    let header = ListHeader::from_bytes(&payload).unwrap();

    let new_titles = header.slot(TableKind::NewTitles);
    assert_eq!(new_titles.count, 2);
    let first = read_u32(&payload, new_titles.offset as usize) as usize;
    let second = read_u32(&payload, new_titles.offset as usize + 4) as usize;
    // Title ids are the first field of each title record, in display order.
    assert_eq!(read_u32(&payload, first), 2);
    assert_eq!(read_u32(&payload, second), 0);

    let recommended = header.slot(TableKind::RecommendationIndex);
    let target = read_u32(&payload, recommended.offset as usize) as usize;
    assert_eq!(read_u32(&payload, target), 1);
}

#[test]
fn test_compressed_payload_verifies_after_decompression() {
    let payload = finalize(rating_and_title()).unwrap().into_payload();
    let lz = Lz10::new();
    let restored = lz.decompress(&lz.compress(&payload).unwrap()).unwrap();
    assert_eq!(restored, payload);

    let verified = verify_payload(&restored).unwrap();
    assert_eq!(verified.filesize as usize, payload.len());
}

#[test]
fn test_out_of_order_fill_rejected() {
    let mut list = List::new(BuildTarget::new(Region::Japan, Language::Japanese));
    let err = list.fill_titles(Vec::new()).unwrap_err();
    assert!(matches!(err, DllistError::TableOrder { .. }));

    list.fill_ratings(Vec::new()).unwrap();
    let err = list.fill_ratings(Vec::new()).unwrap_err();
    assert_eq!(err.code(), "E102");
}

#[test]
fn test_index_position_outside_titles_rejected() {
    let mut list = List::new(BuildTarget::new(Region::Japan, Language::Japanese));
    list.fill_ratings(Vec::new()).unwrap();
    list.fill_title_types(Vec::new()).unwrap();
    list.fill_companies(Vec::new()).unwrap();
    list.fill_titles(vec![TitleRecord::default()]).unwrap();

    let err = list.fill_new_titles(&[1]).unwrap_err();
    assert!(matches!(
        err,
        DllistError::IndexOutOfRange {
            position: 1,
            len: 1,
            ..
        }
    ));
}

#[test]
fn test_rating_images_stay_out_of_payload() {
    let mut list = rating_and_title();
    let before = list.encoded_len();
    list.attach_rating_image(0, &[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

    let rating = &list.ratings()[0];
    assert_eq!(rating.jpeg_offset as usize, before);
    assert_eq!(rating.jpeg_size, 4);
    assert_eq!(list.current_size().unwrap() as usize, before + 4);

    let finalized = finalize(list).unwrap();
    assert_eq!(finalized.filesize() as usize, before);
}
