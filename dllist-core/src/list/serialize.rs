//! Canonical list serialization.
//!
//! Header first, then every table in [`TableKind`](super::TableKind) order,
//! records in insertion order, big-endian, no padding. The output depends
//! only on the list's contents, so serializing an unmodified list twice
//! yields identical bytes.

use super::aggregate::List;
use super::header::HEADER_SIZE;
use super::records::Record;
use crate::error::Result;
use std::io::Write;

fn write_table<T: Record, W: Write + ?Sized>(w: &mut W, rows: &[T]) -> std::io::Result<()> {
    for row in rows {
        row.write_to(w)?;
    }
    Ok(())
}

fn table_len<T: Record>(rows: &[T]) -> usize {
    rows.len() * T::SIZE
}

impl List {
    /// Write the header and all tables.
    pub fn write_all<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.header.write_to(w)?;
        write_table(w, &self.ratings)?;
        write_table(w, &self.title_types)?;
        write_table(w, &self.companies)?;
        write_table(w, &self.titles)?;
        write_table(w, &self.new_titles)?;
        write_table(w, &self.videos)?;
        write_table(w, &self.new_videos)?;
        write_table(w, &self.demos)?;
        write_table(w, &self.recommendation_index)?;
        write_table(w, &self.recent_recommendations)?;
        write_table(w, &self.popular_videos)?;
        write_table(w, &self.detailed_ratings)?;
        Ok(())
    }

    /// Serialize into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.write_all(&mut buf)?;
        Ok(buf)
    }

    /// Serialized length, computed without writing.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE
            + table_len(&self.ratings)
            + table_len(&self.title_types)
            + table_len(&self.companies)
            + table_len(&self.titles)
            + table_len(&self.new_titles)
            + table_len(&self.videos)
            + table_len(&self.new_videos)
            + table_len(&self.demos)
            + table_len(&self.recommendation_index)
            + table_len(&self.recent_recommendations)
            + table_len(&self.popular_videos)
            + table_len(&self.detailed_ratings)
    }
}

#[cfg(test)]
mod tests {
    use crate::list::header::{HEADER_SIZE, HeaderMeta};
    use crate::list::records::{
        CompanyRecord, DemoRecord, RatingRecord, Record, TextField, TitleRecord,
    };
    use crate::list::{List, TableKind};
    use crate::types::{BuildTarget, Language, Region};

    fn populated() -> List {
        let mut list = List::new(BuildTarget::new(Region::Pal, Language::Italian));
        list.apply_header(&HeaderMeta {
            list_id: 1,
            thumbnail_id: 1,
            last_update: "today".to_string(),
            download_url_ids: Vec::new(),
        })
        .unwrap();
        list.fill_ratings(vec![RatingRecord {
            rating_id: 4,
            rating_group: 3,
            age: 12,
            ..RatingRecord::default()
        }])
        .unwrap();
        list.fill_title_types(Vec::new()).unwrap();
        list.fill_companies(vec![CompanyRecord {
            id: 10,
            developer: TextField::encode("developer", "Dev").unwrap(),
            publisher: TextField::encode("publisher", "Pub").unwrap(),
        }])
        .unwrap();
        let company_offset = list.company_offset(0).unwrap();
        list.fill_titles(vec![
            TitleRecord {
                id: 1,
                game_id: *b"RMCP",
                company_offset,
                ..TitleRecord::default()
            },
            TitleRecord {
                id: 2,
                game_id: *b"RSBP",
                company_offset,
                ..TitleRecord::default()
            },
        ])
        .unwrap();
        list.fill_new_titles(&[1]).unwrap();
        list.fill_videos(Vec::new()).unwrap();
        list.fill_new_videos(Vec::new()).unwrap();
        list.fill_demos(vec![DemoRecord::default()]).unwrap();
        list.fill_recommendation_index(&[0, 1]).unwrap();
        list.fill_recent_recommendations(Vec::new()).unwrap();
        list.fill_popular_videos(Vec::new()).unwrap();
        list.fill_detailed_ratings(Vec::new()).unwrap();
        list
    }

    #[test]
    fn serialization_is_deterministic() {
        let list = populated();
        assert_eq!(list.to_bytes().unwrap(), list.to_bytes().unwrap());
    }

    #[test]
    fn encoded_len_matches_output() {
        let list = populated();
        assert_eq!(list.to_bytes().unwrap().len(), list.encoded_len());
    }

    #[test]
    fn tables_start_where_the_directory_says() {
        let list = populated();
        let bytes = list.to_bytes().unwrap();

        let titles = list.header().slot(TableKind::Titles);
        let second = titles.offset as usize + TitleRecord::SIZE;
        assert_eq!(&bytes[second + 4..second + 8], b"RSBP");

        let new_titles = list.header().slot(TableKind::NewTitles);
        let start = new_titles.offset as usize;
        let pointer = u32::from_be_bytes(bytes[start..start + 4].try_into().unwrap());
        assert_eq!(pointer as usize, second);

        let demos = list.header().slot(TableKind::Demos);
        assert_eq!(demos.count, 1);
        assert_eq!(
            demos.offset as usize + DemoRecord::SIZE + 2 * 4,
            list.header().slot(TableKind::RecentRecommendations).offset as usize
        );
    }

    #[test]
    fn records_follow_header_in_canonical_order() {
        let list = populated();
        let bytes = list.to_bytes().unwrap();

        // First record after the header is the rating.
        assert_eq!(&bytes[HEADER_SIZE..HEADER_SIZE + 3], &[4, 3, 12]);

        let mut last = 0;
        for kind in TableKind::ALL {
            let offset = list.header().slot(kind).offset;
            assert!(offset >= last, "{} starts before its predecessor", kind);
            last = offset;
        }
    }
}
