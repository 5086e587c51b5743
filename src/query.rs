//! Pure helpers shared by both store implementations: the chronological
//! ordering, the free-text search predicate, and the year/month grouping
//! used by the archive view. No state, no side effects.

use crate::models::MemeRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Sorts records descending by (year, month, created_at). The sort is
/// stable, so records tied on all three keys keep their input order.
pub fn sort_chronological(records: &mut [MemeRecord]) {
    records.sort_by(|a, b| {
        b.year
            .cmp(&a.year)
            .then(b.month.cmp(&a.month))
            .then(b.created_at.cmp(&a.created_at))
    });
}

/// Returns true when `query_lower` is a substring of the title,
/// description, or any tag, ignoring case. The caller lowercases the
/// query once; fields are lowercased here per comparison.
pub fn matches(record: &MemeRecord, query_lower: &str) -> bool {
    record.title.to_lowercase().contains(query_lower)
        || record.description.to_lowercase().contains(query_lower)
        || record
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(query_lower))
}

/// All records sharing one (year, month) bucket, in input order.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MonthGroup {
    pub month: u32,
    pub memes: Vec<MemeRecord>,
}

/// One year of the archive, months descending.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct YearGroup {
    pub year: i32,
    pub months: Vec<MonthGroup>,
}

/// Groups a flat record sequence into year -> month -> records, years and
/// months descending. Each record's relative order within its bucket is
/// preserved from the input.
pub fn group_by_bucket(records: &[MemeRecord]) -> Vec<YearGroup> {
    let mut buckets: BTreeMap<i32, BTreeMap<u32, Vec<MemeRecord>>> = BTreeMap::new();
    for record in records {
        buckets
            .entry(record.year)
            .or_default()
            .entry(record.month)
            .or_default()
            .push(record.clone());
    }

    buckets
        .into_iter()
        .rev()
        .map(|(year, months)| YearGroup {
            year,
            months: months
                .into_iter()
                .rev()
                .map(|(month, memes)| MonthGroup { month, memes })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateMeme;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn record(title: &str, year: i32, month: u32, created_secs: i64) -> MemeRecord {
        let now = Utc.timestamp_opt(created_secs, 0).unwrap();
        CreateMeme {
            title: title.to_string(),
            year: Some(year),
            month: Some(month),
            ..Default::default()
        }
        .into_record(Uuid::new_v4(), now)
    }

    #[test]
    fn sort_puts_most_recent_bucket_first() {
        let mut records = vec![
            record("old", 2020, 1, 100),
            record("new", 2021, 5, 100),
            record("mid", 2020, 12, 100),
        ];
        sort_chronological(&mut records);
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }

    #[test]
    fn sort_breaks_bucket_ties_by_created_at() {
        let mut records = vec![
            record("earlier", 2020, 6, 100),
            record("later", 2020, 6, 200),
        ];
        sort_chronological(&mut records);
        assert_eq!(records[0].title, "later");
        assert_eq!(records[1].title, "earlier");
    }

    #[test]
    fn matches_is_case_insensitive_across_fields() {
        let mut r = record("Gangnam Style", 2012, 7, 100);
        r.description = "Worldwide K-pop phenomenon".to_string();
        r.tags = vec!["Dance".to_string(), "Korea".to_string()];

        assert!(matches(&r, "gangnam"));
        assert!(matches(&r, "k-pop"));
        assert!(matches(&r, "dance"));
        assert!(!matches(&r, "doge"));
    }

    #[test]
    fn grouping_preserves_per_bucket_order_and_descends() {
        let records = vec![
            record("b", 2021, 5, 200),
            record("a", 2021, 5, 100),
            record("c", 2020, 1, 100),
            record("d", 2021, 1, 100),
        ];

        let groups = group_by_bucket(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].year, 2021);
        assert_eq!(groups[0].months[0].month, 5);
        assert_eq!(groups[0].months[1].month, 1);
        assert_eq!(groups[1].year, 2020);

        // Per-bucket input order survives the grouping
        let bucket_titles: Vec<&str> = groups[0].months[0]
            .memes
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(bucket_titles, vec!["b", "a"]);

        // Flattening back reconstructs every record exactly once
        let flattened: usize = groups
            .iter()
            .flat_map(|y| y.months.iter())
            .map(|m| m.memes.len())
            .sum();
        assert_eq!(flattened, records.len());
    }

    #[test]
    fn grouping_empty_input_yields_no_groups() {
        assert!(group_by_bucket(&[]).is_empty());
    }
}
