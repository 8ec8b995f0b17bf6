//! Grouping of raw records into time buckets and sprints.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};

use crate::error::AnalysisError;
use crate::types::{BucketKey, Dated, Granularity, StoryRecord};

/// Label used for stories that carry no sprint.
pub const UNASSIGNED_SPRINT: &str = "Unassigned";

/// Parse a record date. Offsets are normalised to UTC; bare dates are taken
/// as midnight UTC.
pub fn parse_record_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Resolve the date of the record at `index`, or fail with `InvalidRecord`.
pub fn record_date<T: Dated>(index: usize, record: &T) -> Result<NaiveDateTime, AnalysisError> {
    let raw = record.date_field().ok_or_else(|| AnalysisError::InvalidRecord {
        index,
        reason: "missing date, timestamp and createdAt".to_string(),
    })?;
    parse_record_date(raw).ok_or_else(|| AnalysisError::InvalidRecord {
        index,
        reason: format!("unparseable date '{}'", raw),
    })
}

/// Derive the bucket key of `date` at `granularity`.
///
/// Weeks count 7-day blocks from January 1st: days 1-7 of the year are
/// week 01, days 8-14 week 02, and so on up to week 53.
pub fn bucket_key(date: NaiveDate, granularity: Granularity) -> BucketKey {
    let key = match granularity {
        Granularity::Daily | Granularity::Sprint => date.format("%Y-%m-%d").to_string(),
        Granularity::Weekly => {
            let week = date.ordinal0() / 7 + 1;
            format!("{:04}-W{:02}", date.year(), week)
        }
        Granularity::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
    };
    BucketKey(key)
}

/// Groups dated records into chronologically ordered buckets.
pub struct TimeBucketer;

impl TimeBucketer {
    /// Bucket every record of `records`.
    ///
    /// Within a bucket records keep their input order. A record without a
    /// usable date aborts the whole call with `InvalidRecord`.
    pub fn bucket<T: Dated>(
        records: &[T],
        granularity: Granularity,
    ) -> Result<BTreeMap<BucketKey, Vec<&T>>, AnalysisError> {
        Self::bucket_indexed(records.iter().enumerate(), granularity)
    }

    /// Bucket `(original index, record)` pairs, so errors can point at the
    /// caller's index even after filtering.
    pub fn bucket_indexed<'a, T, I>(
        records: I,
        granularity: Granularity,
    ) -> Result<BTreeMap<BucketKey, Vec<&'a T>>, AnalysisError>
    where
        T: Dated + 'a,
        I: IntoIterator<Item = (usize, &'a T)>,
    {
        if granularity == Granularity::Sprint {
            log::debug!("sprint granularity has no time key; bucketing daily");
        }

        let mut buckets: BTreeMap<BucketKey, Vec<&'a T>> = BTreeMap::new();
        for (index, record) in records {
            let date = record_date(index, record)?;
            buckets
                .entry(bucket_key(date.date(), granularity))
                .or_default()
                .push(record);
        }
        Ok(buckets)
    }
}

/// Stories that share one sprint label.
#[derive(Debug, Clone, PartialEq)]
pub struct SprintGroup<'a> {
    pub period: String,
    pub stories: Vec<&'a StoryRecord>,
}

/// Groups story records by their explicit sprint label.
pub struct SprintGrouper;

impl SprintGrouper {
    /// Groups come out in the order their sprint is first seen.
    pub fn group<'a, I>(stories: I) -> Vec<SprintGroup<'a>>
    where
        I: IntoIterator<Item = &'a StoryRecord>,
    {
        let mut groups: Vec<SprintGroup<'a>> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for story in stories {
            let period = story
                .sprint
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(UNASSIGNED_SPRINT);

            let position = match positions.get(period) {
                Some(&position) => position,
                None => {
                    groups.push(SprintGroup {
                        period: period.to_string(),
                        stories: Vec::new(),
                    });
                    positions.insert(period.to_string(), groups.len() - 1);
                    groups.len() - 1
                }
            };
            groups[position].stories.push(story);
        }

        groups
    }
}
