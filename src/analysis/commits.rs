//! Commit activity per time bucket.

use serde::Serialize;
use std::collections::BTreeSet;

use super::bucket::TimeBucketer;
use crate::error::AnalysisError;
use crate::types::{BucketKey, CommitRecord, Granularity};

/// Predicate applied to raw records before any grouping.
pub type RecordFilter<'a, T> = &'a dyn Fn(&T) -> bool;

/// Options for [`CommitAggregator::aggregate`].
#[derive(Clone, Copy, Default)]
pub struct CommitQuery<'a> {
    pub granularity: Granularity,
    pub filter: Option<RecordFilter<'a, CommitRecord>>,
}

/// Commits that fall into one time bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitBucket {
    pub date: BucketKey,
    pub count: usize,
    pub authors: BTreeSet<String>,
    pub repositories: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub total_commits: usize,
    /// `round(total / buckets)`, 0 when there are no buckets.
    pub average_commits_per_period: usize,
    pub max_commits_in_period: usize,
    /// Distinct authors across all filtered commits, not per bucket.
    pub unique_authors: usize,
    pub unique_repositories: usize,
}

/// Bucketed commit counts ready for the commit chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommitSeries {
    pub granularity: Granularity,
    pub commits: Vec<CommitBucket>,
    pub summary: CommitSummary,
}

impl CommitSeries {
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

pub struct CommitAggregator;

impl CommitAggregator {
    /// Filter, bucket and summarise `records`.
    pub fn aggregate(
        records: &[CommitRecord],
        query: &CommitQuery<'_>,
    ) -> Result<CommitSeries, AnalysisError> {
        let filtered: Vec<(usize, &CommitRecord)> = records
            .iter()
            .enumerate()
            .filter(|(_, record)| query.filter.map_or(true, |keep| keep(*record)))
            .collect();

        let buckets = TimeBucketer::bucket_indexed(filtered.iter().copied(), query.granularity)?;

        let commits: Vec<CommitBucket> = buckets
            .into_iter()
            .map(|(date, bucket)| CommitBucket {
                date,
                count: bucket.len(),
                authors: unique_authors(bucket.iter().copied()),
                repositories: unique_repositories(bucket.iter().copied()),
            })
            .collect();

        let total_commits: usize = commits.iter().map(|c| c.count).sum();
        let average_commits_per_period = if commits.is_empty() {
            0
        } else {
            (total_commits as f64 / commits.len() as f64).round() as usize
        };

        let summary = CommitSummary {
            total_commits,
            average_commits_per_period,
            max_commits_in_period: commits.iter().map(|c| c.count).max().unwrap_or(0),
            unique_authors: unique_authors(filtered.iter().map(|(_, r)| *r)).len(),
            unique_repositories: unique_repositories(filtered.iter().map(|(_, r)| *r)).len(),
        };

        log::debug!(
            "aggregated {} of {} commits into {} {} buckets",
            total_commits,
            records.len(),
            commits.len(),
            query.granularity
        );

        Ok(CommitSeries {
            granularity: query.granularity,
            commits,
            summary,
        })
    }
}

fn unique_authors<'a>(records: impl Iterator<Item = &'a CommitRecord>) -> BTreeSet<String> {
    records
        .filter_map(CommitRecord::author)
        .map(str::to_string)
        .collect()
}

fn unique_repositories<'a>(records: impl Iterator<Item = &'a CommitRecord>) -> BTreeSet<String> {
    records
        .filter_map(CommitRecord::repository)
        .map(str::to_string)
        .collect()
}
