//! # Common Types
//!
//! This module contains the raw record types fed into the aggregators and the
//! keys used to group them over time.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseGranularityError;

/// A record that carries a date in one of several optional fields.
///
/// The first present field among `date`, `timestamp` and `createdAt` wins.
pub trait Dated {
    fn date_field(&self) -> Option<&str>;
}

/// A single commit as delivered by a data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    #[serde(default)]
    pub id: String,
    pub date: Option<String>,
    pub timestamp: Option<String>,
    pub created_at: Option<String>,
    pub author: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub repository: Option<String>,
    pub repository_name: Option<String>,
    pub repo_name: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl CommitRecord {
    pub fn new(id: &str, date: &str, author: &str, repository: &str) -> Self {
        Self {
            id: id.to_string(),
            date: Some(date.to_string()),
            author: Some(author.to_string()),
            repository: Some(repository.to_string()),
            ..Default::default()
        }
    }

    /// The commit author, falling back to the author name and then the email.
    pub fn author(&self) -> Option<&str> {
        self.author
            .as_deref()
            .or(self.author_name.as_deref())
            .or(self.author_email.as_deref())
            .filter(|a| !a.is_empty())
    }

    /// The repository, falling back to the alternative field spellings.
    pub fn repository(&self) -> Option<&str> {
        self.repository
            .as_deref()
            .or(self.repository_name.as_deref())
            .or(self.repo_name.as_deref())
            .filter(|r| !r.is_empty())
    }
}

impl Dated for CommitRecord {
    fn date_field(&self) -> Option<&str> {
        self.date
            .as_deref()
            .or(self.timestamp.as_deref())
            .or(self.created_at.as_deref())
    }
}

/// One day of code-quality measurements.
///
/// Metric values live in a free-form map so callers can chart any metric by
/// name; the usual ones are `bugs`, `vulnerabilities`, `codeSmells` and
/// `coverage`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityRecord {
    pub date: Option<String>,
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

impl QualityRecord {
    pub fn new(date: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            values: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.values.insert(name.to_string(), serde_json::Value::from(value));
        self
    }

    /// Value of `metric`, or 0 when missing or not numeric.
    pub fn metric(&self, metric: &str) -> f64 {
        self.values
            .get(metric)
            .and_then(serde_json::Value::as_f64)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }
}

impl Dated for QualityRecord {
    fn date_field(&self) -> Option<&str> {
        self.date.as_deref().or_else(|| {
            ["timestamp", "createdAt"]
                .iter()
                .find_map(|key| self.values.get(*key).and_then(serde_json::Value::as_str))
        })
    }
}

/// Workflow state of a story.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoryStatus {
    Done,
    InProgress,
    #[default]
    Todo,
    #[serde(other)]
    Other,
}

/// A story-point record, optionally tagged with the sprint it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    pub sprint: Option<String>,
    #[serde(default)]
    pub id: String,
    pub points: Option<f64>,
    #[serde(default)]
    pub status: StoryStatus,
    pub date: Option<String>,
    pub timestamp: Option<String>,
    pub created_at: Option<String>,
}

impl StoryRecord {
    pub fn new(sprint: &str, id: &str, points: f64, status: StoryStatus) -> Self {
        Self {
            sprint: Some(sprint.to_string()),
            id: id.to_string(),
            points: Some(points),
            status,
            ..Default::default()
        }
    }

    pub fn points(&self) -> f64 {
        self.points.filter(|p| p.is_finite()).unwrap_or(0.0)
    }

    pub fn is_done(&self) -> bool {
        self.status == StoryStatus::Done
    }
}

impl Dated for StoryRecord {
    fn date_field(&self) -> Option<&str> {
        self.date
            .as_deref()
            .or(self.timestamp.as_deref())
            .or(self.created_at.as_deref())
    }
}

/// Time-grouping resolution. `Sprint` only has meaning for story records;
/// time bucketing treats it like `Daily`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Sprint,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Sprint => "sprint",
        }
    }

    /// Parse `value`, logging and falling back to `Daily` when it is unknown.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|e: ParseGranularityError| {
            log::warn!("{}; falling back to daily", e);
            Granularity::Daily
        })
    }
}

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Granularity::Daily),
            "weekly" | "week" => Ok(Granularity::Weekly),
            "monthly" | "month" => Ok(Granularity::Monthly),
            "sprint" => Ok(Granularity::Sprint),
            _ => Err(ParseGranularityError(s.to_string())),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Granularity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Granularity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Granularity::parse_or_default(&raw))
    }
}

/// A time bucket identifier such as `2025-05-01`, `2025-W18` or `2025-05`.
///
/// Keys of one granularity sort lexicographically in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketKey(pub String);

impl BucketKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BucketKey {
    fn from(value: &str) -> Self {
        BucketKey(value.to_string())
    }
}
