//! Code-quality metrics over time.

use chrono::NaiveDateTime;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use super::bucket::record_date;
use super::commits::RecordFilter;
use crate::error::AnalysisError;
use crate::types::QualityRecord;
use crate::utils::round_to;

/// Metric charted on the fixed 0-100 secondary axis.
pub const COVERAGE_METRIC: &str = "coverage";

/// Metrics extracted when the caller does not name any.
pub const DEFAULT_METRICS: [&str; 4] = ["bugs", "vulnerabilities", "codeSmells", COVERAGE_METRIC];

pub fn default_metrics() -> Vec<String> {
    DEFAULT_METRICS.iter().map(|m| m.to_string()).collect()
}

/// Options for [`QualityAggregator::aggregate`].
#[derive(Clone)]
pub struct QualityQuery<'a> {
    pub metrics: Vec<String>,
    pub filter: Option<RecordFilter<'a, QualityRecord>>,
}

impl Default for QualityQuery<'_> {
    fn default() -> Self {
        Self {
            metrics: default_metrics(),
            filter: None,
        }
    }
}

/// The requested metrics at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityPoint {
    /// Date as supplied by the record.
    pub date: String,
    pub timestamp: NaiveDateTime,
    pub values: BTreeMap<String, f64>,
}

impl QualityPoint {
    pub fn value(&self, metric: &str) -> f64 {
        self.values.get(metric).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    /// Value of the last point after sorting.
    pub current: f64,
    pub min: f64,
    pub max: f64,
    /// Mean rounded to one decimal.
    pub average: f64,
    /// `last - first`; 0 for fewer than two points.
    pub trend: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualitySeries {
    pub metrics: Vec<String>,
    pub series: Vec<QualityPoint>,
    pub summary: BTreeMap<String, MetricSummary>,
}

impl QualitySeries {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

pub struct QualityAggregator;

impl QualityAggregator {
    /// Filter, sort by date and summarise `records`.
    ///
    /// Caller order is not trusted; points are stably sorted by date.
    pub fn aggregate(
        records: &[QualityRecord],
        query: &QualityQuery<'_>,
    ) -> Result<QualitySeries, AnalysisError> {
        let mut series = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if !query.filter.map_or(true, |keep| keep(record)) {
                continue;
            }
            let timestamp = record_date(index, record)?;
            let values = query
                .metrics
                .iter()
                .map(|metric| (metric.clone(), record.metric(metric)))
                .collect();
            series.push(QualityPoint {
                date: record.date.clone().unwrap_or_else(|| timestamp.to_string()),
                timestamp,
                values,
            });
        }
        series.sort_by_key(|point| point.timestamp);

        let summary = query
            .metrics
            .iter()
            .map(|metric| {
                let values: Vec<f64> = series.iter().map(|p| p.value(metric)).collect();
                (metric.clone(), summarize(&values))
            })
            .collect();

        log::debug!(
            "aggregated {} quality points for {} metrics",
            series.len(),
            query.metrics.len()
        );

        Ok(QualitySeries {
            metrics: query.metrics.clone(),
            series,
            summary,
        })
    }
}

fn summarize(values: &[f64]) -> MetricSummary {
    let (Some(first), Some(last)) = (values.first(), values.last()) else {
        return MetricSummary::default();
    };

    MetricSummary {
        current: *last,
        min: Statistics::min(values.iter()),
        max: Statistics::max(values.iter()),
        average: round_to(values.iter().mean(), 1),
        trend: if values.len() > 1 { last - first } else { 0.0 },
    }
}
