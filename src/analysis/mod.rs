pub mod bucket;
pub mod commits;
pub mod quality;
pub mod velocity;


pub use bucket::{bucket_key, parse_record_date, SprintGroup, SprintGrouper, TimeBucketer};
pub use commits::{CommitAggregator, CommitBucket, CommitQuery, CommitSeries, CommitSummary, RecordFilter};
pub use quality::{
    default_metrics, MetricSummary, QualityAggregator, QualityPoint, QualityQuery, QualitySeries,
    COVERAGE_METRIC,
};
pub use velocity::{
    SprintSummary, VelocityAggregator, VelocityPoint, VelocityQuery, VelocitySeries,
    VelocitySummary, DEFAULT_VELOCITY_WINDOW,
};
