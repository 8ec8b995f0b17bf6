//! Error types shared by the aggregation and plotting layers.

use thiserror::Error;

/// Errors raised while turning raw records into series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A record has no parseable date in any of its date fields.
    #[error("invalid record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// An unrecognised granularity name. Option parsing recovers from this by
/// falling back to `daily`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown granularity '{0}'")]
pub struct ParseGranularityError(pub String);

/// Errors raised by chart construction, the render lifecycle and backends.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("chart '{0}' used before init()")]
    NotInitialized(String),

    #[error("chart '{0}' used after destroy()")]
    Destroyed(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("drawing backend error: {0}")]
    Backend(String),
}

pub type ChartResult<T> = Result<T, ChartError>;
