//! Chart-ready views of developer activity.
//!
//! Raw records ([`types`]) go through the aggregators in [`analysis`], which
//! bucket commits by day, week or month and group stories by sprint. The
//! resulting series feed the charts in [`plotting`]. Each chart keeps a keyed
//! scene of bars, lines, axes and legends and follows the
//! init/render/resize/update/destroy contract of [`Visualization`]. Empty
//! input renders a "No data available" placeholder. [`feed`] pushes fresh
//! records into mounted charts, either on demand or on a cancellable timer,
//! and [`plotting::backend`] draws scenes to SVG with plotters.
//!
//! ## Example
//!
//! ```no_run
//! use devcharts::analysis::CommitAggregator;
//! use devcharts::plotting::{backend, ChartOptions, ChartTheme, CommitChart, Container, Visualization};
//! use devcharts::types::CommitRecord;
//!
//! let commits = vec![CommitRecord::new("c1", "2025-05-01", "alex", "api")];
//! let options = ChartOptions::default();
//! let series = CommitAggregator::aggregate(&commits, &options.commit_query()).unwrap();
//!
//! let mut chart = CommitChart::new("commits", Container::new(800.0, 400.0), ChartTheme::light(), options)
//!     .unwrap()
//!     .with_data(series);
//! chart.init().unwrap();
//! chart.render().unwrap();
//! backend::save_svg(chart.scene(), std::path::Path::new("commits.svg")).unwrap();
//! ```

pub mod analysis;
pub mod error;
pub mod events;
pub mod feed;
pub mod plotting;
pub mod types;
pub mod utils;

// Aggregators, charts and record types used by most callers
pub use analysis::{CommitAggregator, QualityAggregator, VelocityAggregator};
pub use error::{AnalysisError, ChartError, ChartResult};
pub use feed::{DataFeed, FeedKind, FeedUpdate, PeriodicFeed};
pub use plotting::{ChartOptions, CommitChart, QualityChart, VelocityChart, Visualization};
pub use types::{CommitRecord, Granularity, QualityRecord, StoryRecord, StoryStatus};
