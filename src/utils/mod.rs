pub mod aggregation;
pub mod format;

pub use aggregation::{ratio_percent, rolling_mean, round_to};
pub use format::{format_metric_name, format_number, format_tick};
