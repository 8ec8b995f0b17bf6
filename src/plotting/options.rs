//! Chart configuration.
//!
//! Options deserialize from the same camelCase JSON a dashboard config uses.
//! Malformed values fall back to defaults instead of failing: an unknown
//! granularity becomes `daily`, a zero velocity window becomes 3.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analysis::{
    default_metrics, CommitQuery, QualityQuery, VelocityQuery, DEFAULT_VELOCITY_WINDOW,
};
use crate::error::{ChartError, ChartResult};
use crate::types::Granularity;

/// Space reserved around the plot area for axes and labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 30.0,
            left: 40.0,
        }
    }
}

/// The three chart variants, by their configuration names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartType {
    #[serde(rename = "commitFrequency")]
    Commit,
    #[serde(rename = "codeQuality")]
    Quality,
    #[serde(rename = "velocity")]
    Velocity,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Commit => "commitFrequency",
            ChartType::Quality => "codeQuality",
            ChartType::Velocity => "velocity",
        }
    }
}

impl FromStr for ChartType {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commitFrequency" | "commits" => Ok(ChartType::Commit),
            "codeQuality" | "quality" => Ok(ChartType::Quality),
            "velocity" => Ok(ChartType::Velocity),
            "" => Err(ChartError::Configuration("chart type is required".to_string())),
            other => Err(ChartError::Configuration(format!(
                "unknown chart type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartOptions {
    pub title: Option<String>,
    pub x_axis_label: Option<String>,
    pub y_axis_label: Option<String>,
    #[serde(alias = "timeRange")]
    pub granularity: Granularity,
    pub metrics: Vec<String>,
    pub velocity_window: usize,
    pub show_velocity: bool,
    pub show_summary: bool,
    /// Fixed size overriding the container's, in pixels.
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub margin: Margin,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: None,
            x_axis_label: None,
            y_axis_label: None,
            granularity: Granularity::Daily,
            metrics: default_metrics(),
            velocity_window: DEFAULT_VELOCITY_WINDOW,
            show_velocity: true,
            show_summary: true,
            width: None,
            height: None,
            margin: Margin::default(),
        }
    }
}

impl ChartOptions {
    /// The dashboard defaults for a chart type.
    pub fn preset(chart_type: ChartType) -> Self {
        let (title, x, y) = match chart_type {
            ChartType::Commit => ("Commit Activity", "Date", "Commits"),
            ChartType::Quality => ("Code Quality Trends", "Date", "Count"),
            ChartType::Velocity => ("Sprint Velocity", "Sprint", "Story Points"),
        };
        Self {
            title: Some(title.to_string()),
            x_axis_label: Some(x.to_string()),
            y_axis_label: Some(y.to_string()),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> ChartResult<Self> {
        let options: ChartOptions = serde_json::from_str(json)
            .map_err(|e| ChartError::Configuration(format!("invalid chart options: {}", e)))?;
        Ok(options.normalized())
    }

    /// Replace out-of-range values with their defaults.
    pub fn normalized(mut self) -> Self {
        if self.velocity_window == 0 {
            log::warn!(
                "velocityWindow must be positive; using {}",
                DEFAULT_VELOCITY_WINDOW
            );
            self.velocity_window = DEFAULT_VELOCITY_WINDOW;
        }
        let mut seen = std::collections::HashSet::new();
        self.metrics.retain(|m| seen.insert(m.clone()));
        if self.metrics.is_empty() {
            self.metrics = default_metrics();
        }
        for size in [&mut self.width, &mut self.height] {
            if size.map_or(false, |v| !v.is_finite() || v < 0.0) {
                log::warn!("ignoring invalid chart size {:?}", size);
                *size = None;
            }
        }
        self
    }

    /// Merge `patch` field-wise; fields it sets win.
    pub fn apply(&mut self, patch: ChartOptionsPatch) {
        if let Some(title) = patch.title {
            self.title = Some(title);
        }
        if let Some(label) = patch.x_axis_label {
            self.x_axis_label = Some(label);
        }
        if let Some(label) = patch.y_axis_label {
            self.y_axis_label = Some(label);
        }
        if let Some(granularity) = patch.granularity {
            self.granularity = granularity;
        }
        if let Some(metrics) = patch.metrics {
            self.metrics = metrics;
        }
        if let Some(window) = patch.velocity_window {
            self.velocity_window = window;
        }
        if let Some(show) = patch.show_velocity {
            self.show_velocity = show;
        }
        if let Some(show) = patch.show_summary {
            self.show_summary = show;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(margin) = patch.margin {
            self.margin = margin;
        }
        *self = std::mem::take(self).normalized();
    }

    pub fn commit_query(&self) -> CommitQuery<'static> {
        CommitQuery {
            granularity: self.granularity,
            filter: None,
        }
    }

    pub fn quality_query(&self) -> QualityQuery<'static> {
        QualityQuery {
            metrics: self.metrics.clone(),
            filter: None,
        }
    }

    /// Velocity grouping follows the granularity; `daily` (the default)
    /// still means grouping by sprint label.
    pub fn velocity_query(&self) -> VelocityQuery<'static> {
        let grouping = match self.granularity {
            Granularity::Daily => Granularity::Sprint,
            other => other,
        };
        VelocityQuery {
            grouping,
            velocity_window: self.velocity_window,
            filter: None,
        }
    }
}

/// A partial [`ChartOptions`] update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartOptionsPatch {
    pub title: Option<String>,
    pub x_axis_label: Option<String>,
    pub y_axis_label: Option<String>,
    #[serde(alias = "timeRange")]
    pub granularity: Option<Granularity>,
    pub metrics: Option<Vec<String>>,
    pub velocity_window: Option<usize>,
    pub show_velocity: Option<bool>,
    pub show_summary: Option<bool>,
    /// `Some(None)` (JSON `null`) clears a fixed width so the chart follows
    /// its container again.
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub width: Option<Option<f64>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub height: Option<Option<f64>>,
    pub margin: Option<Margin>,
}

/// Tells an explicit `null` apart from a missing field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
