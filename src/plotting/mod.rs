//! Chart geometry: scales, axes and the three chart variants, plus a
//! plotters backend that draws the resulting scenes.

pub mod axis;
pub mod backend;
pub mod chart;
pub mod commit_chart;
pub mod curve;
pub mod options;
pub mod quality_chart;
pub mod scales;
pub mod scene;
pub mod styles;
pub mod velocity_chart;

#[cfg(test)]
mod tests;

pub use chart::{
    Chart, ChartEvent, ChartKind, Container, DrawContext, LifecycleState, Size, Visualization,
};
pub use commit_chart::{CommitChart, CommitGeometry};
pub use options::{ChartOptions, ChartOptionsPatch, ChartType, Margin};
pub use quality_chart::{QualityChart, QualityGeometry};
pub use scene::{Element, Layer, Point, RenderStatus, Scene, SceneDiff, Shape, Tooltip};
pub use styles::{ChartStyle, ChartTheme, Color, Palette};
pub use velocity_chart::{VelocityChart, VelocityGeometry};
