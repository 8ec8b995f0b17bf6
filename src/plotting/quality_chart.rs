//! Line chart of code-quality metrics over time.
//!
//! Issue counts share the left axis. Coverage, when requested, gets its own
//! fixed 0-100 axis on the right.

use super::axis::{self, LegendItem, Side};
use super::chart::{Chart, ChartKind, DrawContext};
use super::options::{ChartOptions, ChartType};
use super::scales::{LinearScale, TimeScale};
use super::scene::{Curve, Element, Layer, Point, Shape, Tooltip};
use super::styles::Color;
use crate::analysis::{QualitySeries, COVERAGE_METRIC};
use crate::utils::{format_metric_name, format_number, format_tick};

/// Geometry for [`QualityChart`].
pub struct QualityGeometry;

pub type QualityChart = Chart<QualityGeometry>;

impl ChartKind for QualityGeometry {
    type Data = QualitySeries;

    const TYPE: ChartType = ChartType::Quality;

    fn has_data(data: &QualitySeries, options: &ChartOptions) -> bool {
        !data.is_empty() && !options.metrics.is_empty()
    }

    fn draw(data: &QualitySeries, ctx: &DrawContext<'_>) -> Vec<Element> {
        let area = &ctx.area;
        let metrics = &ctx.options.metrics;
        let palette = &ctx.theme.palette;
        if metrics.len() > palette.len() {
            log::warn!(
                "theme '{}' has {} colors for {} metrics; using the default palette",
                ctx.theme.name,
                palette.len(),
                metrics.len()
            );
        }
        let color_of = |metric: &str| -> Color {
            let index = metrics.iter().position(|m| m == metric).unwrap_or(metrics.len());
            palette.color(index)
        };

        let has_coverage = metrics.iter().any(|m| m == COVERAGE_METRIC);
        let primary: Vec<&str> = metrics
            .iter()
            .map(String::as_str)
            .filter(|m| *m != COVERAGE_METRIC)
            .collect();

        let Some(x) = TimeScale::from_extent(data.series.iter().map(|p| p.timestamp), area.x_range())
        else {
            return Vec::new();
        };
        let max = data
            .series
            .iter()
            .flat_map(|p| primary.iter().map(move |m| p.value(m)))
            .fold(0.0, f64::max);
        let y = LinearScale::with_headroom(max, area.y_range());
        let y2 = LinearScale::new((0.0, 100.0), area.y_range());

        let mut out = axis::time_axis(area, &x, ctx.ink());
        out.extend(axis::value_axis(area, &y, Side::Left, format_tick, ctx.ink()));
        if has_coverage {
            out.extend(axis::value_axis(
                area,
                &y2,
                Side::Right,
                |v| format!("{}%", format_number(v)),
                ctx.ink(),
            ));
        }

        let drawn = primary
            .iter()
            .map(|m| (*m, &y))
            .chain(has_coverage.then_some((COVERAGE_METRIC, &y2)));
        for (metric, scale) in drawn {
            let color = color_of(metric);
            let points: Vec<Point> = data
                .series
                .iter()
                .map(|p| Point::new(x.map(p.timestamp), scale.map(p.value(metric))))
                .collect();

            out.push(Element::new(
                format!("line:{}", metric),
                Layer::Line,
                Shape::Path {
                    points: points.clone(),
                    curve: Curve::MonotoneX,
                    stroke: color,
                    width: ctx.style.line_width,
                    dash: None,
                },
            ));

            let name = format_metric_name(metric);
            for (i, (point, center)) in data.series.iter().zip(points).enumerate() {
                let value = format_number(point.value(metric));
                let shown = if metric == COVERAGE_METRIC {
                    format!("{}%", value)
                } else {
                    value
                };
                let tooltip = Tooltip::new()
                    .row("Date", point.timestamp.format("%-m/%-d/%Y").to_string())
                    .row(&name, shown);
                out.push(
                    Element::new(
                        format!("marker:{}:{}", metric, i),
                        Layer::Marker,
                        Shape::Circle {
                            center,
                            radius: ctx.style.marker_radius,
                            fill: color,
                        },
                    )
                    .with_tooltip(tooltip),
                );
            }
        }

        let items: Vec<LegendItem> = metrics
            .iter()
            .map(|m| LegendItem::swatch(format_metric_name(m), color_of(m)))
            .collect();
        out.extend(axis::legend(area, &items, ctx.ink()));
        out.extend(ctx.chrome(
            "Date",
            "Issues",
            has_coverage.then_some("Coverage %"),
        ));
        out
    }
}
