//! Sprint velocity: total and completed points per sprint as overlaid bars,
//! with an optional rolling-velocity line and a summary panel.

use super::axis::{self, LegendItem, LegendMark, Side};
use super::chart::{Chart, ChartKind, DrawContext};
use super::options::{ChartOptions, ChartType};
use super::scales::{BandScale, LinearScale};
use super::scene::{Curve, Element, Layer, Point, Rect, Shape, TextAnchor, Tooltip};
use crate::analysis::{VelocitySeries, VelocitySummary};
use crate::utils::{format_number, format_tick, ratio_percent, rolling_mean};

const BAND_PADDING: f64 = 0.2;
const TOTAL_OPACITY: f64 = 0.5;
const SUMMARY_SIZE: (f64, f64) = (150.0, 80.0);

/// Geometry for [`VelocityChart`].
pub struct VelocityGeometry;

pub type VelocityChart = Chart<VelocityGeometry>;

impl ChartKind for VelocityGeometry {
    type Data = VelocitySeries;

    const TYPE: ChartType = ChartType::Velocity;

    fn has_data(data: &VelocitySeries, _options: &ChartOptions) -> bool {
        !data.is_empty()
    }

    fn draw(data: &VelocitySeries, ctx: &DrawContext<'_>) -> Vec<Element> {
        let area = &ctx.area;
        let palette = &ctx.theme.palette;
        let (total_color, completed_color, velocity_color) =
            (palette.color(0), palette.color(1), palette.color(2));

        let periods: Vec<String> = data.sprints.iter().map(|s| s.period.clone()).collect();
        let x = BandScale::new(periods.clone(), area.x_range(), BAND_PADDING);
        let max = data
            .sprints
            .iter()
            .map(|s| s.total.max(s.completed))
            .fold(0.0, f64::max);
        let y = LinearScale::with_headroom(max, area.y_range());

        let mut out = axis::band_axis(area, &x, &periods, ctx.ink());
        out.extend(axis::value_axis(area, &y, Side::Left, format_tick, ctx.ink()));

        let bar = |i: usize, value: f64| {
            let top = y.map(value);
            Rect::new(x.position(i), top, x.bandwidth(), area.bottom() - top)
        };

        for (i, sprint) in data.sprints.iter().enumerate() {
            let tooltip = Tooltip::new()
                .row("Sprint", sprint.period.clone())
                .row("Total Points", format_number(sprint.total))
                .row("Stories", sprint.stories.to_string());
            out.push(
                Element::new(
                    format!("bar:total:{}", sprint.period),
                    Layer::Bar,
                    Shape::Rect {
                        rect: bar(i, sprint.total),
                        fill: total_color,
                        opacity: TOTAL_OPACITY,
                    },
                )
                .with_tooltip(tooltip),
            );
        }

        for (i, sprint) in data.sprints.iter().enumerate() {
            let rate = if sprint.total > 0.0 {
                ratio_percent(sprint.completed, sprint.total)
            } else {
                0.0
            };
            let tooltip = Tooltip::new()
                .row("Sprint", sprint.period.clone())
                .row("Completed Points", format_number(sprint.completed))
                .row("Completion Rate", format!("{}%", format_number(rate)));
            out.push(
                Element::new(
                    format!("bar:completed:{}", sprint.period),
                    Layer::Bar,
                    Shape::Rect {
                        rect: bar(i, sprint.completed),
                        fill: completed_color,
                        opacity: 1.0,
                    },
                )
                .with_tooltip(tooltip),
            );
        }

        // follows the chart's own velocityWindow option
        let completed: Vec<f64> = data.sprints.iter().map(|s| s.completed).collect();
        let velocity = rolling_mean(&completed, ctx.options.velocity_window);
        if ctx.options.show_velocity && velocity.len() > 1 {
            let points: Vec<Point> = velocity
                .iter()
                .enumerate()
                .map(|(i, v)| Point::new(x.center(i), y.map(*v)))
                .collect();
            out.push(Element::new(
                "line:velocity",
                Layer::Line,
                Shape::Path {
                    points: points.clone(),
                    curve: Curve::MonotoneX,
                    stroke: velocity_color,
                    width: ctx.style.line_width,
                    dash: Some((5.0, 5.0)),
                },
            ));
            for ((sprint, v), center) in data.sprints.iter().zip(&velocity).zip(points) {
                let tooltip = Tooltip::new()
                    .row("Sprint", sprint.period.clone())
                    .row("Velocity", format!("{:.1} points/sprint", v));
                out.push(
                    Element::new(
                        format!("marker:velocity:{}", sprint.period),
                        Layer::Marker,
                        Shape::Circle {
                            center,
                            radius: ctx.style.marker_radius,
                            fill: velocity_color,
                        },
                    )
                    .with_tooltip(tooltip),
                );
            }
        }

        let mut items = vec![
            LegendItem {
                label: "Total Points".to_string(),
                color: total_color,
                mark: LegendMark::Swatch {
                    opacity: TOTAL_OPACITY,
                },
            },
            LegendItem::swatch("Completed Points", completed_color),
        ];
        if ctx.options.show_velocity {
            items.push(LegendItem {
                label: "Velocity".to_string(),
                color: velocity_color,
                mark: LegendMark::DashedLine,
            });
        }
        out.extend(axis::legend(area, &items, ctx.ink()));
        out.extend(ctx.chrome("Sprint", "Story Points", None));

        if ctx.options.show_summary {
            out.extend(summary_panel(&data.summary, ctx));
        }
        out
    }
}

/// Boxed key figures in the top-right corner of the plot area.
fn summary_panel(summary: &VelocitySummary, ctx: &DrawContext<'_>) -> Vec<Element> {
    let (w, h) = SUMMARY_SIZE;
    let x = ctx.area.width - ctx.area.margin.right - w;
    let y = ctx.area.margin.top + 30.0;

    let mut out = vec![Element::new(
        "summary:box",
        Layer::Summary,
        Shape::Rect {
            rect: Rect::new(x, y, w, h),
            fill: ctx.theme.surface,
            opacity: 1.0,
        },
    )];
    let lines = [
        ("velocity", format!("Avg Velocity: {} pts", format_number(summary.velocity))),
        (
            "completion",
            format!("Completion: {}%", format_number(summary.completion_rate)),
        ),
        ("points", format!("Total Points: {}", format_number(summary.total_points))),
    ];
    for (i, (key, content)) in lines.into_iter().enumerate() {
        out.push(Element::new(
            format!("summary:{}", key),
            Layer::Summary,
            Shape::Text {
                position: Point::new(x + 10.0, y + 20.0 + i as f64 * 20.0),
                content,
                color: ctx.theme.text,
                font_size: ctx.style.label_font_size,
                anchor: TextAnchor::Start,
                rotation: 0.0,
                bold: false,
            },
        ));
    }
    out
}
