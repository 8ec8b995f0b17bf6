//! Bar chart of commits per time bucket.

use super::axis::{self, Side};
use super::chart::{Chart, ChartKind, DrawContext};
use super::options::{ChartOptions, ChartType};
use super::scales::{BandScale, LinearScale};
use super::scene::{Element, Layer, Rect, Shape, Tooltip};
use crate::analysis::CommitSeries;
use crate::utils::format::{format_bucket_label, format_tooltip_date};
use crate::utils::format_tick;

const BAND_PADDING: f64 = 0.1;

/// Geometry for [`CommitChart`].
pub struct CommitGeometry;

pub type CommitChart = Chart<CommitGeometry>;

impl ChartKind for CommitGeometry {
    type Data = CommitSeries;

    const TYPE: ChartType = ChartType::Commit;

    fn has_data(data: &CommitSeries, _options: &ChartOptions) -> bool {
        !data.is_empty()
    }

    fn draw(data: &CommitSeries, ctx: &DrawContext<'_>) -> Vec<Element> {
        let area = &ctx.area;
        let keys: Vec<String> = data.commits.iter().map(|b| b.date.to_string()).collect();
        let labels: Vec<String> = data
            .commits
            .iter()
            .map(|b| format_bucket_label(&b.date, data.granularity))
            .collect();

        let x = BandScale::new(keys, area.x_range(), BAND_PADDING);
        let max = data.commits.iter().map(|b| b.count).max().unwrap_or(0) as f64;
        let y = LinearScale::with_headroom(max, area.y_range());

        let mut out = axis::band_axis(area, &x, &labels, ctx.ink());
        out.extend(axis::value_axis(area, &y, Side::Left, format_tick, ctx.ink()));

        for (i, bucket) in data.commits.iter().enumerate() {
            let count = bucket.count as f64;
            let top = y.map(count);
            let shade = if max > 0.0 { count / max } else { 0.0 };
            let tooltip = Tooltip::new()
                .row("Date", format_tooltip_date(bucket.date.as_str()))
                .row("Commits", bucket.count.to_string())
                .row("Authors", bucket.authors.len().to_string());
            out.push(
                Element::new(
                    format!("bar:{}", bucket.date),
                    Layer::Bar,
                    Shape::Rect {
                        rect: Rect::new(x.position(i), top, x.bandwidth(), area.bottom() - top),
                        fill: ctx.style.bar_low.lerp(ctx.style.bar_high, shade),
                        opacity: 1.0,
                    },
                )
                .with_tooltip(tooltip),
            );
        }

        out.extend(ctx.chrome("Date", "Commit Count", None));
        out
    }
}
