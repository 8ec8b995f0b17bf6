//! Axes, titles, axis labels and legends shared by the chart variants.
//!
//! Everything is laid out in absolute scene coordinates: the plot area is
//! inset from the chart bounds by the configured margin.

use chrono::NaiveDateTime;

use super::options::Margin;
use super::scales::{BandScale, LinearScale, TimeScale};
use super::scene::{Curve, Element, Layer, Point, Rect, Shape, TextAnchor};
use super::styles::{ChartStyle, ChartTheme, Color};

/// Chart bounds and the plot area inside them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl PlotArea {
    pub fn new(width: f64, height: f64, margin: Margin) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    pub fn inner_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn inner_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    pub fn left(&self) -> f64 {
        self.margin.left
    }

    pub fn right(&self) -> f64 {
        self.margin.left + self.inner_width()
    }

    pub fn top(&self) -> f64 {
        self.margin.top
    }

    pub fn bottom(&self) -> f64 {
        self.margin.top + self.inner_height()
    }

    /// Pixel range for an x scale.
    pub fn x_range(&self) -> (f64, f64) {
        (self.left(), self.right())
    }

    /// Pixel range for a y scale; larger values sit higher.
    pub fn y_range(&self) -> (f64, f64) {
        (self.bottom(), self.top())
    }
}

/// Which edge of the plot area a vertical axis sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Chrome shared by every variant: colors and sizes.
#[derive(Debug, Clone, Copy)]
pub struct Ink<'a> {
    pub theme: &'a ChartTheme,
    pub style: &'a ChartStyle,
}

impl Ink<'_> {
    fn text(&self, position: Point, content: String, anchor: TextAnchor) -> Shape {
        Shape::Text {
            position,
            content,
            color: self.theme.text,
            font_size: self.style.tick_font_size,
            anchor,
            rotation: 0.0,
            bold: false,
        }
    }

    fn rule(&self, from: Point, to: Point) -> Shape {
        Shape::Line {
            from,
            to,
            stroke: self.theme.axis,
            width: 1.0,
        }
    }
}

/// Bottom axis for a band scale. `labels` align with the scale domain.
pub fn band_axis(area: &PlotArea, scale: &BandScale, labels: &[String], ink: Ink<'_>) -> Vec<Element> {
    let y = area.bottom();
    let tick = ink.style.tick_size;
    let mut out = vec![Element::new(
        "x-axis:domain",
        Layer::Axis,
        ink.rule(Point::new(area.left(), y), Point::new(area.right(), y)),
    )];

    for (i, (value, label)) in scale.domain().iter().zip(labels).enumerate() {
        let x = scale.center(i);
        out.push(Element::new(
            format!("x-axis:tick:{}", value),
            Layer::Axis,
            ink.rule(Point::new(x, y), Point::new(x, y + tick)),
        ));
        out.push(slanted_label(
            format!("x-axis:label:{}", value),
            Point::new(x, y + tick + 3.0),
            label.clone(),
            ink,
        ));
    }
    out
}

/// Bottom axis for a time scale, ticks on calendar boundaries.
pub fn time_axis(area: &PlotArea, scale: &TimeScale, ink: Ink<'_>) -> Vec<Element> {
    let y = area.bottom();
    let tick = ink.style.tick_size;
    let (interval, ticks) = scale.ticks(ink.style.tick_count);
    let mut out = vec![Element::new(
        "x-axis:domain",
        Layer::Axis,
        ink.rule(Point::new(area.left(), y), Point::new(area.right(), y)),
    )];

    for t in ticks {
        let x = scale.map(t);
        let key = tick_key(t);
        out.push(Element::new(
            format!("x-axis:tick:{}", key),
            Layer::Axis,
            ink.rule(Point::new(x, y), Point::new(x, y + tick)),
        ));
        out.push(slanted_label(
            format!("x-axis:label:{}", key),
            Point::new(x, y + tick + 3.0),
            t.format(interval.label_format()).to_string(),
            ink,
        ));
    }
    out
}

fn tick_key(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M").to_string()
}

fn slanted_label(key: String, position: Point, content: String, ink: Ink<'_>) -> Element {
    let mut shape = ink.text(position, content, TextAnchor::End);
    if let Shape::Text { rotation, .. } = &mut shape {
        *rotation = -45.0;
    }
    Element::new(key, Layer::Axis, shape)
}

/// Vertical value axis on `side`, tick labels produced by `format`.
pub fn value_axis<F>(
    area: &PlotArea,
    scale: &LinearScale,
    side: Side,
    format: F,
    ink: Ink<'_>,
) -> Vec<Element>
where
    F: Fn(f64) -> String,
{
    let (name, x, dir, anchor) = match side {
        Side::Left => ("y-axis", area.left(), -1.0, TextAnchor::End),
        Side::Right => ("y2-axis", area.right(), 1.0, TextAnchor::Start),
    };
    let tick = ink.style.tick_size;
    let mut out = vec![Element::new(
        format!("{}:domain", name),
        Layer::Axis,
        ink.rule(Point::new(x, area.top()), Point::new(x, area.bottom())),
    )];

    for value in scale.ticks(ink.style.tick_count) {
        let y = scale.map(value);
        let label = format(value);
        out.push(Element::new(
            format!("{}:tick:{}", name, value),
            Layer::Axis,
            ink.rule(Point::new(x, y), Point::new(x + dir * tick, y)),
        ));
        out.push(Element::new(
            format!("{}:label:{}", name, value),
            Layer::Axis,
            ink.text(
                Point::new(x + dir * (tick + 3.0), y + ink.style.tick_font_size / 3.0),
                label,
                anchor,
            ),
        ));
    }
    out
}

/// Axis captions: x centered along the bottom edge, y rotated along the
/// left edge, and an optional secondary caption along the right edge.
pub fn axis_labels(area: &PlotArea, x: &str, y: &str, y2: Option<&str>, ink: Ink<'_>) -> Vec<Element> {
    let caption = |key: &str, position: Point, content: &str, rotation: f64| {
        Element::new(
            key,
            Layer::Label,
            Shape::Text {
                position,
                content: content.to_string(),
                color: ink.theme.text,
                font_size: ink.style.label_font_size,
                anchor: TextAnchor::Middle,
                rotation,
                bold: false,
            },
        )
    };

    let mut out = vec![
        caption("label:x", Point::new(area.width / 2.0, area.height - 5.0), x, 0.0),
        caption("label:y", Point::new(15.0, area.height / 2.0), y, -90.0),
    ];
    if let Some(y2) = y2 {
        out.push(caption(
            "label:y2",
            Point::new(area.width - 15.0, area.height / 2.0),
            y2,
            90.0,
        ));
    }
    out
}

pub fn title(area: &PlotArea, text: &str, ink: Ink<'_>) -> Element {
    Element::new(
        "title",
        Layer::Label,
        Shape::Text {
            position: Point::new(area.width / 2.0, 15.0),
            content: text.to_string(),
            color: ink.theme.text,
            font_size: ink.style.title_font_size,
            anchor: TextAnchor::Middle,
            rotation: 0.0,
            bold: true,
        },
    )
}

/// How a legend entry is marked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegendMark {
    Swatch { opacity: f64 },
    /// Short dashed stroke with a dot, for line series.
    DashedLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub label: String,
    pub color: Color,
    pub mark: LegendMark,
}

impl LegendItem {
    pub fn swatch(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            color,
            mark: LegendMark::Swatch { opacity: 1.0 },
        }
    }
}

/// A row of legend entries below the plot area.
pub fn legend(area: &PlotArea, items: &[LegendItem], ink: Ink<'_>) -> Vec<Element> {
    let y = area.top() + area.inner_height() + 40.0;
    let swatch = ink.style.legend_swatch;
    let mut out = Vec::with_capacity(items.len() * 3);

    for (i, item) in items.iter().enumerate() {
        let x = area.left() + i as f64 * ink.style.legend_spacing;
        match item.mark {
            LegendMark::Swatch { opacity } => out.push(Element::new(
                format!("legend:swatch:{}", item.label),
                Layer::Legend,
                Shape::Rect {
                    rect: Rect::new(x, y, swatch, swatch),
                    fill: item.color,
                    opacity,
                },
            )),
            LegendMark::DashedLine => {
                let mid = y + swatch / 2.0;
                out.push(Element::new(
                    format!("legend:swatch:{}", item.label),
                    Layer::Legend,
                    Shape::Path {
                        points: vec![Point::new(x, mid), Point::new(x + swatch, mid)],
                        curve: Curve::Linear,
                        stroke: item.color,
                        width: ink.style.line_width,
                        dash: Some((5.0, 5.0)),
                    },
                ));
                out.push(Element::new(
                    format!("legend:dot:{}", item.label),
                    Layer::Legend,
                    Shape::Circle {
                        center: Point::new(x + swatch / 2.0, mid),
                        radius: 3.0,
                        fill: item.color,
                    },
                ));
            }
        }
        out.push(Element::new(
            format!("legend:text:{}", item.label),
            Layer::Legend,
            Shape::Text {
                position: Point::new(x + swatch + 8.0, y + 10.0),
                content: item.label.clone(),
                color: ink.theme.text,
                font_size: ink.style.label_font_size,
                anchor: TextAnchor::Start,
                rotation: 0.0,
                bold: false,
            },
        ));
    }
    out
}

/// Centered placeholder for charts with nothing to show.
pub fn no_data(area: &PlotArea, ink: Ink<'_>) -> Element {
    Element::new(
        "no-data",
        Layer::Placeholder,
        Shape::Text {
            position: Point::new(area.width / 2.0, area.height / 2.0),
            content: "No data available".to_string(),
            color: ink.theme.text_secondary,
            font_size: ink.style.label_font_size,
            anchor: TextAnchor::Middle,
            rotation: 0.0,
            bold: false,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink_parts() -> (ChartTheme, ChartStyle) {
        (ChartTheme::light(), ChartStyle::default())
    }

    #[test]
    fn test_plot_area_insets() {
        let area = PlotArea::new(400.0, 300.0, Margin::default());
        assert_eq!(area.inner_width(), 340.0);
        assert_eq!(area.inner_height(), 250.0);
        assert_eq!(area.y_range(), (270.0, 20.0));

        let tiny = PlotArea::new(10.0, 10.0, Margin::default());
        assert_eq!(tiny.inner_width(), 0.0);
    }

    #[test]
    fn test_band_axis_has_one_tick_and_label_per_band() {
        let (theme, style) = ink_parts();
        let ink = Ink { theme: &theme, style: &style };
        let area = PlotArea::new(400.0, 300.0, Margin::default());
        let domain = vec!["2025-05-01".to_string(), "2025-05-02".to_string()];
        let scale = BandScale::new(domain, area.x_range(), 0.1);
        let labels = vec!["May 1".to_string(), "May 2".to_string()];

        let elements = band_axis(&area, &scale, &labels, ink);
        assert_eq!(elements.len(), 5);
        let label = elements
            .iter()
            .find(|e| e.key == "x-axis:label:2025-05-02")
            .map(|e| e.shape.clone());
        assert!(matches!(
            label,
            Some(Shape::Text { ref content, rotation, anchor: TextAnchor::End, .. })
                if content == "May 2" && rotation == -45.0
        ));
    }

    #[test]
    fn test_value_axis_right_side_formats_percent() {
        let (theme, style) = ink_parts();
        let ink = Ink { theme: &theme, style: &style };
        let area = PlotArea::new(400.0, 300.0, Margin::default());
        let scale = LinearScale::new((0.0, 100.0), area.y_range());

        let elements = value_axis(&area, &scale, Side::Right, |v| format!("{}%", v), ink);
        let labels: Vec<String> = elements
            .iter()
            .filter_map(|e| match &e.shape {
                Shape::Text { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["0%", "20%", "40%", "60%", "80%", "100%"]);
        assert!(elements.iter().all(|e| e.key.starts_with("y2-axis:")));
    }

    #[test]
    fn test_legend_row_positions() {
        let (theme, style) = ink_parts();
        let ink = Ink { theme: &theme, style: &style };
        let area = PlotArea::new(400.0, 300.0, Margin::default());
        let items = vec![
            LegendItem::swatch("Bugs", Color::rgb(1, 2, 3)),
            LegendItem::swatch("Coverage", Color::rgb(4, 5, 6)),
            LegendItem {
                label: "Velocity".to_string(),
                color: Color::rgb(7, 8, 9),
                mark: LegendMark::DashedLine,
            },
        ];
        let elements = legend(&area, &items, ink);
        assert_eq!(elements.len(), 7);
        assert!(matches!(
            elements[4].shape,
            Shape::Path { dash: Some((5.0, 5.0)), .. }
        ));
        match &elements[2].shape {
            Shape::Rect { rect, fill, .. } => {
                assert_eq!(rect.x, 160.0);
                assert_eq!(rect.y, 310.0);
                assert_eq!(*fill, Color::rgb(4, 5, 6));
            }
            other => panic!("expected swatch, got {:?}", other),
        }
    }
}
