//! Retained drawing primitives.
//!
//! A chart render produces a [`Scene`]: a flat list of keyed [`Element`]s in
//! paint order. Keys are stable across renders, so consecutive scenes can be
//! reconciled into a [`SceneDiff`] and nothing drawn by an earlier pass
//! survives unless the current data still produces it.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::curve::{flatten, monotone_x};
use super::styles::Color;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Curve {
    Linear,
    MonotoneX,
}

/// Stroke dash pattern as `(dash, gap)` lengths.
pub type Dash = (f64, f64);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Rect {
        rect: Rect,
        fill: Color,
        opacity: f64,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Color,
        width: f64,
    },
    Path {
        points: Vec<Point>,
        curve: Curve,
        stroke: Color,
        width: f64,
        dash: Option<Dash>,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Color,
    },
    Text {
        position: Point,
        content: String,
        color: Color,
        font_size: f64,
        anchor: TextAnchor,
        /// Degrees, clockwise.
        rotation: f64,
        bold: bool,
    },
}

impl Shape {
    /// Whether `p` lies on the shape's interactive area.
    pub fn hit(&self, p: Point) -> bool {
        match self {
            Shape::Rect { rect, .. } => rect.contains(p),
            Shape::Circle { center, radius, .. } => {
                let (dx, dy) = (p.x - center.x, p.y - center.y);
                dx * dx + dy * dy <= radius * radius
            }
            _ => false,
        }
    }

    /// Polyline approximation of a path, curves flattened.
    pub fn polyline(&self) -> Option<Vec<Point>> {
        match self {
            Shape::Path {
                points,
                curve: Curve::MonotoneX,
                ..
            } if points.len() > 2 => Some(flatten(&monotone_x(points), 12)),
            Shape::Path { points, .. } => Some(points.clone()),
            _ => None,
        }
    }
}

/// Label/value rows shown when hovering an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tooltip {
    pub rows: Vec<(String, String)>,
}

impl Tooltip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, label: &str, value: impl Into<String>) -> Self {
        self.rows.push((label.to_string(), value.into()));
        self
    }

    /// `Label: value` lines joined by newlines.
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Group an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Layer {
    Axis,
    Bar,
    Line,
    Marker,
    Label,
    Legend,
    Summary,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub key: String,
    pub layer: Layer,
    pub shape: Shape,
    pub tooltip: Option<Tooltip>,
}

impl Element {
    pub fn new(key: impl Into<String>, layer: Layer, shape: Shape) -> Self {
        Self {
            key: key.into(),
            layer,
            shape,
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: Tooltip) -> Self {
        self.tooltip = Some(tooltip);
        self
    }
}

/// Whether the last render had data to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderStatus {
    #[default]
    Drawn,
    NoData,
}

/// Everything a chart currently draws.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub background: Option<Color>,
    pub status: RenderStatus,
    pub elements: Vec<Element>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.key == key)
    }

    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |e| e.layer == layer)
    }

    /// Tooltip of the topmost element under `p`.
    pub fn tooltip_at(&self, p: Point) -> Option<&Tooltip> {
        self.elements
            .iter()
            .rev()
            .filter(|e| e.shape.hit(p))
            .find_map(|e| e.tooltip.as_ref())
    }

    /// Changes needed to turn `self` into `next`.
    pub fn diff(&self, next: &Scene) -> SceneDiff {
        let previous: HashMap<&str, &Element> =
            self.elements.iter().map(|e| (e.key.as_str(), e)).collect();
        let mut diff = SceneDiff::default();

        for element in &next.elements {
            match previous.get(element.key.as_str()) {
                None => diff.added.push(element.key.clone()),
                Some(old) if *old != element => diff.updated.push(element.key.clone()),
                Some(_) => diff.unchanged += 1,
            }
        }

        let current: HashSet<&str> = next.elements.iter().map(|e| e.key.as_str()).collect();
        diff.removed = self
            .elements
            .iter()
            .filter(|e| !current.contains(e.key.as_str()))
            .map(|e| e.key.clone())
            .collect();
        diff
    }
}

/// Result of reconciling two scenes by element key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneDiff {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    pub unchanged: usize,
}

impl SceneDiff {
    /// True when the two scenes draw exactly the same thing.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bar(key: &str, x: f64, height: f64) -> Element {
        Element::new(
            key,
            Layer::Bar,
            Shape::Rect {
                rect: Rect::new(x, 100.0 - height, 10.0, height),
                fill: Color::rgb(0, 0, 0),
                opacity: 1.0,
            },
        )
    }

    fn scene(elements: Vec<Element>) -> Scene {
        Scene {
            elements,
            ..Scene::new(200.0, 100.0)
        }
    }

    #[test]
    fn test_diff_classifies_elements() {
        let before = scene(vec![bar("a", 0.0, 10.0), bar("b", 20.0, 10.0), bar("c", 40.0, 5.0)]);
        let after = scene(vec![bar("a", 0.0, 10.0), bar("b", 20.0, 30.0), bar("d", 60.0, 5.0)]);

        let diff = before.diff(&after);
        assert_eq!(diff.added, vec!["d".to_string()]);
        assert_eq!(diff.updated, vec!["b".to_string()]);
        assert_eq!(diff.removed, vec!["c".to_string()]);
        assert_eq!(diff.unchanged, 1);
        assert!(after.diff(&after).is_empty());
    }

    #[test]
    fn test_tooltip_hit_prefers_topmost() {
        let under = bar("under", 0.0, 50.0).with_tooltip(Tooltip::new().row("Layer", "under"));
        let over = Element::new(
            "over",
            Layer::Marker,
            Shape::Circle {
                center: Point::new(5.0, 80.0),
                radius: 4.0,
                fill: Color::rgb(1, 1, 1),
            },
        )
        .with_tooltip(Tooltip::new().row("Layer", "over"));
        let s = scene(vec![under, over]);

        assert_eq!(s.tooltip_at(Point::new(5.0, 81.0)).map(Tooltip::text), Some("Layer: over".into()));
        assert_eq!(s.tooltip_at(Point::new(2.0, 60.0)).map(Tooltip::text), Some("Layer: under".into()));
        assert!(s.tooltip_at(Point::new(150.0, 10.0)).is_none());
    }

    #[test]
    fn test_tooltip_text_joins_rows() {
        let tip = Tooltip::new().row("Date", "5/1/2025").row("Commits", "3");
        assert_eq!(tip.text(), "Date: 5/1/2025\nCommits: 3");
    }

    #[test]
    fn test_monotone_path_is_flattened() {
        let path = Shape::Path {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0), Point::new(20.0, 0.0)],
            curve: Curve::MonotoneX,
            stroke: Color::rgb(0, 0, 0),
            width: 2.0,
            dash: None,
        };
        let line = path.polyline().unwrap_or_default();
        assert_eq!(line.len(), 25);
        assert_eq!(line.first(), Some(&Point::new(0.0, 0.0)));
        assert_eq!(line.last(), Some(&Point::new(20.0, 0.0)));
    }
}
