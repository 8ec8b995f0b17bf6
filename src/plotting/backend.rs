//! Draws a [`Scene`] with plotters.
//!
//! Any plotters drawing area works; SVG helpers are provided for the demo
//! and tests. Curves are flattened to polylines and dashes are cut into
//! separate segments, since the backends only draw plain paths.

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

use super::scene::{Point, Scene, Shape, TextAnchor};
use super::styles::Color as Paint;
use crate::error::{ChartError, ChartResult};

fn backend_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> ChartError {
    ChartError::Backend(e.to_string())
}

fn rgb(c: Paint) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

fn px(p: Point) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

/// Draw every element of `scene` onto `area`, background first.
pub fn draw_scene<DB: DrawingBackend>(
    scene: &Scene,
    area: &DrawingArea<DB, Shift>,
) -> ChartResult<()> {
    if let Some(background) = scene.background {
        area.fill(&rgb(background)).map_err(backend_err)?;
    }
    for element in &scene.elements {
        draw_shape(&element.shape, area)?;
    }
    Ok(())
}

fn draw_shape<DB: DrawingBackend>(shape: &Shape, area: &DrawingArea<DB, Shift>) -> ChartResult<()> {
    match shape {
        Shape::Rect {
            rect,
            fill,
            opacity,
        } => {
            let corners = [
                px(Point::new(rect.x, rect.y)),
                px(Point::new(rect.x + rect.width, rect.y + rect.height)),
            ];
            area.draw(&Rectangle::new(corners, rgb(*fill).mix(*opacity).filled()))
                .map_err(backend_err)
        }
        Shape::Line {
            from,
            to,
            stroke,
            width,
        } => area
            .draw(&PathElement::new(
                vec![px(*from), px(*to)],
                rgb(*stroke).stroke_width(stroke_px(*width)),
            ))
            .map_err(backend_err),
        Shape::Path {
            stroke,
            width,
            dash,
            ..
        } => {
            let line = shape.polyline().unwrap_or_default();
            let runs = match dash {
                Some((on, off)) => dash_segments(&line, *on, *off),
                None => vec![line],
            };
            let style = rgb(*stroke).stroke_width(stroke_px(*width));
            for run in runs.into_iter().filter(|r| r.len() > 1) {
                let points: Vec<(i32, i32)> = run.into_iter().map(px).collect();
                area.draw(&PathElement::new(points, style)).map_err(backend_err)?;
            }
            Ok(())
        }
        Shape::Circle {
            center,
            radius,
            fill,
        } => area
            .draw(&Circle::new(
                px(*center),
                radius.round().max(1.0) as u32,
                rgb(*fill).filled(),
            ))
            .map_err(backend_err),
        Shape::Text {
            position,
            content,
            color,
            font_size,
            anchor,
            rotation,
            bold,
        } => {
            let weight = if *bold {
                FontStyle::Bold
            } else {
                FontStyle::Normal
            };
            let hpos = match anchor {
                TextAnchor::Start => HPos::Left,
                TextAnchor::Middle => HPos::Center,
                TextAnchor::End => HPos::Right,
            };
            let mut style = FontDesc::new(FontFamily::SansSerif, *font_size, weight)
                .color(&rgb(*color))
                .pos(Pos::new(hpos, VPos::Bottom));
            // plotters only rotates by quarter turns; slanted labels stay level
            if *rotation <= -90.0 {
                style = style.transform(FontTransform::Rotate270);
            } else if *rotation >= 90.0 {
                style = style.transform(FontTransform::Rotate90);
            }
            area.draw(&Text::new(content.as_str(), px(*position), style))
                .map_err(backend_err)
        }
    }
}

fn stroke_px(width: f64) -> u32 {
    width.round().max(1.0) as u32
}

/// Split a polyline into the visible runs of a `(dash, gap)` pattern.
pub fn dash_segments(points: &[Point], dash: f64, gap: f64) -> Vec<Vec<Point>> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    if dash.is_nan() || dash <= 0.0 {
        return vec![points.to_vec()];
    }
    let gap = gap.max(0.0);

    let mut runs = Vec::new();
    let mut current = vec![first];
    let mut drawing = true;
    let mut remaining = dash;

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = (b.x - a.x).hypot(b.y - a.y);
        let mut travelled = 0.0;
        while length - travelled > remaining {
            travelled += remaining;
            let t = travelled / length;
            let p = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
            if drawing {
                current.push(p);
                runs.push(std::mem::take(&mut current));
            } else {
                current = vec![p];
            }
            drawing = !drawing;
            remaining = if drawing { dash } else { gap };
        }
        remaining -= length - travelled;
        if drawing {
            current.push(b);
        }
    }
    if drawing && current.len() > 1 {
        runs.push(current);
    }
    runs
}

fn pixel_size(scene: &Scene) -> (u32, u32) {
    (
        scene.width.round().max(1.0) as u32,
        scene.height.round().max(1.0) as u32,
    )
}

/// Render `scene` as an SVG document.
pub fn render_svg(scene: &Scene) -> ChartResult<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, pixel_size(scene)).into_drawing_area();
        draw_scene(scene, &root)?;
        root.present().map_err(backend_err)?;
    }
    Ok(svg)
}

/// Render `scene` into an SVG file at `path`.
pub fn save_svg(scene: &Scene, path: &Path) -> ChartResult<()> {
    let root = SVGBackend::new(path, pixel_size(scene)).into_drawing_area();
    draw_scene(scene, &root)?;
    root.present().map_err(backend_err)?;
    log::info!("wrote {}", path.display());
    Ok(())
}
