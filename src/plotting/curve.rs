//! Monotone cubic interpolation in x (Fritsch-Carlson tangents), which never
//! overshoots between data points.

use super::scene::Point;

/// One cubic Bézier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub from: Point,
    pub c1: Point,
    pub c2: Point,
    pub to: Point,
}

impl CubicSegment {
    pub fn at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Point::new(
            a * self.from.x + b * self.c1.x + c * self.c2.x + d * self.to.x,
            a * self.from.y + b * self.c1.y + c * self.c2.y + d * self.to.y,
        )
    }
}

fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn secant(a: Point, b: Point) -> f64 {
    let h = b.x - a.x;
    if h == 0.0 {
        0.0
    } else {
        (b.y - a.y) / h
    }
}

/// Tangent at `p1` from its neighbours, clamped to keep the curve monotone.
fn interior_tangent(p0: Point, p1: Point, p2: Point) -> f64 {
    let (h0, h1) = (p1.x - p0.x, p2.x - p1.x);
    let (s0, s1) = (secant(p0, p1), secant(p1, p2));
    let p = if h0 + h1 == 0.0 {
        0.0
    } else {
        (s0 * h1 + s1 * h0) / (h0 + h1)
    };
    let t = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
    if t.is_finite() {
        t
    } else {
        0.0
    }
}

/// Tangent at an end point, given the tangent at its neighbour.
fn end_tangent(a: Point, b: Point, neighbour: f64) -> f64 {
    let h = b.x - a.x;
    if h == 0.0 {
        neighbour
    } else {
        (3.0 * (b.y - a.y) / h - neighbour) / 2.0
    }
}

/// Cubic segments through `points` (assumed sorted by x).
///
/// Fewer than two points yield no segments; two points yield a straight
/// segment.
pub fn monotone_x(points: &[Point]) -> Vec<CubicSegment> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    let mut tangents = vec![0.0; n];
    if n == 2 {
        let s = secant(points[0], points[1]);
        tangents = vec![s, s];
    } else {
        for i in 1..n - 1 {
            tangents[i] = interior_tangent(points[i - 1], points[i], points[i + 1]);
        }
        tangents[0] = end_tangent(points[0], points[1], tangents[1]);
        tangents[n - 1] = end_tangent(points[n - 2], points[n - 1], tangents[n - 2]);
    }

    points
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (a, b) = (pair[0], pair[1]);
            let dx = (b.x - a.x) / 3.0;
            CubicSegment {
                from: a,
                c1: Point::new(a.x + dx, a.y + dx * tangents[i]),
                c2: Point::new(b.x - dx, b.y - dx * tangents[i + 1]),
                to: b,
            }
        })
        .collect()
}

/// Approximate `segments` by a polyline with `steps` samples per segment.
pub fn flatten(segments: &[CubicSegment], steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    let mut out = Vec::with_capacity(segments.len() * steps + 1);
    if let Some(first) = segments.first() {
        out.push(first.from);
    }
    for segment in segments {
        for s in 1..=steps {
            out.push(segment.at(s as f64 / steps as f64));
        }
    }
    out
}
