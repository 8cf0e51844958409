//! Cubic Bézier toolkit.
//!
//! Curves are described the way the vector network stores them: two
//! endpoints `a`/`b` and *tangent offsets* `ta`/`tb`, so the control
//! points are `a + ta` and `b + tb`.
//!
//! Every function here is total: parameters are clamped and degenerate
//! curves fall back to numeric searches instead of failing.

use super::rect::Rect;
use super::vector::Vector2;
use serde::{Deserialize, Serialize};

/// Distance under which a point counts as already lying on the curve.
pub const ON_CURVE_TOLERANCE: f64 = 0.1;

const PROJECTION_SAMPLES: usize = 64;
const PROJECTION_ITERATIONS: usize = 80;
const SUBDIVISION_DEPTH: u32 = 24;

/// One cubic segment in endpoint + tangent-offset form.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CubicSegment {
    pub a: Vector2,
    pub b: Vector2,
    pub ta: Vector2,
    pub tb: Vector2,
}

impl CubicSegment {
    pub const fn new(a: Vector2, b: Vector2, ta: Vector2, tb: Vector2) -> Self {
        Self { a, b, ta, tb }
    }

    /// Absolute control polygon `[p0, p1, p2, p3]`.
    pub fn control_points(&self) -> [Vector2; 4] {
        [self.a, self.a + self.ta, self.b + self.tb, self.b]
    }

    fn from_control_points([p0, p1, p2, p3]: [Vector2; 4]) -> Self {
        Self::new(p0, p3, p1 - p0, p2 - p3)
    }

    pub fn evaluate(&self, t: f64) -> Vector2 {
        evaluate(self.a, self.b, self.ta, self.tb, t)
    }

    pub fn bbox(&self) -> Rect {
        get_bbox(self)
    }

    /// Split at `t` into the `[0, t]` and `[t, 1]` halves.
    pub fn split_at(&self, t: f64) -> (CubicSegment, CubicSegment) {
        let t = clamp_t(t);
        let [p0, p1, p2, p3] = self.control_points();
        let p01 = p0.lerp(p1, t);
        let p12 = p1.lerp(p2, t);
        let p23 = p2.lerp(p3, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let mid = p012.lerp(p123, t);
        (
            CubicSegment::from_control_points([p0, p01, p012, mid]),
            CubicSegment::from_control_points([mid, p123, p23, p3]),
        )
    }
}

/// Clamp a curve parameter into `[0, 1]`. NaN and −∞ map to 0, +∞ to 1.
pub fn clamp_t(t: f64) -> f64 {
    if t.is_nan() {
        return 0.0;
    }
    t.clamp(0.0, 1.0)
}

/// De Casteljau evaluation of the cubic.
///
/// Zero tangents still give the cubic (not the linear) interpolation:
/// it only meets `a.lerp(b, t)` at `t ∈ {0, 0.5, 1}`.
pub fn evaluate(a: Vector2, b: Vector2, ta: Vector2, tb: Vector2, t: f64) -> Vector2 {
    let t = clamp_t(t);
    if t == 0.0 {
        return a;
    }
    if t == 1.0 {
        return b;
    }
    let (p0, p1, p2, p3) = (a, a + ta, b + tb, b);
    let p01 = p0.lerp(p1, t);
    let p12 = p1.lerp(p2, t);
    let p23 = p2.lerp(p3, t);
    let p012 = p01.lerp(p12, t);
    let p123 = p12.lerp(p23, t);
    p012.lerp(p123, t)
}

/// First derivative `B'(t)`.
pub fn tangent_at(a: Vector2, b: Vector2, ta: Vector2, tb: Vector2, t: f64) -> Vector2 {
    let t = clamp_t(t);
    let s = 1.0 - t;
    let (p0, p1, p2, p3) = (a, a + ta, b + tb, b);
    (p1 - p0) * (3.0 * s * s) + (p2 - p1) * (6.0 * s * t) + (p3 - p2) * (3.0 * t * t)
}

/// Exact axis-aligned bounds, from the roots of the derivative.
pub fn get_bbox(segment: &CubicSegment) -> Rect {
    let [p0, p1, p2, p3] = segment.control_points();
    let mut points = vec![p0, p3];
    for t in extrema(p0.x, p1.x, p2.x, p3.x)
        .into_iter()
        .chain(extrema(p0.y, p1.y, p2.y, p3.y))
    {
        points.push(segment.evaluate(t));
    }
    // always at least the two endpoints
    Rect::from_points(&points).unwrap_or_default()
}

/// Parameters in `(0, 1)` where one coordinate of the cubic has a local extremum.
fn extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> Vec<f64> {
    // B'(t) / 3 = a·t² + b·t + c
    let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
    let b = 2.0 * (p0 - 2.0 * p1 + p2);
    let c = p1 - p0;
    let mut roots = Vec::with_capacity(2);
    if a.abs() < 1e-12 {
        if b.abs() > 1e-12 {
            roots.push(-c / b);
        }
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let sq = disc.sqrt();
            roots.push((-b + sq) / (2.0 * a));
            roots.push((-b - sq) / (2.0 * a));
        }
    }
    roots.retain(|t| *t > 0.0 && *t < 1.0);
    roots
}

/// The parameter of the curve point closest to `point`.
///
/// Coarse uniform sampling picks a bracket, then a golden-section search
/// refines inside it. Works the same for near-linear and degenerate curves.
pub fn project_parametric(
    a: Vector2,
    b: Vector2,
    ta: Vector2,
    tb: Vector2,
    point: Vector2,
) -> f64 {
    let dist2 = |t: f64| {
        let p = evaluate(a, b, ta, tb, t);
        let d = p - point;
        d.dot(d)
    };

    let step = 1.0 / PROJECTION_SAMPLES as f64;
    let mut best_i = 0;
    let mut best_d = f64::INFINITY;
    for i in 0..=PROJECTION_SAMPLES {
        let d = dist2(i as f64 * step);
        if d < best_d {
            best_d = d;
            best_i = i;
        }
    }

    let mut lo = (best_i as f64 - 1.0).max(0.0) * step;
    let mut hi = (best_i as f64 + 1.0).min(PROJECTION_SAMPLES as f64) * step;
    let (bracket_lo, bracket_hi) = (lo, hi);

    let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
    let mut x1 = hi - ratio * (hi - lo);
    let mut x2 = lo + ratio * (hi - lo);
    let mut f1 = dist2(x1);
    let mut f2 = dist2(x2);
    for _ in 0..PROJECTION_ITERATIONS {
        if f1 < f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - ratio * (hi - lo);
            f1 = dist2(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + ratio * (hi - lo);
            f2 = dist2(x2);
        }
    }
    let refined = (lo + hi) / 2.0;

    // bracket ends first so an endpoint wins ties
    let mut t = bracket_lo;
    let mut d = dist2(bracket_lo);
    for candidate in [bracket_hi, refined] {
        let dc = dist2(candidate);
        if dc < d {
            d = dc;
            t = candidate;
        }
    }
    clamp_t(t)
}

/// Adjust `ta`/`tb` as little as possible so that `B(t) == target`.
///
/// `B(t)` is linear in the tangents with weights `wa = 3(1-t)²t` and
/// `wb = 3(1-t)t²`; the minimal-norm correction distributes the error
/// along those weights. Targets already within [`ON_CURVE_TOLERANCE`]
/// and the pinned endpoints `t = 0`/`t = 1` leave the tangents untouched.
pub fn solve_tangents_for_point(
    a: Vector2,
    b: Vector2,
    ta: Vector2,
    tb: Vector2,
    t: f64,
    target: Vector2,
) -> (Vector2, Vector2) {
    let t = clamp_t(t);
    let current = evaluate(a, b, ta, tb, t);
    let error = target - current;
    if error.length() < ON_CURVE_TOLERANCE {
        return (ta, tb);
    }

    let s = 1.0 - t;
    let wa = 3.0 * s * s * t;
    let wb = 3.0 * s * t * t;
    let norm = wa * wa + wb * wb;
    if norm < 1e-12 {
        return (ta, tb);
    }
    (ta + error * (wa / norm), tb + error * (wb / norm))
}

/// Whether any part of the curve touches `rect`.
///
/// Uses the exact curve, so a curve whose bounds overlap the rect while
/// the stroke itself passes around it is reported as missing.
pub fn intersects_rect(a: Vector2, b: Vector2, ta: Vector2, tb: Vector2, rect: &Rect) -> bool {
    if rect.contains_point(a) || rect.contains_point(b) {
        return true;
    }
    subdivide_intersects(&CubicSegment::new(a, b, ta, tb), rect, 0)
}

fn subdivide_intersects(segment: &CubicSegment, rect: &Rect, depth: u32) -> bool {
    let bbox = segment.bbox();
    if !rect.intersects(&bbox) {
        return false;
    }
    if rect.contains_rect(&bbox) || depth >= SUBDIVISION_DEPTH {
        return true;
    }
    if rect.contains_point(segment.evaluate(0.5)) {
        return true;
    }
    let (left, right) = segment.split_at(0.5);
    subdivide_intersects(&left, rect, depth + 1) || subdivide_intersects(&right, rect, depth + 1)
}

/// Whether the whole curve lies inside `rect` (boundary inclusive).
///
/// Control points may sit outside the rect as long as the curve doesn't.
pub fn contained_by_rect(a: Vector2, b: Vector2, ta: Vector2, tb: Vector2, rect: &Rect) -> bool {
    rect.contains_rect(&CubicSegment::new(a, b, ta, tb).bbox())
}
