//! SVG elliptical arc → cubic Bézier conversion.
//!
//! Follows the endpoint-to-center parameterization of the SVG 1.1
//! implementation notes. Arcs spanning more than 120° are split so each
//! emitted cubic stays a close approximation.

use super::vector::Vector2;
use std::f64::consts::PI;

const MAX_SEGMENT_SWEEP: f64 = PI * 120.0 / 180.0;

/// Convert the arc from `(x1, y1)` to `(x2, y2)` into cubic segments.
///
/// `angle` is the x-axis rotation in degrees. The output is a flat list of
/// `[c1x, c1y, c2x, c2y, x, y]` groups, one group per cubic; the start point
/// is implied. A zero radius degenerates to a single straight cubic
/// `[x1, y1, x2, y2, x2, y2]`. Coincident endpoints produce no segment.
#[allow(clippy::too_many_arguments)]
pub fn a2c(
    x1: f64,
    y1: f64,
    rx: f64,
    ry: f64,
    angle: f64,
    large_arc: bool,
    sweep: bool,
    x2: f64,
    y2: f64,
) -> Vec<f64> {
    if rx == 0.0 || ry == 0.0 || !rx.is_finite() || !ry.is_finite() {
        return vec![x1, y1, x2, y2, x2, y2];
    }
    if x1 == x2 && y1 == y2 {
        return Vec::new();
    }

    let rad = if angle.is_finite() { angle.to_radians() } else { 0.0 };
    let p1 = Vector2::new(x1, y1).rotate(-rad);
    let p2 = Vector2::new(x2, y2).rotate(-rad);

    let (mut rx, mut ry) = (rx.abs(), ry.abs());
    let hx = (p1.x - p2.x) / 2.0;
    let hy = (p1.y - p2.y) / 2.0;
    let h = (hx * hx) / (rx * rx) + (hy * hy) / (ry * ry);
    if h > 1.0 {
        let h = h.sqrt();
        rx *= h;
        ry *= h;
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let k = sign
        * ((rx2 * ry2 - rx2 * hy * hy - ry2 * hx * hx) / (rx2 * hy * hy + ry2 * hx * hx))
            .abs()
            .sqrt();
    let center = Vector2::new(
        k * rx * hy / ry + (p1.x + p2.x) / 2.0,
        k * -ry * hx / rx + (p1.y + p2.y) / 2.0,
    );

    let mut f1 = start_angle(p1, center, ry);
    let mut f2 = start_angle(p2, center, ry);
    if sweep && f1 > f2 {
        f1 -= PI * 2.0;
    }
    if !sweep && f2 > f1 {
        f2 -= PI * 2.0;
    }

    let arc = EllipseArc { rx, ry, center, sweep };
    arc.cubics(p1, p2, f1, f2)
        .into_iter()
        .flat_map(|p| {
            let p = p.rotate(rad);
            [p.x, p.y]
        })
        .collect()
}

/// Polar angle of `p` on the ellipse, in `[0, 2π)`.
fn start_angle(p: Vector2, center: Vector2, ry: f64) -> f64 {
    // rounded to 9 places so points that sit exactly on the axis don't drift past ±1
    let ratio = (((p.y - center.y) / ry) * 1e9).round() / 1e9;
    let mut f = ratio.clamp(-1.0, 1.0).asin();
    if p.x < center.x {
        f = PI - f;
    }
    if f < 0.0 {
        f += PI * 2.0;
    }
    f
}

struct EllipseArc {
    rx: f64,
    ry: f64,
    center: Vector2,
    sweep: bool,
}

impl EllipseArc {
    fn point_at(&self, f: f64) -> Vector2 {
        Vector2::new(
            self.center.x + self.rx * f.cos(),
            self.center.y + self.ry * f.sin(),
        )
    }

    /// Control/end points `[c1, c2, end]*` from `start` (angle `f1`) to
    /// `end` (angle `f2`), in the unrotated frame.
    fn cubics(&self, start: Vector2, end: Vector2, f1: f64, f2: f64) -> Vec<Vector2> {
        let (mut end, mut f2) = (end, f2);
        let mut rest = Vec::new();
        if (f2 - f1).abs() > MAX_SEGMENT_SWEEP {
            let (f2_old, end_old) = (f2, end);
            let dir = if self.sweep && f2 > f1 { 1.0 } else { -1.0 };
            f2 = f1 + MAX_SEGMENT_SWEEP * dir;
            end = self.point_at(f2);
            rest = self.cubics(end, end_old, f2, f2_old);
        }

        let df = f2 - f1;
        let (s1, c1) = f1.sin_cos();
        let (s2, c2) = f2.sin_cos();
        let t = (df / 4.0).tan();
        let hx = 4.0 / 3.0 * self.rx * t;
        let hy = 4.0 / 3.0 * self.ry * t;

        let c1 = Vector2::new(start.x - hx * s1, start.y + hy * c1);
        let c2 = Vector2::new(end.x + hx * s2, end.y - hy * c2);

        let mut out = Vec::with_capacity(3 + rest.len());
        out.extend([c1, c2, end]);
        out.extend(rest);
        out
    }
}
