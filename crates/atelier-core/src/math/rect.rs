use super::transform::Transform;
use super::vector::Vector2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle. `width`/`height` are never negative once built
/// through `from_points`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
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

    /// Smallest rect containing every point. Empty input yields `None`.
    pub fn from_points(points: &[Vector2]) -> Option<Rect> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn corners(&self) -> [Vector2; 4] {
        [
            Vector2::new(self.x, self.y),
            Vector2::new(self.right(), self.y),
            Vector2::new(self.right(), self.bottom()),
            Vector2::new(self.x, self.bottom()),
        ]
    }

    /// Union bounding box. Empty input yields `None`.
    pub fn union(rects: &[Rect]) -> Option<Rect> {
        let first = rects.first()?;
        let mut out = *first;
        for r in &rects[1..] {
            let x = out.x.min(r.x);
            let y = out.y.min(r.y);
            let right = out.right().max(r.right());
            let bottom = out.bottom().max(r.bottom());
            out = Rect::new(x, y, right - x, bottom - y);
        }
        Some(out)
    }

    /// Overlapping area, or `None` when the rects don't touch.
    /// Edge contact produces a zero-area rect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < x || bottom < y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Inclusive overlap test.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Boundary-inclusive point containment.
    pub fn contains_point(&self, p: Vector2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// `other` lies fully inside `self` (boundary inclusive).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn translate(&self, delta: Vector2) -> Rect {
        Rect::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    pub fn inset(&self, amount: f64) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            (self.width - amount * 2.0).max(0.0),
            (self.height - amount * 2.0).max(0.0),
        )
    }

    /// Axis-aligned bounds of the transformed rect.
    pub fn transform(&self, t: &Transform) -> Rect {
        let corners = self.corners().map(|c| t.apply(c));
        // four corners: from_points can't see an empty slice
        Rect::from_points(&corners).unwrap_or(*self)
    }

    /// Offset from `self`'s origin to `other`'s origin.
    pub fn delta_to(&self, other: &Rect) -> Vector2 {
        other.origin() - self.origin()
    }

    /// Same size within `tolerance` on both axes.
    pub fn same_size(&self, other: &Rect, tolerance: f64) -> bool {
        (self.width - other.width).abs() < tolerance && (self.height - other.height).abs() < tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_of_two() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 10.0, 5.0);
        assert_eq!(Rect::union(&[a, b]), Some(Rect::new(0.0, -5.0, 15.0, 15.0)));
        assert_eq!(Rect::union(&[]), None);
    }

    #[test]
    fn intersection_and_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));

        let touching = Rect::new(10.0, 0.0, 5.0, 5.0);
        assert!(a.intersects(&touching));
        assert_eq!(a.intersection(&touching).map(|r| r.width), Some(0.0));

        let apart = Rect::new(20.0, 20.0, 1.0, 1.0);
        assert!(!a.intersects(&apart));
        assert_eq!(a.intersection(&apart), None);
    }

    #[test]
    fn containment_is_boundary_inclusive() {
        let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(outer.contains_rect(&outer));
        assert!(outer.contains_point(Vector2::new(10.0, 0.0)));
        assert!(!outer.contains_rect(&Rect::new(1.0, 1.0, 10.0, 1.0)));
    }

    #[test]
    fn from_points_normalizes() {
        let r = Rect::from_points(&[Vector2::new(5.0, 5.0), Vector2::new(-1.0, 2.0)]);
        assert_eq!(r, Some(Rect::new(-1.0, 2.0, 6.0, 3.0)));
    }

    #[test]
    fn transform_rotated_bounds() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).transform(&Transform::rotate(90.0));
        assert!((r.x + 10.0).abs() < 1e-9);
        assert!((r.width - 10.0).abs() < 1e-9);
    }
}
