use super::vector::Vector2;
use serde::{Deserialize, Serialize};

/// A 2×3 affine matrix `[[a, c, tx], [b, d, ty]]`.
///
/// Applied to a point as `x' = a·x + c·y + tx`, `y' = b·x + d·y + ty`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform(pub [[f64; 3]; 2]);

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);

    pub const fn translate(tx: f64, ty: f64) -> Self {
        Transform([[1.0, 0.0, tx], [0.0, 1.0, ty]])
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        Transform([[sx, 0.0, 0.0], [0.0, sy, 0.0]])
    }

    pub const fn shear(kx: f64, ky: f64) -> Self {
        Transform([[1.0, kx, 0.0], [ky, 1.0, 0.0]])
    }

    /// Rotation about the origin, in degrees.
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Transform([[cos, -sin, 0.0], [sin, cos, 0.0]])
    }

    /// `self * other`: `other` is applied first.
    pub fn multiply(&self, other: &Transform) -> Transform {
        let [[a0, a1, a2], [a3, a4, a5]] = self.0;
        let [[b0, b1, b2], [b3, b4, b5]] = other.0;
        Transform([
            [a0 * b0 + a1 * b3, a0 * b1 + a1 * b4, a0 * b2 + a1 * b5 + a2],
            [a3 * b0 + a4 * b3, a3 * b1 + a4 * b4, a3 * b2 + a4 * b5 + a5],
        ])
    }

    pub fn apply(&self, p: Vector2) -> Vector2 {
        let [[a, c, tx], [b, d, ty]] = self.0;
        Vector2::new(a * p.x + c * p.y + tx, b * p.x + d * p.y + ty)
    }

    /// Apply only the linear part (no translation). Used for offsets.
    pub fn apply_vector(&self, v: Vector2) -> Vector2 {
        let [[a, c, _], [b, d, _]] = self.0;
        Vector2::new(a * v.x + c * v.y, b * v.x + d * v.y)
    }

    pub fn determinant(&self) -> f64 {
        let [[a, c, _], [b, d, _]] = self.0;
        a * d - b * c
    }

    /// Inverse transform. A singular matrix has no inverse; the identity
    /// is returned in that case.
    pub fn invert(&self) -> Transform {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            log::warn!("attempted to invert a singular transform {self:?}");
            return Transform::IDENTITY;
        }
        let [[a, c, tx], [b, d, ty]] = self.0;
        let inv = 1.0 / det;
        Transform([
            [d * inv, -c * inv, (c * ty - d * tx) * inv],
            [-b * inv, a * inv, (b * tx - a * ty) * inv],
        ])
    }

    pub fn translation(&self) -> Vector2 {
        Vector2::new(self.0[0][2], self.0[1][2])
    }

    pub fn is_identity(&self) -> bool {
        *self == Transform::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vector2, b: Vector2) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn compose_translate_then_scale() {
        // scale applied after translate
        let t = Transform::scale(2.0, 2.0).multiply(&Transform::translate(5.0, 0.0));
        assert_eq!(t.apply(Vector2::new(1.0, 1.0)), Vector2::new(12.0, 2.0));
    }

    #[test]
    fn rotate_ninety() {
        let p = Transform::rotate(90.0).apply(Vector2::new(1.0, 0.0));
        assert!(approx(p, Vector2::new(0.0, 1.0)));
    }

    #[test]
    fn invert_roundtrip() {
        let t = Transform::translate(10.0, -4.0)
            .multiply(&Transform::rotate(30.0))
            .multiply(&Transform::scale(2.0, 0.5));
        let p = Vector2::new(3.0, 7.0);
        let back = t.invert().apply(t.apply(p));
        assert!(approx(back, p));
        let id = t.multiply(&t.invert());
        for (a, b) in id.0.iter().flatten().zip(Transform::IDENTITY.0.iter().flatten()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn singular_inverts_to_identity() {
        assert_eq!(Transform::scale(0.0, 1.0).invert(), Transform::IDENTITY);
    }

    #[test]
    fn shear_moves_x_by_y() {
        let p = Transform::shear(1.0, 0.0).apply(Vector2::new(0.0, 2.0));
        assert_eq!(p, Vector2::new(2.0, 2.0));
    }
}
