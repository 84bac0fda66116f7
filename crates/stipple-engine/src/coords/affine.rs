use core::ops::{Mul, MulAssign};

use super::Vec2;

/// 2D affine transform.
///
/// Coefficients `[a, b, c, d, e, f]` map a point as
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
///
/// Composition follows function notation: `(lhs * rhs)` applies `rhs` first.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine(pub [f32; 6]);

impl Affine {
    pub const IDENTITY: Affine = Affine([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    #[inline]
    pub const fn new(coeffs: [f32; 6]) -> Self {
        Self(coeffs)
    }

    #[inline]
    pub const fn translate(offset: Vec2) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, offset.x, offset.y])
    }

    #[inline]
    pub const fn scale(s: f32) -> Self {
        Self([s, 0.0, 0.0, s, 0.0, 0.0])
    }

    #[inline]
    pub const fn scale_non_uniform(sx: f32, sy: f32) -> Self {
        Self([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// Rotation by `radians` (clockwise on screen, since +Y points down).
    #[inline]
    pub fn rotate(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self([c, s, -s, c, 0.0, 0.0])
    }

    /// Rotation/scale about `pivot`, then translation to `position`.
    ///
    /// Equivalent to `translate(position) * rotate(r) * scale(s) * translate(-pivot)`.
    pub fn from_parts(position: Vec2, pivot: Vec2, scale: Vec2, radians: f32) -> Self {
        Affine::translate(position)
            * Affine::rotate(radians)
            * Affine::scale_non_uniform(scale.x, scale.y)
            * Affine::translate(-pivot)
    }

    #[inline]
    pub const fn coeffs(self) -> [f32; 6] {
        self.0
    }

    #[inline]
    pub fn transform_point(self, p: Vec2) -> Vec2 {
        let [a, b, c, d, e, f] = self.0;
        Vec2::new(a * p.x + c * p.y + e, b * p.x + d * p.y + f)
    }

    #[inline]
    pub fn is_identity(self) -> bool {
        self == Affine::IDENTITY
    }

    #[inline]
    pub fn determinant(self) -> f32 {
        let [a, b, c, d, _, _] = self.0;
        a * d - b * c
    }

    /// Inverse transform, or `None` if the matrix is singular.
    pub fn inverse(self) -> Option<Affine> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let [a, b, c, d, e, f] = self.0;
        let inv = 1.0 / det;
        Some(Affine([
            d * inv,
            -b * inv,
            -c * inv,
            a * inv,
            (c * f - d * e) * inv,
            (b * e - a * f) * inv,
        ]))
    }
}

impl Default for Affine {
    #[inline]
    fn default() -> Self {
        Affine::IDENTITY
    }
}

impl Mul for Affine {
    type Output = Affine;

    #[inline]
    fn mul(self, rhs: Affine) -> Affine {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = rhs.0;
        Affine([
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * e2 + c1 * f2 + e1,
            b1 * e2 + d1 * f2 + f1,
        ])
    }
}

impl MulAssign for Affine {
    #[inline]
    fn mul_assign(&mut self, rhs: Affine) {
        *self = *self * rhs;
    }
}

impl Mul<Vec2> for Affine {
    type Output = Vec2;

    #[inline]
    fn mul(self, rhs: Vec2) -> Vec2 {
        self.transform_point(rhs)
    }
}
