use super::Vec2;

/// 2D affine transform.
///
/// Maps `p` to `(a*x + c*y + tx, b*x + d*y + ty)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Affine2 {
    pub const IDENTITY: Affine2 = Affine2 { a: 1.0, b: 0.0, c: 0.0, d: 1.0, tx: 0.0, ty: 0.0 };

    #[inline]
    pub const fn translation(t: Vec2) -> Self {
        Self { tx: t.x, ty: t.y, ..Self::IDENTITY }
    }

    /// Scale, then rotate (radians, clockwise on screen since +Y is down), then translate.
    pub fn from_trs(translation: Vec2, rotation: f32, scale: Vec2) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self {
            a: cos * scale.x,
            b: sin * scale.x,
            c: -sin * scale.y,
            d: cos * scale.y,
            tx: translation.x,
            ty: translation.y,
        }
    }

    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Returns `self ∘ inner`: `inner` is applied first.
    pub fn then_after(&self, inner: &Affine2) -> Affine2 {
        Affine2 {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            tx: self.a * inner.tx + self.c * inner.ty + self.tx,
            ty: self.b * inner.tx + self.d * inner.ty + self.ty,
        }
    }

    /// Row-major rows padded to `vec4` for uniform upload.
    #[inline]
    pub fn to_rows(&self) -> [[f32; 4]; 2] {
        [[self.a, self.c, self.tx, 0.0], [self.b, self.d, self.ty, 0.0]]
    }
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5
    }

    #[test]
    fn identity_keeps_points() {
        let p = Vec2::new(3.0, -4.0);
        assert_eq!(Affine2::IDENTITY.transform_point(p), p);
    }

    #[test]
    fn trs_scales_before_rotating() {
        let t = Affine2::from_trs(Vec2::new(10.0, 0.0), core::f32::consts::FRAC_PI_2, Vec2::splat(2.0));
        // (1, 0) → scale (2, 0) → rotate 90° (0, 2) → translate (10, 2)
        assert!(close(t.transform_point(Vec2::new(1.0, 0.0)), Vec2::new(10.0, 2.0)));
    }

    #[test]
    fn composition_applies_inner_first() {
        let outer = Affine2::translation(Vec2::new(5.0, 5.0));
        let inner = Affine2::from_trs(Vec2::zero(), 0.0, Vec2::splat(3.0));
        let both = outer.then_after(&inner);
        assert!(close(both.transform_point(Vec2::new(1.0, 1.0)), Vec2::new(8.0, 8.0)));
    }
}
