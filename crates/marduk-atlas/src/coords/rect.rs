use super::Vec2;

/// Axis-aligned rectangle (top-left origin).
///
/// Sprites use it for their source region inside the atlas texture, in texels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }

    /// Maps a texel rect to normalized `(uv_min, uv_max)` for a texture of `texture_size`.
    ///
    /// A zero texture dimension yields zero UVs on that axis instead of NaN.
    pub fn uv_bounds(self, texture_size: (u32, u32)) -> ([f32; 2], [f32; 2]) {
        let r = self.normalized();
        let tw = texture_size.0 as f32;
        let th = texture_size.1 as f32;
        let inv_w = if tw > 0.0 { 1.0 / tw } else { 0.0 };
        let inv_h = if th > 0.0 { 1.0 / th } else { 0.0 };
        let lo = r.min();
        let hi = r.max();
        (
            [lo.x * inv_w, lo.y * inv_h],
            [hi.x * inv_w, hi.y * inv_h],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── normalized ────────────────────────────────────────────────────────

    #[test]
    fn normalized_positive_is_identity() {
        let rect = r(1.0, 2.0, 10.0, 20.0);
        assert_eq!(rect.normalized(), rect);
    }

    #[test]
    fn normalized_negative_extent() {
        let n = r(10.0, 10.0, -4.0, -3.0).normalized();
        assert_eq!(n, r(6.0, 7.0, 4.0, 3.0));
    }

    // ── is_empty ──────────────────────────────────────────────────────────

    #[test]
    fn is_empty_zero_size() {
        assert!(r(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(r(0.0, 0.0, 5.0, 0.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    // ── uv_bounds ─────────────────────────────────────────────────────────

    #[test]
    fn uv_bounds_quarter_of_texture() {
        let (lo, hi) = r(64.0, 0.0, 64.0, 32.0).uv_bounds((128, 64));
        assert_eq!(lo, [0.5, 0.0]);
        assert_eq!(hi, [1.0, 0.5]);
    }

    #[test]
    fn uv_bounds_zero_texture_is_not_nan() {
        let (lo, hi) = r(1.0, 1.0, 2.0, 2.0).uv_bounds((0, 0));
        assert_eq!(lo, [0.0, 0.0]);
        assert_eq!(hi, [0.0, 0.0]);
    }
}
