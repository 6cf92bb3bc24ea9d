/// Straight-alpha linear RGBA color.
///
/// Sprites keep their tint in straight alpha so opacity can be changed
/// independently; quads receive the premultiplied form (see [`ColorRgba::premultiplied`]).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Creates a color from straight RGBA bytes (`0`–`255`).
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Returns the color with alpha multiplied by `opacity` (clamped to `[0, 1]`).
    #[inline]
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self { a: self.a * opacity.clamp(0.0, 1.0), ..self }
    }

    /// Converts to premultiplied `[r, g, b, a]` as consumed by the atlas shader.
    #[inline]
    pub fn premultiplied(self) -> [f32; 4] {
        [self.r * self.a, self.g * self.a, self.b * self.a, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

impl Default for ColorRgba {
    fn default() -> Self {
        Self::white()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiplied_scales_rgb_by_alpha() {
        let c = ColorRgba::new(1.0, 0.5, 0.25, 0.5);
        assert_eq!(c.premultiplied(), [0.5, 0.25, 0.125, 0.5]);
    }

    #[test]
    fn with_opacity_clamps() {
        assert_eq!(ColorRgba::white().with_opacity(2.0).a, 1.0);
        assert_eq!(ColorRgba::white().with_opacity(-1.0).a, 0.0);
        assert_eq!(ColorRgba::white().with_opacity(0.25).a, 0.25);
    }
}
