use crate::atlas::{Quad, QuadBuffer, QuadColors};
use crate::coords::{Affine2, ColorRgba, Rect, Vec2};

use super::SpriteElement;

/// A textured quad drawn from a region of the manager's atlas texture.
///
/// Setters only record state and raise a dirty flag; the quad buffer is
/// written during the manager's next draw pass.
///
/// - geometry (`texture_rect`, `position`, `anchor`, `scale`, `rotation`,
///   flips, visibility) → position dirty
/// - tint (`color`, `opacity`) → color dirty
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasSprite {
    texture_rect: Rect,
    position: Vec2,
    anchor: Vec2,
    scale: Vec2,
    rotation: f32,
    flip_x: bool,
    flip_y: bool,
    visible: bool,

    color: ColorRgba,
    opacity: f32,

    atlas_index: usize,
    dirty_position: bool,
    dirty_color: bool,
}

impl AtlasSprite {
    /// Creates a sprite showing `texture_rect` (texels), anchored at its center.
    pub fn new(texture_rect: Rect) -> Self {
        Self {
            texture_rect,
            position: Vec2::zero(),
            anchor: Vec2::splat(0.5),
            scale: Vec2::splat(1.0),
            rotation: 0.0,
            flip_x: false,
            flip_y: false,
            visible: true,
            color: ColorRgba::white(),
            opacity: 1.0,
            atlas_index: 0,
            dirty_position: true,
            dirty_color: true,
        }
    }

    #[inline]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    #[inline]
    pub fn with_color(mut self, color: ColorRgba) -> Self {
        self.color = color;
        self
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[inline]
    pub fn texture_rect(&self) -> Rect {
        self.texture_rect
    }

    pub fn set_texture_rect(&mut self, rect: Rect) {
        self.texture_rect = rect;
        self.dirty_position = true;
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.dirty_position = true;
    }

    #[inline]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Sets the normalized anchor (`(0, 0)` top-left, `(1, 1)` bottom-right).
    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
        self.dirty_position = true;
    }

    #[inline]
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.dirty_position = true;
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Sets the rotation in radians around the anchor point.
    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = radians;
        self.dirty_position = true;
    }

    #[inline]
    pub fn flip_x(&self) -> bool {
        self.flip_x
    }

    pub fn set_flip_x(&mut self, flip: bool) {
        self.flip_x = flip;
        self.dirty_position = true;
    }

    #[inline]
    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    pub fn set_flip_y(&mut self, flip: bool) {
        self.flip_y = flip;
        self.dirty_position = true;
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hidden sprites keep their buffer slot but write a zero-area quad.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.dirty_position = true;
    }

    // ── tint ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn color(&self) -> ColorRgba {
        self.color
    }

    pub fn set_color(&mut self, color: ColorRgba) {
        self.color = color;
        self.dirty_color = true;
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
        self.dirty_color = true;
    }

    // ── quad generation ───────────────────────────────────────────────────

    /// Computes the quad for a texture of `texture_size` texels.
    pub fn quad(&self, texture_size: (u32, u32)) -> Quad {
        if !self.visible {
            return Quad::degenerate();
        }

        let rect = self.texture_rect.normalized();
        let lo = -self.anchor.mul_elem(rect.size);
        let hi = lo + rect.size;
        let corners = [
            Vec2::new(lo.x, lo.y),
            Vec2::new(hi.x, lo.y),
            Vec2::new(hi.x, hi.y),
            Vec2::new(lo.x, hi.y),
        ];

        let (uv_min, uv_max) = rect.uv_bounds(texture_size);
        let (u0, u1) = if self.flip_x { (uv_max[0], uv_min[0]) } else { (uv_min[0], uv_max[0]) };
        let (v0, v1) = if self.flip_y { (uv_max[1], uv_min[1]) } else { (uv_min[1], uv_max[1]) };
        let uvs = [[u0, v0], [u1, v0], [u1, v1], [u0, v1]];

        let xf = Affine2::from_trs(self.position, self.rotation, self.scale);

        let mut quad = Quad::default();
        for ((vertex, corner), uv) in quad.vertices.iter_mut().zip(corners).zip(uvs) {
            let p = xf.transform_point(corner);
            vertex.pos = [p.x, p.y];
            vertex.uv = uv;
        }
        quad
    }

    /// Premultiplied per-vertex colors (uniform tint).
    #[inline]
    pub fn quad_colors(&self) -> QuadColors {
        QuadColors::uniform(self.color.with_opacity(self.opacity).premultiplied())
    }
}

impl SpriteElement for AtlasSprite {
    #[inline]
    fn atlas_index(&self) -> usize {
        self.atlas_index
    }

    #[inline]
    fn set_atlas_index(&mut self, index: usize) {
        self.atlas_index = index;
    }

    #[inline]
    fn is_position_dirty(&self) -> bool {
        self.dirty_position
    }

    fn update_position(&mut self, atlas: &mut dyn QuadBuffer) {
        atlas.update_quad(self.atlas_index, self.quad(atlas.texture_size()));
        self.dirty_position = false;
    }

    #[inline]
    fn is_color_dirty(&self) -> bool {
        self.dirty_color
    }

    fn update_color(&mut self, atlas: &mut dyn QuadBuffer) {
        atlas.update_color(self.atlas_index, self.quad_colors());
        self.dirty_color = false;
    }

    fn insert_in_atlas(&mut self, atlas: &mut dyn QuadBuffer, index: usize) {
        self.atlas_index = index;
        atlas.insert_quad(index, self.quad(atlas.texture_size()));
        self.dirty_position = false;
    }

    fn update_atlas(&mut self, atlas: &mut dyn QuadBuffer) {
        self.update_position(atlas);
        self.update_color(atlas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::TextureAtlas;

    fn sprite() -> AtlasSprite {
        AtlasSprite::new(Rect::new(0.0, 0.0, 32.0, 16.0))
    }

    fn positions(q: &Quad) -> Vec<[f32; 2]> {
        q.vertices.iter().map(|v| v.pos).collect()
    }

    #[test]
    fn centered_quad_spans_rect_around_position() {
        let s = sprite().with_position(Vec2::new(100.0, 50.0));
        let q = s.quad((64, 64));
        assert_eq!(
            positions(&q),
            vec![[84.0, 42.0], [116.0, 42.0], [116.0, 58.0], [84.0, 58.0]]
        );
        assert_eq!(q.vertices[0].uv, [0.0, 0.0]);
        assert_eq!(q.vertices[2].uv, [0.5, 0.25]);
    }

    #[test]
    fn flip_x_swaps_u() {
        let mut s = sprite();
        s.set_flip_x(true);
        let q = s.quad((64, 64));
        assert_eq!(q.vertices[0].uv, [0.5, 0.0]);
        assert_eq!(q.vertices[1].uv, [0.0, 0.0]);
    }

    #[test]
    fn hidden_sprite_writes_degenerate_quad() {
        let mut s = sprite();
        s.set_visible(false);
        assert!(s.quad((64, 64)).is_degenerate());
    }

    #[test]
    fn setters_raise_matching_flags() {
        let mut atlas = TextureAtlas::new((64, 64), 1, true).unwrap();
        let mut s = sprite();
        s.insert_in_atlas(&mut atlas, 0);
        s.update_color(&mut atlas);
        assert!(!s.is_position_dirty());
        assert!(!s.is_color_dirty());

        s.set_scale(Vec2::splat(2.0));
        assert!(s.is_position_dirty());
        assert!(!s.is_color_dirty());

        s.set_opacity(0.5);
        assert!(s.is_color_dirty());
    }

    #[test]
    fn update_writes_at_atlas_index() {
        let mut atlas = TextureAtlas::new((64, 64), 2, true).unwrap();
        let mut a = sprite();
        let mut b = sprite();
        a.insert_in_atlas(&mut atlas, 0);
        b.insert_in_atlas(&mut atlas, 1);

        b.set_position(Vec2::new(10.0, 10.0));
        b.set_color(ColorRgba::new(1.0, 0.0, 0.0, 1.0));
        b.update_position(&mut atlas);
        b.update_color(&mut atlas);

        assert_eq!(atlas.quads()[1], b.quad((64, 64)));
        assert_ne!(atlas.quads()[0], atlas.quads()[1]);
        assert_eq!(atlas.colors().unwrap()[1], QuadColors::uniform([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(atlas.colors().unwrap()[0], QuadColors::WHITE);
    }

    #[test]
    fn opacity_premultiplies_tint() {
        let mut s = sprite();
        s.set_opacity(0.5);
        assert_eq!(s.quad_colors(), QuadColors::uniform([0.5, 0.5, 0.5, 0.5]));
    }
}
