use bytemuck::{Pod, Zeroable};

/// One quad corner: logical-pixel position + normalized texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
}

/// Geometry of one sprite.
///
/// Corner order: top-left, top-right, bottom-right, bottom-left.
/// The layout is uploaded to the GPU as-is (four vertices per quad).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Quad {
    pub vertices: [QuadVertex; 4],
}

impl Quad {
    pub const VERTEX_COUNT: usize = 4;
    pub const INDEX_COUNT: usize = 6;

    /// Zero-area quad. Keeps a slot reserved without producing fragments.
    #[inline]
    pub fn degenerate() -> Self {
        Self::zeroed()
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.vertices.iter().all(|v| v.pos == self.vertices[0].pos)
    }
}

/// Per-vertex premultiplied colors of one quad, same corner order as [`Quad`].
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadColors {
    pub colors: [[f32; 4]; 4],
}

impl QuadColors {
    pub const WHITE: QuadColors = QuadColors::uniform([1.0; 4]);

    #[inline]
    pub const fn uniform(color: [f32; 4]) -> Self {
        Self { colors: [color; 4] }
    }
}

impl Default for QuadColors {
    fn default() -> Self {
        Self::WHITE
    }
}

const CORNER_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Triangle-list indices for `count` consecutive quads.
pub fn quad_indices(count: usize) -> Vec<u32> {
    let mut out = Vec::with_capacity(count * Quad::INDEX_COUNT);
    for q in 0..count as u32 {
        let base = q * Quad::VERTEX_COUNT as u32;
        out.extend(CORNER_INDICES.iter().map(|i| base + i));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_offset_per_quad() {
        assert_eq!(quad_indices(2), vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert!(quad_indices(0).is_empty());
    }

    #[test]
    fn quad_is_sixteen_floats() {
        assert_eq!(std::mem::size_of::<Quad>(), 16 * 4);
        assert_eq!(std::mem::size_of::<QuadColors>(), 16 * 4);
    }

    #[test]
    fn degenerate_quad_is_detected() {
        assert!(Quad::degenerate().is_degenerate());
        let mut q = Quad::degenerate();
        q.vertices[2].pos = [1.0, 1.0];
        assert!(!q.is_degenerate());
    }
}
