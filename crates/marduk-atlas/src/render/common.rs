//! GPU-side types shared by the atlas pipelines.

use bytemuck::{Pod, Zeroable};

use crate::atlas::{QuadColors, QuadVertex};
use crate::coords::{Affine2, Viewport};

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

// ── uniform ───────────────────────────────────────────────────────────────

/// Viewport + node transform (48 bytes, 16-byte aligned rows).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct AtlasUniform {
    pub viewport: [f32; 2],
    pub _pad: [f32; 2],
    pub transform: [[f32; 4]; 2],
}

impl AtlasUniform {
    pub(super) fn new(viewport: Viewport, transform: &Affine2) -> Self {
        Self {
            viewport: [viewport.width.max(1.0), viewport.height.max(1.0)],
            _pad: [0.0; 2],
            transform: transform.to_rows(),
        }
    }

    /// Minimum binding size; the struct is non-empty by construction.
    pub(super) fn min_binding_size() -> Option<std::num::NonZeroU64> {
        std::num::NonZeroU64::new(std::mem::size_of::<AtlasUniform>() as u64)
    }
}

// ── vertex layouts ────────────────────────────────────────────────────────

const QUAD_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x2, // pos
    1 => Float32x2  // uv
];

const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![
    2 => Float32x4  // premultiplied color
];

/// Layout of `Quad` data viewed as a flat vertex stream.
pub(super) fn quad_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &QUAD_ATTRS,
    }
}

/// Layout of `QuadColors` data viewed as one color per vertex.
pub(super) fn color_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (std::mem::size_of::<QuadColors>() / 4) as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &COLOR_ATTRS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_48_bytes() {
        assert_eq!(std::mem::size_of::<AtlasUniform>(), 48);
        assert!(AtlasUniform::min_binding_size().is_some());
    }

    #[test]
    fn color_stride_is_one_vec4() {
        assert_eq!(color_vertex_layout().array_stride, 16);
        assert_eq!(quad_vertex_layout().array_stride, 16);
    }

    #[test]
    fn uniform_clamps_degenerate_viewport() {
        let u = AtlasUniform::new(Viewport::new(0.0, 300.0), &Affine2::IDENTITY);
        assert_eq!(u.viewport, [1.0, 300.0]);
        assert_eq!(u.transform[0], [1.0, 0.0, 0.0, 0.0]);
    }
}
