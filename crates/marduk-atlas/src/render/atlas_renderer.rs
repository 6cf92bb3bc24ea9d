use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::atlas::{quad_indices, Quad, QuadBatch, QuadColors, QuadSink};
use crate::coords::Affine2;
use crate::render::{RenderCtx, RenderTarget};

use super::common::{color_vertex_layout, premul_alpha_blend, quad_vertex_layout, AtlasUniform};
use super::texture::AtlasTexture;

/// wgpu backend for sprite-manager batches.
///
/// One batch → one render pass → one `draw_indexed` over `6 * count` indices.
/// Two pipelines share a shader: `vs_colored` reads a per-vertex color
/// stream, `vs_plain` does not and never binds one.
///
/// `queue.write_buffer` calls all land before the submitted commands run, so
/// every batch recorded between two [`begin_frame`](Self::begin_frame) calls
/// gets its own range of the vertex buffers and its own uniform slot. One
/// renderer can therefore serve any number of managers (and textures) per
/// submission.
///
/// GPU resources are created lazily: pipelines per target format, bind
/// groups per texture, buffers when a frame outgrows them.
#[derive(Default)]
pub struct AtlasRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    plain_pipeline: Option<wgpu::RenderPipeline>,
    colored_pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    frame: u64,
    bind_groups: HashMap<u64, TextureBinding>,

    uniform_ubo: Option<wgpu::Buffer>,
    uniform_stride: u64,
    uniform_slots: FrameCursor,

    quad_vbo: Option<wgpu::Buffer>,
    color_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
    quads: FrameCursor,

    warned_invalid_viewport: bool,
}

struct TextureBinding {
    bind_group: wgpu::BindGroup,
    last_frame: u64,
}

impl AtlasRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new submission: buffer ranges are recycled from the start.
    ///
    /// Call once per encoder, before recording any pass. Bind groups for
    /// textures not drawn during the previous frame are released.
    pub fn begin_frame(&mut self) {
        self.frame += 1;
        let frame = self.frame;
        self.bind_groups.retain(|_, b| b.last_frame + 1 >= frame);
        self.quads.reset();
        self.uniform_slots.reset();
    }

    /// Binds this renderer to a frame so it can receive a manager's draw.
    ///
    /// ```ignore
    /// renderer.begin_frame();
    /// terrain.visit(&Affine2::IDENTITY, &mut renderer.pass(&ctx, &mut target, &tiles));
    /// units.visit(&Affine2::IDENTITY, &mut renderer.pass(&ctx, &mut target, &actors));
    /// queue.submit(Some(encoder.finish()));
    /// ```
    pub fn pass<'p, 'c, 't>(
        &'p mut self,
        ctx: &'p RenderCtx<'c>,
        target: &'p mut RenderTarget<'t>,
        texture: &'p AtlasTexture,
    ) -> AtlasPass<'p, 'c, 't> {
        AtlasPass {
            renderer: self,
            ctx,
            target,
            texture,
        }
    }

    /// Records one batch into `target`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        texture: &AtlasTexture,
        batch: QuadBatch<'_>,
    ) {
        if batch.is_empty() {
            return;
        }
        if !ctx.viewport.is_valid() {
            if !self.warned_invalid_viewport {
                log::warn!("AtlasRenderer: invalid viewport {:?}; batch skipped", ctx.viewport);
                self.warned_invalid_viewport = true;
            }
            return;
        }

        // Mutating methods must happen before borrowing pipeline/buffers immutably.
        self.ensure_pipelines(ctx);
        let first_quad = self.reserve_quads(ctx, batch.len());
        let uniform_offset = self.reserve_uniform(ctx, &batch.transform);
        self.ensure_bind_group(ctx, texture);

        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(color_vbo) = self.color_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };
        let Some(binding) = self.bind_groups.get(&texture.id()) else { return };

        let quad_size = std::mem::size_of::<Quad>() as u64;
        let quad_start = first_quad as u64 * quad_size;
        let quad_end = quad_start + batch.len() as u64 * quad_size;
        ctx.queue.write_buffer(quad_vbo, quad_start, bytemuck::cast_slice(batch.quads));

        let color_size = std::mem::size_of::<QuadColors>() as u64;
        let color_start = first_quad as u64 * color_size;
        let pipeline = match batch.colors {
            Some(colors) => {
                ctx.queue.write_buffer(color_vbo, color_start, bytemuck::cast_slice(colors));
                self.colored_pipeline.as_ref()
            }
            None => self.plain_pipeline.as_ref(),
        };
        let Some(pipeline) = pipeline else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("marduk atlas pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &binding.bind_group, &[uniform_offset]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(quad_start..quad_end));
        if let Some(colors) = batch.colors {
            let color_end = color_start + colors.len() as u64 * color_size;
            rpass.set_vertex_buffer(1, color_vbo.slice(color_start..color_end));
        }
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..(batch.len() * Quad::INDEX_COUNT) as u32, 0, 0..1);
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.target_format)
            && self.plain_pipeline.is_some()
            && self.colored_pipeline.is_some()
        {
            return;
        }
        log::debug!("AtlasRenderer: building pipelines for {:?}", ctx.target_format);

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("marduk atlas shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/atlas.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("marduk atlas bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: AtlasUniform::min_binding_size(),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("marduk atlas pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let build = |label: &str, entry: &str, buffers: &[wgpu::VertexBufferLayout<'static>]| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(entry),
                    compilation_options: Default::default(),
                    buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.target_format,
                        blend: Some(premul_alpha_blend()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let plain = build("marduk atlas pipeline", "vs_plain", &[quad_vertex_layout()]);
        let colored = build(
            "marduk atlas colored pipeline",
            "vs_colored",
            &[quad_vertex_layout(), color_vertex_layout()],
        );

        self.pipeline_format = Some(ctx.target_format);
        self.plain_pipeline = Some(plain);
        self.colored_pipeline = Some(colored);
        self.bind_group_layout = Some(bgl);

        // Bind groups belong to the old layout.
        self.bind_groups.clear();
    }

    /// Reserves `count` quads in this frame's vertex range; returns the first quad slot.
    ///
    /// When the buffers are full a larger set is allocated and the range
    /// restarts at 0. Batches already recorded keep the old buffers alive.
    fn reserve_quads(&mut self, ctx: &RenderCtx<'_>, count: usize) -> usize {
        if self.quad_vbo.is_some() && self.color_vbo.is_some() && self.quad_ibo.is_some() {
            if let Some(first) = self.quads.reserve(count) {
                return first;
            }
        }

        let new_cap = frame_growth(self.quads.used(), count, MAX_FRAME_QUADS).max(64);
        log::debug!("AtlasRenderer: quad buffers sized for {new_cap} quads");

        self.quad_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("marduk atlas quad vbo"),
            size: (new_cap * std::mem::size_of::<Quad>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.color_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("marduk atlas color vbo"),
            size: (new_cap * std::mem::size_of::<QuadColors>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("marduk atlas quad ibo"),
            contents: bytemuck::cast_slice(&quad_indices(new_cap)),
            usage: wgpu::BufferUsages::INDEX,
        }));

        self.quads = FrameCursor::new(new_cap);
        self.quads.reserve(count).unwrap_or_default()
    }

    /// Writes `transform` into a fresh uniform slot; returns its dynamic offset.
    fn reserve_uniform(&mut self, ctx: &RenderCtx<'_>, transform: &Affine2) -> u32 {
        let slot = match (self.uniform_ubo.is_some(), self.uniform_slots.reserve(1)) {
            (true, Some(slot)) => slot,
            _ => {
                let stride = uniform_stride(ctx.device.limits().min_uniform_buffer_offset_alignment);
                let slots = frame_growth(self.uniform_slots.used(), 1, MAX_FRAME_BATCHES).max(16);
                log::debug!("AtlasRenderer: uniform buffer sized for {slots} batches");

                self.uniform_ubo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("marduk atlas uniform ubo"),
                    size: slots as u64 * stride,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }));
                self.uniform_stride = stride;
                self.uniform_slots = FrameCursor::new(slots);
                // Bind groups point at the old buffer.
                self.bind_groups.clear();
                self.uniform_slots.reserve(1).unwrap_or_default()
            }
        };

        let offset = slot as u64 * self.uniform_stride;
        if let Some(ubo) = self.uniform_ubo.as_ref() {
            let u = AtlasUniform::new(ctx.viewport, transform);
            ctx.queue.write_buffer(ubo, offset, bytemuck::bytes_of(&u));
        }
        offset as u32
    }

    fn ensure_bind_group(&mut self, ctx: &RenderCtx<'_>, texture: &AtlasTexture) {
        let frame = self.frame;
        if let Some(binding) = self.bind_groups.get_mut(&texture.id()) {
            binding.last_frame = frame;
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(ubo) = self.uniform_ubo.as_ref() else { return };

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("marduk atlas bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: ubo,
                        offset: 0,
                        size: AtlasUniform::min_binding_size(),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(texture.sampler()),
                },
            ],
        });

        self.bind_groups.insert(
            texture.id(),
            TextureBinding {
                bind_group,
                last_frame: frame,
            },
        );
    }
}

/// Growth stops following the frame total past these; only the current request is sized.
const MAX_FRAME_QUADS: usize = 1 << 16;
const MAX_FRAME_BATCHES: usize = 1 << 10;

/// Slot count for a buffer that ran out with `used` slots taken and `count` more needed.
///
/// Sized for the whole frame so far, so the next frame fits in one buffer.
/// A caller that never calls `begin_frame` would otherwise double forever.
fn frame_growth(used: usize, count: usize, limit: usize) -> usize {
    let total = used.saturating_add(count);
    let wanted = if total <= limit { total } else { count };
    wanted.next_power_of_two()
}

/// Size of one uniform slot: the uniform rounded up to the device's dynamic-offset alignment.
fn uniform_stride(alignment: u32) -> u64 {
    let size = std::mem::size_of::<AtlasUniform>() as u64;
    let align = u64::from(alignment.max(1));
    size.div_ceil(align) * align
}

/// Linear allocator over a fixed number of slots, rewound once per frame.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct FrameCursor {
    capacity: usize,
    used: usize,
}

impl FrameCursor {
    fn new(capacity: usize) -> Self {
        Self { capacity, used: 0 }
    }

    #[inline]
    fn used(&self) -> usize {
        self.used
    }

    /// Claims `count` consecutive slots, or `None` if they do not fit.
    fn reserve(&mut self, count: usize) -> Option<usize> {
        let first = self.used;
        let end = first.checked_add(count)?;
        if end > self.capacity {
            return None;
        }
        self.used = end;
        Some(first)
    }

    fn reset(&mut self) {
        self.used = 0;
    }
}

/// An [`AtlasRenderer`] bound to one frame; receives a manager's batch as a [`QuadSink`].
pub struct AtlasPass<'p, 'c, 't> {
    renderer: &'p mut AtlasRenderer,
    ctx: &'p RenderCtx<'c>,
    target: &'p mut RenderTarget<'t>,
    texture: &'p AtlasTexture,
}

impl QuadSink for AtlasPass<'_, '_, '_> {
    fn draw_quads(&mut self, batch: QuadBatch<'_>) {
        self.renderer.render(self.ctx, self.target, self.texture, batch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_in_one_frame_get_disjoint_ranges() {
        let mut quads = FrameCursor::new(64);
        let a = quads.reserve(10).unwrap();
        let b = quads.reserve(20).unwrap();
        assert_eq!((a, b), (0, 10));
        assert_eq!(quads.used(), 30);
    }

    #[test]
    fn overflow_is_refused_without_consuming() {
        let mut quads = FrameCursor::new(16);
        quads.reserve(10).unwrap();
        assert_eq!(quads.reserve(7), None);
        assert_eq!(quads.used(), 10);
        assert_eq!(quads.reserve(6), Some(10));
        assert_eq!(FrameCursor::default().reserve(1), None);
    }

    #[test]
    fn reset_rewinds_to_start() {
        let mut slots = FrameCursor::new(4);
        slots.reserve(3).unwrap();
        slots.reset();
        assert_eq!(slots.reserve(4), Some(0));
    }

    #[test]
    fn growth_covers_frame_total_up_to_limit() {
        assert_eq!(frame_growth(40, 30, 1 << 16), 128);
        assert_eq!(frame_growth(0, 5, 1 << 16), 8);
        assert_eq!(frame_growth(1 << 16, 10, 1 << 16), 16);
    }

    #[test]
    fn uniform_stride_respects_alignment() {
        assert_eq!(uniform_stride(256), 256);
        assert_eq!(uniform_stride(16), 48);
        assert_eq!(uniform_stride(32), 64);
        assert_eq!(uniform_stride(0), 48);
    }
}
