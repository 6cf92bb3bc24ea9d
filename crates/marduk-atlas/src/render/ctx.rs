use crate::coords::Viewport;

/// Device handles plus the format and logical size of the texture being drawn into.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub target_format: wgpu::TextureFormat,
    pub viewport: Viewport,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        target_format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Self {
        Self {
            device,
            queue,
            target_format,
            viewport,
        }
    }

    /// Context for drawing straight into `target` at scale 1 (offscreen or swapchain texture).
    pub fn for_texture(device: &'a wgpu::Device, queue: &'a wgpu::Queue, target: &wgpu::Texture) -> Self {
        Self::new(
            device,
            queue,
            target.format(),
            Viewport::from_target_size(target.width(), target.height()),
        )
    }
}

/// Encoder and color attachment a batch is recorded into. Existing contents are kept.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}
