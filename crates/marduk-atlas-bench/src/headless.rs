use anyhow::{Context, Result};

use marduk_atlas::coords::Affine2;
use marduk_atlas::render::{AtlasRenderer, AtlasTexture, RenderCtx, RenderTarget};
use marduk_atlas::AtlasSpriteManager;

use crate::churn::SHEET_SIZE;

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const TARGET_SIZE: (u32, u32) = (640, 480);

/// Device/queue pair without a surface.
pub struct HeadlessGpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl HeadlessGpu {
    /// Acquires an adapter and device; no window or surface is involved.
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        log::info!("adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("marduk-atlas-bench device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        Ok(Self { device, queue })
    }

    /// Draws one frame of `manager` into an offscreen target.
    pub fn render_frame(&self, manager: &mut AtlasSpriteManager) -> Result<()> {
        let sheet = checkerboard(SHEET_SIZE);
        let texture = AtlasTexture::from_rgba8(&self.device, &self.queue, SHEET_SIZE, SHEET_SIZE, &sheet)
            .context("failed to upload sprite sheet")?;

        let target = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("marduk-atlas-bench target"),
            size: wgpu::Extent3d {
                width: TARGET_SIZE.0,
                height: TARGET_SIZE.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("marduk-atlas-bench encoder"),
            });

        clear(&mut encoder, &view);

        let ctx = RenderCtx::for_texture(&self.device, &self.queue, &target);
        let mut renderer = AtlasRenderer::new();
        renderer.begin_frame();
        {
            let mut frame = RenderTarget::new(&mut encoder, &view);
            let mut pass = renderer.pass(&ctx, &mut frame, &texture);
            manager.visit(&Affine2::IDENTITY, &mut pass);
        }

        self.queue.submit(Some(encoder.finish()));
        log::info!(
            "rendered {} sprites into a {}x{} offscreen target",
            manager.len(),
            TARGET_SIZE.0,
            TARGET_SIZE.1
        );
        Ok(())
    }
}

fn clear(encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
    let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("marduk-atlas-bench clear"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
}

/// Opaque two-tone checkerboard with 32-texel cells, one cell per sprite frame.
fn checkerboard(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / 32) + (y / 32)) % 2 == 0;
            let v = if light { 230 } else { 60 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_is_rgba_and_alternates() {
        let px = checkerboard(64);
        assert_eq!(px.len(), 64 * 64 * 4);
        assert_eq!(px[0], 230);
        // First texel of the second cell in row 0.
        assert_eq!(px[32 * 4], 60);
        assert!(px.chunks_exact(4).all(|t| t[3] == 255));
    }
}
