//! GPU submission for sprite managers.
//!
//! `AtlasRenderer` turns the single batched draw of a manager visit into one
//! wgpu render pass with one `draw_indexed` call.
//!
//! Convention:
//! - quad positions are in logical pixels (top-left origin, +Y down)
//! - the vertex shader applies the node transform, then converts to NDC
//!   using the viewport uniform
//! - texture and vertex colors are premultiplied alpha

mod atlas_renderer;
mod common;
mod ctx;
mod texture;

pub use atlas_renderer::{AtlasPass, AtlasRenderer};
pub use ctx::{RenderCtx, RenderTarget};
pub use texture::AtlasTexture;
