//! Geometry types shared by sprites, the quad buffer and the renderer.
//!
//! Canonical CPU space:
//! - Logical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Texture rects are measured in texels of the atlas texture. They are
//! normalized to UV space only when a quad is written.

mod affine;
mod color;
mod rect;
mod vec2;
mod viewport;

pub use affine::Affine2;
pub use color::ColorRgba;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
