//! Quad buffer: the fixed-capacity quad storage shared by every sprite of a manager.
//!
//! - `QuadBuffer` is the contract the sprite manager and sprites write through
//! - `TextureAtlas` is the CPU-resident implementation
//! - `QuadSink` receives the single batched draw per visit

mod buffer;
mod quad;
mod texture_atlas;

pub use buffer::{QuadBatch, QuadBuffer, QuadSink};
pub use quad::{quad_indices, Quad, QuadColors, QuadVertex};
pub use texture_atlas::TextureAtlas;
