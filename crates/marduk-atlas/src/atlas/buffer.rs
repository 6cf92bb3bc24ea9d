use crate::coords::Affine2;
use crate::error::AtlasError;

use super::{Quad, QuadColors};

/// The live quad range handed to a [`QuadSink`] by one batched draw.
#[derive(Debug, Copy, Clone)]
pub struct QuadBatch<'a> {
    /// Exactly the first `count` quads of the buffer, in buffer order.
    pub quads: &'a [Quad],
    /// Matching colors; `None` when the buffer carries no color channel.
    pub colors: Option<&'a [QuadColors]>,
    /// Transform of the node that owns the buffer.
    pub transform: Affine2,
}

impl QuadBatch<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }
}

/// Receiver of batched draw submissions (a GPU pass, a recorder in tests, ...).
pub trait QuadSink {
    fn draw_quads(&mut self, batch: QuadBatch<'_>);
}

/// Fixed-capacity quad storage.
///
/// Positions are dense: `0..total_quads()`. Index arguments outside the
/// documented range are precondition violations and may panic.
pub trait QuadBuffer {
    /// Maximum number of quads the buffer can hold without resizing.
    fn capacity(&self) -> usize;

    /// Number of populated quads.
    fn total_quads(&self) -> usize;

    /// Whether the buffer carries a per-vertex color channel.
    fn with_color_array(&self) -> bool;

    /// Size in texels of the texture the quads sample from.
    fn texture_size(&self) -> (u32, u32);

    /// Inserts `quad` at `index` (`index <= total_quads()`), shifting later quads up.
    ///
    /// Requires `total_quads() < capacity()`.
    fn insert_quad(&mut self, index: usize, quad: Quad);

    /// Overwrites the geometry at `index`.
    fn update_quad(&mut self, index: usize, quad: Quad);

    /// Overwrites the colors at `index`. No-op without a color channel.
    fn update_color(&mut self, index: usize, colors: QuadColors);

    /// Removes the quad at `index`, shifting later quads down.
    fn remove_quad(&mut self, index: usize);

    /// Relocates the quad at `from` to `to`, keeping every other quad's relative order.
    fn move_quad(&mut self, from: usize, to: usize);

    /// Drops every quad. Capacity is kept.
    fn remove_all_quads(&mut self);

    /// Sets a new capacity. Shrinking below `total_quads()` truncates.
    fn resize_capacity(&mut self, new_capacity: usize) -> Result<(), AtlasError>;

    /// Submits the first `count` quads to `sink` in one batch.
    fn draw_quads(&self, count: usize, transform: Affine2, sink: &mut dyn QuadSink);
}
