use crate::atlas::QuadBuffer;

/// Capability contract for children of an [`AtlasSpriteManager`](crate::AtlasSpriteManager).
///
/// A sprite element owns exactly one quad in the manager's buffer. Its
/// `atlas_index` is bookkeeping maintained by the manager; implementations
/// only write their quad at that index.
pub trait SpriteElement {
    /// Current buffer position.
    fn atlas_index(&self) -> usize;

    /// Updates the buffer position. Called by the manager only.
    fn set_atlas_index(&mut self, index: usize);

    /// Geometry (vertex positions / texture coordinates) changed since the last write.
    fn is_position_dirty(&self) -> bool;

    /// Rewrites the quad geometry at `atlas_index` and clears the position flag.
    fn update_position(&mut self, atlas: &mut dyn QuadBuffer);

    /// Tint or opacity changed since the last write.
    fn is_color_dirty(&self) -> bool;

    /// Rewrites the quad colors at `atlas_index` and clears the color flag.
    fn update_color(&mut self, atlas: &mut dyn QuadBuffer);

    /// Inserts a freshly computed quad at `index` and adopts it as `atlas_index`.
    fn insert_in_atlas(&mut self, atlas: &mut dyn QuadBuffer, index: usize);

    /// Rewrites the whole quad in place after the buffer was resized.
    fn update_atlas(&mut self, atlas: &mut dyn QuadBuffer);

    /// Hook run when the sprite is removed with cleanup requested.
    fn cleanup(&mut self) {}
}
