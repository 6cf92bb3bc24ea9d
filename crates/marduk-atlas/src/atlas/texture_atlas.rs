use crate::config::AtlasConfig;
use crate::coords::Affine2;
use crate::error::AtlasError;

use super::{Quad, QuadBatch, QuadBuffer, QuadColors, QuadSink};

/// CPU-resident quad buffer for one atlas texture.
///
/// Storage is reserved up front for `capacity` quads; inserting never
/// reallocates until [`QuadBuffer::resize_capacity`] is called.
#[derive(Debug, Clone)]
pub struct TextureAtlas {
    quads: Vec<Quad>,
    colors: Option<Vec<QuadColors>>,
    capacity: usize,
    texture_size: (u32, u32),
}

impl TextureAtlas {
    pub fn new(
        texture_size: (u32, u32),
        capacity: usize,
        with_color_array: bool,
    ) -> Result<Self, AtlasError> {
        let mut atlas = Self {
            quads: Vec::new(),
            colors: with_color_array.then(Vec::new),
            capacity: 0,
            texture_size,
        };
        atlas.resize_capacity(capacity)?;
        Ok(atlas)
    }

    #[inline]
    pub fn from_config(config: &AtlasConfig) -> Result<Self, AtlasError> {
        Self::new(config.texture_size, config.capacity, config.with_color_array)
    }

    /// Populated quads in buffer order.
    #[inline]
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    /// Populated colors in buffer order, if the color channel exists.
    #[inline]
    pub fn colors(&self) -> Option<&[QuadColors]> {
        self.colors.as_deref()
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.quads.len(),
            "TextureAtlas: index {index} out of range (total quads {})",
            self.quads.len()
        );
    }
}

impl QuadBuffer for TextureAtlas {
    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn total_quads(&self) -> usize {
        self.quads.len()
    }

    #[inline]
    fn with_color_array(&self) -> bool {
        self.colors.is_some()
    }

    #[inline]
    fn texture_size(&self) -> (u32, u32) {
        self.texture_size
    }

    fn insert_quad(&mut self, index: usize, quad: Quad) {
        assert!(
            self.quads.len() < self.capacity,
            "TextureAtlas: insert into full buffer (capacity {})",
            self.capacity
        );
        assert!(
            index <= self.quads.len(),
            "TextureAtlas: insert index {index} past end (total quads {})",
            self.quads.len()
        );

        self.quads.insert(index, quad);
        if let Some(colors) = self.colors.as_mut() {
            colors.insert(index, QuadColors::WHITE);
        }
    }

    fn update_quad(&mut self, index: usize, quad: Quad) {
        self.check_index(index);
        self.quads[index] = quad;
    }

    fn update_color(&mut self, index: usize, colors: QuadColors) {
        self.check_index(index);
        if let Some(all) = self.colors.as_mut() {
            all[index] = colors;
        }
    }

    fn remove_quad(&mut self, index: usize) {
        self.check_index(index);
        self.quads.remove(index);
        if let Some(colors) = self.colors.as_mut() {
            colors.remove(index);
        }
    }

    fn move_quad(&mut self, from: usize, to: usize) {
        self.check_index(from);
        self.check_index(to);
        if from == to {
            return;
        }

        fn relocate<T>(items: &mut [T], from: usize, to: usize) {
            if from < to {
                items[from..=to].rotate_left(1);
            } else {
                items[to..=from].rotate_right(1);
            }
        }

        relocate(&mut self.quads, from, to);
        if let Some(colors) = self.colors.as_mut() {
            relocate(colors, from, to);
        }
    }

    fn remove_all_quads(&mut self) {
        self.quads.clear();
        if let Some(colors) = self.colors.as_mut() {
            colors.clear();
        }
    }

    fn resize_capacity(&mut self, new_capacity: usize) -> Result<(), AtlasError> {
        if new_capacity < self.quads.len() {
            log::warn!(
                "TextureAtlas: shrinking to {new_capacity} drops {} quads",
                self.quads.len() - new_capacity
            );
            self.quads.truncate(new_capacity);
        }

        let alloc_err = |_| AtlasError::Allocation { requested: new_capacity };

        let extra = new_capacity.saturating_sub(self.quads.len());
        self.quads.try_reserve_exact(extra).map_err(alloc_err)?;

        if let Some(colors) = self.colors.as_mut() {
            colors.truncate(new_capacity);
            let extra = new_capacity.saturating_sub(colors.len());
            colors.try_reserve_exact(extra).map_err(alloc_err)?;
        }

        self.capacity = new_capacity;
        Ok(())
    }

    fn draw_quads(&self, count: usize, transform: Affine2, sink: &mut dyn QuadSink) {
        let count = count.min(self.quads.len());
        if count == 0 {
            return;
        }
        sink.draw_quads(QuadBatch {
            quads: &self.quads[..count],
            colors: self.colors.as_deref().map(|c| &c[..count]),
            transform,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quad whose first vertex position encodes `id`, so order can be read back.
    fn q(id: f32) -> Quad {
        let mut quad = Quad::default();
        quad.vertices[0].pos = [id, 0.0];
        quad
    }

    fn ids(atlas: &TextureAtlas) -> Vec<f32> {
        atlas.quads().iter().map(|q| q.vertices[0].pos[0]).collect()
    }

    fn atlas_with(n: usize, colors: bool) -> TextureAtlas {
        let mut atlas = TextureAtlas::new((64, 64), n, colors).unwrap();
        for i in 0..n {
            atlas.insert_quad(i, q(i as f32));
        }
        atlas
    }

    #[derive(Default)]
    struct Recorder {
        batches: Vec<(usize, bool)>,
    }

    impl QuadSink for Recorder {
        fn draw_quads(&mut self, batch: QuadBatch<'_>) {
            self.batches.push((batch.len(), batch.colors.is_some()));
        }
    }

    #[test]
    fn insert_shifts_later_quads() {
        let mut atlas = TextureAtlas::new((64, 64), 4, false).unwrap();
        atlas.insert_quad(0, q(1.0));
        atlas.insert_quad(1, q(2.0));
        atlas.insert_quad(0, q(0.0));
        assert_eq!(ids(&atlas), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    #[should_panic(expected = "full buffer")]
    fn insert_into_full_buffer_panics() {
        let mut atlas = atlas_with(2, false);
        atlas.insert_quad(0, q(9.0));
    }

    #[test]
    fn move_quad_forward_and_back_keeps_others_in_order() {
        let mut atlas = atlas_with(5, true);
        atlas.move_quad(1, 3);
        assert_eq!(ids(&atlas), vec![0.0, 2.0, 3.0, 1.0, 4.0]);
        atlas.move_quad(4, 0);
        assert_eq!(ids(&atlas), vec![4.0, 0.0, 2.0, 3.0, 1.0]);
        assert_eq!(atlas.colors().map(<[_]>::len), Some(5));
    }

    #[test]
    fn move_quad_carries_its_color() {
        let mut atlas = atlas_with(3, true);
        let red = QuadColors::uniform([1.0, 0.0, 0.0, 1.0]);
        atlas.update_color(0, red);
        atlas.move_quad(0, 2);
        assert_eq!(atlas.colors().unwrap()[2], red);
    }

    #[test]
    fn remove_quad_shifts_down() {
        let mut atlas = atlas_with(4, true);
        atlas.remove_quad(1);
        assert_eq!(ids(&atlas), vec![0.0, 2.0, 3.0]);
        assert_eq!(atlas.colors().unwrap().len(), 3);
    }

    #[test]
    fn resize_grows_and_shrinks() {
        let mut atlas = atlas_with(3, false);
        atlas.resize_capacity(8).unwrap();
        assert_eq!(atlas.capacity(), 8);
        assert_eq!(atlas.total_quads(), 3);

        atlas.resize_capacity(2).unwrap();
        assert_eq!(atlas.capacity(), 2);
        assert_eq!(ids(&atlas), vec![0.0, 1.0]);
    }

    #[test]
    fn draw_quads_submits_prefix_once() {
        let atlas = atlas_with(4, false);
        let mut rec = Recorder::default();
        atlas.draw_quads(3, Affine2::IDENTITY, &mut rec);
        atlas.draw_quads(0, Affine2::IDENTITY, &mut rec);
        assert_eq!(rec.batches, vec![(3, false)]);
    }

    #[test]
    fn draw_quads_includes_colors_only_when_configured() {
        let atlas = atlas_with(2, true);
        let mut rec = Recorder::default();
        atlas.draw_quads(2, Affine2::IDENTITY, &mut rec);
        assert_eq!(rec.batches, vec![(2, true)]);
    }

    #[test]
    fn remove_all_keeps_capacity() {
        let mut atlas = atlas_with(3, true);
        atlas.remove_all_quads();
        assert_eq!(atlas.total_quads(), 0);
        assert_eq!(atlas.capacity(), 3);
        assert_eq!(atlas.colors().map(<[_]>::len), Some(0));
    }
}
