use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use marduk_atlas::atlas::{QuadBatch, QuadSink};
use marduk_atlas::coords::{Affine2, ColorRgba, Rect, Vec2};
use marduk_atlas::{AtlasConfig, AtlasSprite, AtlasSpriteManager, SpriteHandle};

/// Atlas texture side, in texels. The sheet is a grid of 32×32 cells.
pub const SHEET_SIZE: u32 = 256;
const CELL: f32 = 32.0;
const CELLS_PER_ROW: u32 = SHEET_SIZE / CELL as u32;

/// Counters accumulated over a churn run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChurnStats {
    pub inserts: usize,
    pub removes: usize,
    pub reorders: usize,
    pub touches: usize,
    pub draws: usize,
    pub quads_drawn: usize,
    pub peak_capacity: usize,
}

/// Sink that only counts; the CPU half of the bench never needs a GPU.
#[derive(Debug, Default)]
pub struct CountingSink {
    pub batches: usize,
    pub quads: usize,
}

impl QuadSink for CountingSink {
    fn draw_quads(&mut self, batch: QuadBatch<'_>) {
        self.batches += 1;
        self.quads += batch.len();
    }
}

/// Drives an [`AtlasSpriteManager`] with a seeded stream of random mutations.
pub struct Churn {
    manager: AtlasSpriteManager,
    handles: Vec<SpriteHandle>,
    rng: SmallRng,
    stats: ChurnStats,
}

impl Churn {
    pub fn new(seed: u64, capacity: usize) -> Result<Self> {
        let config = AtlasConfig::new((SHEET_SIZE, SHEET_SIZE))
            .with_capacity(capacity)
            .with_color_array(true);
        let manager = AtlasSpriteManager::new(config).context("failed to create sprite manager")?;
        Ok(Self {
            manager,
            handles: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            stats: ChurnStats::default(),
        })
    }

    pub fn manager(&self) -> &AtlasSpriteManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut AtlasSpriteManager {
        &mut self.manager
    }

    pub fn stats(&self) -> ChurnStats {
        self.stats
    }

    /// One simulated frame: a handful of mutations, a draw, and an invariant check.
    pub fn step(&mut self, frame: usize) -> Result<()> {
        let ops = self.rng.gen_range(1..=8);
        for _ in 0..ops {
            self.mutate()?;
        }

        let mut sink = CountingSink::default();
        self.manager.visit(&Affine2::IDENTITY, &mut sink);
        self.stats.draws += sink.batches;
        self.stats.quads_drawn += sink.quads;
        self.stats.peak_capacity = self.stats.peak_capacity.max(self.manager.capacity());

        anyhow::ensure!(
            sink.batches <= 1,
            "frame {frame}: expected at most one batch, got {}",
            sink.batches
        );
        self.manager
            .check_consistency()
            .with_context(|| format!("frame {frame}: manager inconsistent"))?;
        Ok(())
    }

    fn mutate(&mut self) -> Result<()> {
        // Bias toward inserts while small so the buffer keeps growing.
        let roll = if self.handles.len() < 16 {
            0
        } else {
            self.rng.gen_range(0..10)
        };

        match roll {
            0..=3 => {
                let sprite = self.random_sprite();
                let z = self.rng.gen_range(-3..=3i32);
                let handle = self.manager.add_child(sprite, z)?;
                self.handles.push(handle);
                self.stats.inserts += 1;
            }
            4 | 5 => {
                let i = self.rng.gen_range(0..self.handles.len());
                let handle = self.handles.swap_remove(i);
                let removed = self.manager.remove_child(handle, true)?;
                anyhow::ensure!(removed.is_some(), "live handle {handle:?} was not removed");
                self.stats.removes += 1;
            }
            6 | 7 => {
                let handle = self.handles[self.rng.gen_range(0..self.handles.len())];
                let z = self.rng.gen_range(-3..=3i32);
                self.manager.reorder_child(handle, z)?;
                self.stats.reorders += 1;
            }
            _ => {
                let handle = self.handles[self.rng.gen_range(0..self.handles.len())];
                let position = self.random_position();
                let tint = self.random_color();
                if let Some(sprite) = self.manager.get_mut(handle) {
                    sprite.set_position(position);
                    sprite.set_color(tint);
                }
                self.stats.touches += 1;
            }
        }
        Ok(())
    }

    fn random_sprite(&mut self) -> AtlasSprite {
        let cell = self.rng.gen_range(0..CELLS_PER_ROW * CELLS_PER_ROW);
        let rect = Rect::new(
            (cell % CELLS_PER_ROW) as f32 * CELL,
            (cell / CELLS_PER_ROW) as f32 * CELL,
            CELL,
            CELL,
        );
        let mut sprite = AtlasSprite::new(rect)
            .with_position(self.random_position())
            .with_color(self.random_color());
        sprite.set_rotation(self.rng.gen_range(0.0..std::f32::consts::TAU));
        sprite
    }

    fn random_position(&mut self) -> Vec2 {
        Vec2::new(self.rng.gen_range(0.0..640.0), self.rng.gen_range(0.0..480.0))
    }

    fn random_color(&mut self) -> ColorRgba {
        ColorRgba::from_u8(self.rng.r#gen(), self.rng.r#gen(), self.rng.r#gen(), 255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn churn_stays_consistent() {
        let mut churn = Churn::new(42, 0).unwrap();
        for frame in 0..200 {
            churn.step(frame).unwrap();
        }
        let stats = churn.stats();
        assert!(stats.inserts > 0 && stats.removes > 0 && stats.reorders > 0);
        assert!(stats.peak_capacity >= churn.manager().len());
        assert_eq!(stats.inserts - stats.removes, churn.manager().len());
    }

    #[test]
    fn same_seed_same_run() {
        let run = |seed| {
            let mut churn = Churn::new(seed, 4).unwrap();
            for frame in 0..50 {
                churn.step(frame).unwrap();
            }
            churn.stats()
        };
        assert_eq!(run(9), run(9));
    }
}
