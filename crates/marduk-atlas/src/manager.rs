use std::sync::atomic::{AtomicU32, Ordering};

use slotmap::SlotMap;

use crate::atlas::{QuadBuffer, QuadSink, TextureAtlas};
use crate::config::{AtlasConfig, DEFAULT_CAPACITY};
use crate::coords::Affine2;
use crate::error::AtlasError;
use crate::scene::{ChildList, NodeState, ZIndex};
use crate::sprite::{AtlasSprite, SpriteElement};

slotmap::new_key_type! {
    /// Arena key, unique only within one manager.
    struct SpriteKey;
}

static NEXT_MANAGER_ID: AtomicU32 = AtomicU32::new(1);

/// Stable reference to a sprite owned by an [`AtlasSpriteManager`].
///
/// Handles survive reorders and go stale once the sprite is removed. A
/// handle only resolves in the manager that issued it; anywhere else it is
/// treated as absent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SpriteHandle {
    owner: u32,
    key: SpriteKey,
}

/// Capacity the quad buffer grows to when `count` quads are live and one more is needed.
///
/// `(count + 1) * 4 / 3`: roughly 33% headroom, always greater than `count`.
#[inline]
pub const fn grown_capacity(count: usize) -> usize {
    (count + 1) * 4 / 3
}

/// Batched sprite node: every child shares one quad buffer and is drawn in a single call.
///
/// Two orderings are kept identical at all times:
/// - the child list (draw order, sorted by z with stable ties)
/// - the quad buffer (each sprite's `atlas_index`)
///
/// so child `i` always owns quad `i`. Every structural change repairs the
/// cached indices over the affected range only:
/// - insert at `i`: positions `i + 1..` shift up
/// - remove at `i`: positions `i..` shift down
/// - reorder `old → new`: positions `min..=max` are rewritten
///
/// Growing the buffer is the one full pass: every sprite rewrites its quad.
pub struct AtlasSpriteManager<S = AtlasSprite, B = TextureAtlas> {
    id: u32,
    node: NodeState,
    atlas: B,
    sprites: SlotMap<SpriteKey, S>,
    children: ChildList<SpriteKey>,
    total_sprites: usize,
}

impl<S: SpriteElement> AtlasSpriteManager<S, TextureAtlas> {
    /// Creates a manager with a CPU [`TextureAtlas`] built from `config`.
    pub fn new(config: AtlasConfig) -> Result<Self, AtlasError> {
        Ok(Self::with_atlas(TextureAtlas::from_config(&config)?))
    }

    /// Manager for a texture of `texture_size` texels with the default capacity.
    pub fn with_texture_size(texture_size: (u32, u32)) -> Result<Self, AtlasError> {
        Self::new(AtlasConfig::new(texture_size).with_capacity(DEFAULT_CAPACITY))
    }
}

impl<S: SpriteElement, B: QuadBuffer> AtlasSpriteManager<S, B> {
    /// Wraps a quad buffer. Quads already in it have no owning sprite and are dropped.
    pub fn with_atlas(mut atlas: B) -> Self {
        let stale = atlas.total_quads();
        if stale > 0 {
            log::warn!("AtlasSpriteManager: discarding {stale} unowned quads from the supplied atlas");
            atlas.remove_all_quads();
        }

        let capacity = atlas.capacity();
        Self {
            id: NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed),
            node: NodeState::default(),
            atlas,
            sprites: SlotMap::with_capacity_and_key(capacity),
            children: ChildList::with_capacity(capacity),
            total_sprites: 0,
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn atlas(&self) -> &B {
        &self.atlas
    }

    /// Direct buffer access. Structural edits made here bypass index repair.
    #[inline]
    pub fn atlas_mut(&mut self) -> &mut B {
        &mut self.atlas
    }

    #[inline]
    pub fn node(&self) -> &NodeState {
        &self.node
    }

    #[inline]
    pub fn node_mut(&mut self) -> &mut NodeState {
        &mut self.node
    }

    /// Number of live sprites (and populated quads).
    #[inline]
    pub fn total_sprites(&self) -> usize {
        self.total_sprites
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.atlas.capacity()
    }

    #[inline]
    pub fn contains(&self, handle: SpriteHandle) -> bool {
        self.key_of(handle).is_some()
    }

    #[inline]
    pub fn get(&self, handle: SpriteHandle) -> Option<&S> {
        self.sprites.get(self.key_of(handle)?)
    }

    /// Mutable sprite access. Changes flow to the buffer at the next draw.
    #[inline]
    pub fn get_mut(&mut self, handle: SpriteHandle) -> Option<&mut S> {
        let key = self.key_of(handle)?;
        self.sprites.get_mut(key)
    }

    /// Handle of the sprite at draw-order `position`.
    #[inline]
    pub fn handle_at(&self, position: usize) -> Option<SpriteHandle> {
        self.children.handle_at(position).map(|key| self.handle(key))
    }

    pub fn z_order(&self, handle: SpriteHandle) -> Option<ZIndex> {
        let key = self.key_of(handle)?;
        self.children.iter().find(|c| c.handle == key).map(|c| c.z())
    }

    pub fn tag(&self, handle: SpriteHandle) -> Option<i32> {
        let key = self.key_of(handle)?;
        self.children.iter().find(|c| c.handle == key).and_then(|c| c.tag)
    }

    /// First child (in draw order) added with `tag`.
    #[inline]
    pub fn child_by_tag(&self, tag: i32) -> Option<SpriteHandle> {
        self.children.find_by_tag(tag).map(|key| self.handle(key))
    }

    /// Sprites in draw order.
    pub fn iter(&self) -> impl Iterator<Item = (SpriteHandle, &S)> + '_ {
        self.children
            .iter()
            .map(|c| (self.handle(c.handle), &self.sprites[c.handle]))
    }

    #[inline]
    fn handle(&self, key: SpriteKey) -> SpriteHandle {
        SpriteHandle { owner: self.id, key }
    }

    /// Arena key for `handle`, if it was issued here and is still live.
    #[inline]
    fn key_of(&self, handle: SpriteHandle) -> Option<SpriteKey> {
        (handle.owner == self.id && self.sprites.contains_key(handle.key)).then_some(handle.key)
    }

    // ── insertion ─────────────────────────────────────────────────────────

    /// Adds `sprite` at z-order `z`; it draws after existing sprites with the same z.
    #[inline]
    pub fn add_child(&mut self, sprite: S, z: impl Into<ZIndex>) -> Result<SpriteHandle, AtlasError> {
        self.insert_child(sprite, z.into(), None)
    }

    /// Like [`add_child`](Self::add_child), also recording `tag` for [`child_by_tag`](Self::child_by_tag).
    #[inline]
    pub fn add_child_with_tag(
        &mut self,
        sprite: S,
        z: impl Into<ZIndex>,
        tag: i32,
    ) -> Result<SpriteHandle, AtlasError> {
        self.insert_child(sprite, z.into(), Some(tag))
    }

    fn insert_child(
        &mut self,
        mut sprite: S,
        z: ZIndex,
        tag: Option<i32>,
    ) -> Result<SpriteHandle, AtlasError> {
        if self.total_sprites == self.atlas.capacity() {
            self.resize_atlas()?;
        }

        let index = self.children.insertion_index(z);
        sprite.insert_in_atlas(&mut self.atlas, index);
        if self.atlas.with_color_array() {
            sprite.update_color(&mut self.atlas);
        }

        let key = self.sprites.insert(sprite);
        let position = self.children.insert(key, z, tag);
        debug_assert_eq!(position, index);
        self.total_sprites += 1;

        // Everything after the new child moved one slot up.
        for (position, child) in self.children.iter().enumerate().skip(index + 1) {
            let other = &mut self.sprites[child.handle];
            expect_index(position, position - 1, other.atlas_index())?;
            other.set_atlas_index(position);
        }

        Ok(self.handle(key))
    }

    // ── removal ───────────────────────────────────────────────────────────

    /// Removes `handle` and returns its sprite.
    ///
    /// Stale handles and handles issued by another manager are ignored
    /// (`Ok(None)`). With `cleanup`, the sprite's [`SpriteElement::cleanup`]
    /// hook runs before it is returned.
    pub fn remove_child(
        &mut self,
        handle: SpriteHandle,
        cleanup: bool,
    ) -> Result<Option<S>, AtlasError> {
        let Some(key) = self.key_of(handle) else {
            return Ok(None);
        };
        let Some(position) = self.children.position_of(key) else {
            return Ok(None);
        };

        let index = self.sprites[key].atlas_index();
        expect_index(position, position, index)?;

        self.children.remove_at(position);
        let Some(mut sprite) = self.sprites.remove(key) else {
            return Ok(None);
        };
        if cleanup {
            sprite.cleanup();
        }

        self.atlas.remove_quad(index);
        self.total_sprites -= 1;

        // Everything after the removed child moved one slot down.
        for (position, child) in self.children.iter().enumerate().skip(index) {
            let other = &mut self.sprites[child.handle];
            expect_index(position, position + 1, other.atlas_index())?;
            other.set_atlas_index(position);
        }

        Ok(Some(sprite))
    }

    /// Removes the sprite at draw-order `position`. Out-of-range positions are ignored.
    pub fn remove_child_at(
        &mut self,
        position: usize,
        cleanup: bool,
    ) -> Result<Option<S>, AtlasError> {
        match self.handle_at(position) {
            Some(handle) => self.remove_child(handle, cleanup),
            None => Ok(None),
        }
    }

    /// Drops every sprite and empties the buffer in one step.
    pub fn remove_all_children(&mut self, cleanup: bool) {
        if cleanup {
            for sprite in self.sprites.values_mut() {
                sprite.cleanup();
            }
        }
        self.children.clear();
        self.sprites.clear();
        self.atlas.remove_all_quads();
        self.total_sprites = 0;
    }

    // ── reorder ───────────────────────────────────────────────────────────

    /// Moves `handle` to z-order `z`, after existing sprites with that z.
    pub fn reorder_child(&mut self, handle: SpriteHandle, z: impl Into<ZIndex>) -> Result<(), AtlasError> {
        let Some(key) = self.key_of(handle) else {
            return Err(AtlasError::NotAChild);
        };
        let Some(old_position) = self.children.position_of(key) else {
            return Err(AtlasError::NotAChild);
        };
        let old_index = self.sprites[key].atlas_index();
        expect_index(old_position, old_position, old_index)?;

        let new_index = self.children.reorder_at(old_position, z.into());
        if new_index == old_index {
            return Ok(());
        }

        self.atlas.move_quad(old_index, new_index);

        let lo = old_index.min(new_index);
        let hi = old_index.max(new_index);
        for (position, child) in self.children.iter().enumerate().take(hi + 1).skip(lo) {
            self.sprites[child.handle].set_atlas_index(position);
        }

        Ok(())
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Visits the manager under `parent`: applies its own transform and draws.
    ///
    /// Invisible managers are skipped entirely (no dirty resolution, no draw).
    pub fn visit(&mut self, parent: &Affine2, sink: &mut dyn QuadSink) {
        if !self.node.visible {
            return;
        }
        let transform = self.node.world_transform(parent);
        self.draw(transform, sink);
    }

    /// Flushes dirty sprites into the buffer, then submits one batch of all live quads.
    pub fn draw(&mut self, transform: Affine2, sink: &mut dyn QuadSink) {
        for child in self.children.iter() {
            let sprite = &mut self.sprites[child.handle];
            if sprite.is_position_dirty() {
                sprite.update_position(&mut self.atlas);
            }
            if sprite.is_color_dirty() {
                sprite.update_color(&mut self.atlas);
            }
        }

        if self.total_sprites > 0 {
            self.atlas.draw_quads(self.total_sprites, transform, sink);
        }
    }

    // ── invariants ────────────────────────────────────────────────────────

    /// Verifies that child `i` owns quad `i` and that all counts agree.
    pub fn check_consistency(&self) -> Result<(), AtlasError> {
        let children = self.children.len();
        if self.total_sprites != children
            || self.sprites.len() != children
            || self.atlas.total_quads() != children
            || self.total_sprites > self.atlas.capacity()
        {
            return Err(AtlasError::CountMismatch {
                count: self.total_sprites,
                children,
            });
        }

        for (position, child) in self.children.iter().enumerate() {
            let Some(sprite) = self.sprites.get(child.handle) else {
                return Err(AtlasError::NotAChild);
            };
            expect_index(position, position, sprite.atlas_index())?;
        }
        Ok(())
    }

    // ── growth ────────────────────────────────────────────────────────────

    /// Grows the buffer and has every sprite rewrite its quad.
    ///
    /// O(n) in live sprites; amortized O(1) per insertion.
    fn resize_atlas(&mut self) -> Result<(), AtlasError> {
        let old_capacity = self.atlas.capacity();
        let new_capacity = grown_capacity(self.atlas.total_quads());
        log::debug!("AtlasSpriteManager: resizing atlas capacity from {old_capacity} to {new_capacity}");

        self.atlas.resize_capacity(new_capacity)?;
        self.sprites.reserve(new_capacity.saturating_sub(self.sprites.len()));

        for child in self.children.iter() {
            self.sprites[child.handle].update_atlas(&mut self.atlas);
        }
        Ok(())
    }
}

impl<S, B> core::fmt::Debug for AtlasSpriteManager<S, B>
where
    B: QuadBuffer,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AtlasSpriteManager")
            .field("total_sprites", &self.total_sprites)
            .field("capacity", &self.atlas.capacity())
            .field("visible", &self.node.visible)
            .finish_non_exhaustive()
    }
}

#[inline]
fn expect_index(position: usize, expected: usize, found: usize) -> Result<(), AtlasError> {
    if expected == found {
        Ok(())
    } else {
        Err(AtlasError::IndexMismatch { position, expected, found })
    }
}
