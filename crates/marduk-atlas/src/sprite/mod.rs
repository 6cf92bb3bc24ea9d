//! Sprite elements: children of a sprite manager that own one quad each.

mod atlas_sprite;
mod element;

pub use atlas_sprite::AtlasSprite;
pub use element::SpriteElement;
