//! Marduk sprite batching crate.
//!
//! An [`AtlasSpriteManager`] owns a set of sprites sharing one texture and
//! keeps their draw order mirrored in a quad buffer, so a whole frame's worth
//! of sprites goes out as a single batched draw.

pub mod atlas;
pub mod config;
pub mod coords;
pub mod error;
pub mod logging;
mod manager;
pub mod render;
pub mod scene;
pub mod sprite;

pub use config::{AtlasConfig, DEFAULT_CAPACITY};
pub use error::AtlasError;
pub use manager::{grown_capacity, AtlasSpriteManager, SpriteHandle};
pub use sprite::{AtlasSprite, SpriteElement};
