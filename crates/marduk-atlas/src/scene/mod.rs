//! Scene-graph base used by the sprite manager.
//!
//! Responsibilities:
//! - z-ordered child storage with stable ties (`ChildList`)
//! - per-node visibility and transform (`NodeState`)
//!
//! Children are stored as opaque handles; ownership of the child objects
//! lives with whoever owns the list (the sprite manager keeps them in an arena).

mod children;
mod key;
mod node;
mod z_index;

pub use children::{Child, ChildList};
pub use key::SortKey;
pub use node::{NodeState, NodeTransform};
pub use z_index::ZIndex;
