use crate::coords::{Affine2, Vec2};

/// Local transform of a scene node.
///
/// Applied as scale, then rotation, then translation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NodeTransform {
    /// Translation in logical pixels.
    pub position: Vec2,
    /// Rotation in radians (clockwise on screen).
    pub rotation: f32,
    pub scale: Vec2,
}

impl NodeTransform {
    #[inline]
    pub fn to_affine(&self) -> Affine2 {
        Affine2::from_trs(self.position, self.rotation, self.scale)
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: Vec2::zero(),
            rotation: 0.0,
            scale: Vec2::splat(1.0),
        }
    }
}

/// Node state shared by every scene node: visibility + transform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NodeState {
    /// Invisible nodes are skipped entirely by `visit`.
    pub visible: bool,
    pub transform: NodeTransform,
}

impl NodeState {
    /// World transform of this node under `parent`.
    #[inline]
    pub fn world_transform(&self, parent: &Affine2) -> Affine2 {
        parent.then_after(&self.transform.to_affine())
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            visible: true,
            transform: NodeTransform::default(),
        }
    }
}
