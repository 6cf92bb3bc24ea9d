use std::fmt;

/// Errors reported by the atlas layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtlasError {
    /// A sprite's buffer position disagrees with its draw-order position.
    ///
    /// This is a logic defect in the manager; continuing would corrupt
    /// subsequent draws, so the failing operation stops immediately.
    IndexMismatch {
        /// Draw-order position that was inspected.
        position: usize,
        /// Buffer position the sprite should have had.
        expected: usize,
        /// Buffer position the sprite actually reported.
        found: usize,
    },
    /// The live sprite count no longer matches the child list / buffer.
    CountMismatch { count: usize, children: usize },
    /// Growing the quad buffer could not reserve memory.
    Allocation { requested: usize },
    /// The handle does not refer to a child of this manager.
    NotAChild,
    /// Pixel data does not match the declared texture size.
    TextureData { expected: usize, found: usize },
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::IndexMismatch { position, expected, found } => write!(
                f,
                "atlas index mismatch at draw position {position}: expected {expected}, found {found}"
            ),
            AtlasError::CountMismatch { count, children } => write!(
                f,
                "atlas sprite count {count} does not match {children} children"
            ),
            AtlasError::Allocation { requested } => {
                write!(f, "failed to allocate quad storage for {requested} quads")
            }
            AtlasError::NotAChild => write!(f, "sprite handle is not a child of this manager"),
            AtlasError::TextureData { expected, found } => write!(
                f,
                "texture data has {found} bytes, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for AtlasError {}
