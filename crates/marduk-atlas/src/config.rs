/// Quad capacity used when none is supplied.
pub const DEFAULT_CAPACITY: usize = 29;

/// Construction parameters for a sprite manager and its quad buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Initial quad capacity. The buffer grows on demand past this.
    pub capacity: usize,

    /// Carry a per-vertex color channel.
    ///
    /// Without it sprite tints are ignored and draws bind no color stream.
    pub with_color_array: bool,

    /// Atlas texture size in texels; used to normalize sprite texture rects.
    pub texture_size: (u32, u32),
}

impl AtlasConfig {
    #[inline]
    pub fn new(texture_size: (u32, u32)) -> Self {
        Self {
            texture_size,
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[inline]
    pub fn with_color_array(mut self, enabled: bool) -> Self {
        self.with_color_array = enabled;
        self
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            with_color_array: false,
            texture_size: (1, 1),
        }
    }
}
