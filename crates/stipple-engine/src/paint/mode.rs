/// Per-vertex weights evaluated by the fragment stage as
/// `multiply * tex * color + wash * tex.a * color + fill * color`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BlendWeights {
    pub multiply: u8,
    pub wash: u8,
    pub fill: u8,
}

impl BlendWeights {
    /// Untextured geometry: the texture is ignored, the vertex color is used as-is.
    pub const SOLID: BlendWeights = BlendWeights::new(0, 0, 255);

    #[inline]
    pub const fn new(multiply: u8, wash: u8, fill: u8) -> Self {
        Self { multiply, wash, fill }
    }
}

/// How textured geometry (images, glyphs) combines the texture with the vertex color.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ImageMode {
    /// Texture tinted by the color.
    #[default]
    Normal,
    /// Texture alpha used as a mask for the flat color (silhouettes, glyph atlases).
    Wash,
    /// Texture ignored.
    Fill,
}

impl ImageMode {
    #[inline]
    pub const fn weights(self) -> BlendWeights {
        match self {
            ImageMode::Normal => BlendWeights::new(255, 0, 0),
            ImageMode::Wash => BlendWeights::new(0, 255, 0),
            ImageMode::Fill => BlendWeights::SOLID,
        }
    }
}
