use super::Affine;

/// Render target size in logical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// View transform mapping logical pixels (top-left origin, +Y down) to clip space
    /// (+Y up, `[-1, 1]` on both axes).
    ///
    /// This is the usual `view` argument for [`Batcher::render`](crate::batch::Batcher::render).
    pub fn to_clip(self) -> Affine {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        Affine::new([2.0 / w, 0.0, 0.0, -2.0 / h, -1.0, 1.0])
    }
}
