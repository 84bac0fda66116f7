use crate::batch::Batcher;
use crate::coords::Rect;
use crate::error::BatchError;
use crate::paint::Color;

impl Batcher {
    /// Rectangle outline drawn inside `rect` as four non-overlapping strips.
    ///
    /// Top and bottom strips span the full width; left and right fill the height
    /// between them. Thickness is clamped to half the extent on each axis.
    pub fn hollow_rect(&mut self, rect: Rect, thickness: f32, color: Color) -> Result<(), BatchError> {
        if thickness.is_nan() || thickness <= 0.0 {
            return Ok(());
        }
        let rect = rect.normalized();
        let (x, y, w, h) = (rect.origin.x, rect.origin.y, rect.width(), rect.height());
        let th = thickness.min(h * 0.5);
        let tv = thickness.min(w * 0.5);
        let inner_h = h - 2.0 * th;

        self.reserve(4, 0)?;
        self.rect(Rect::new(x, y, w, th), color)?;
        self.rect(Rect::new(x, y + h - th, w, th), color)?;
        self.rect(Rect::new(x, y + th, tv, inner_h), color)?;
        self.rect(Rect::new(x + w - tv, y + th, tv, inner_h), color)
    }
}
