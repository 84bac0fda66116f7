use crate::batch::Batcher;
use crate::coords::Vec2;
use crate::error::BatchError;
use crate::paint::Color;

impl Batcher {
    /// Segment from `from` to `to` as a quad `thickness` wide, centred on the segment.
    ///
    /// Zero-length segments emit nothing.
    pub fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) -> Result<(), BatchError> {
        let dir = (to - from).normalized();
        if dir == Vec2::ZERO || thickness.is_nan() || thickness <= 0.0 {
            return Ok(());
        }
        let n = dir.perp() * (thickness * 0.5);
        self.quad([from + n, to + n, to - n, from - n], color)
    }

    /// Connected segments through `points`; joints are not mitred.
    pub fn polyline(&mut self, points: &[Vec2], thickness: f32, color: Color) -> Result<(), BatchError> {
        self.reserve(points.len().saturating_sub(1), 0)?;
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], thickness, color)?;
        }
        Ok(())
    }
}
