use crate::batch::{Batcher, Vertex};
use crate::coords::Vec2;
use crate::error::BatchError;
use crate::paint::Color;

impl Batcher {
    pub fn triangle(&mut self, points: [Vec2; 3], color: Color) -> Result<(), BatchError> {
        self.triangle_colors(points, [color; 3])
    }

    pub fn triangle_colors(&mut self, points: [Vec2; 3], colors: [Color; 3]) -> Result<(), BatchError> {
        self.reserve(0, 1)?;
        let vertices = std::array::from_fn(|i| Vertex::solid(points[i], colors[i]));
        self.emit_triangle(vertices)
    }

    /// Triangle fan around `center` from `start` to `end` radians, `segments` slices.
    pub(crate) fn arc_fan(
        &mut self,
        center: Vec2,
        radius: f32,
        (start, end): (f32, f32),
        segments: u32,
        color: Color,
    ) -> Result<(), BatchError> {
        self.reserve(0, segments as usize)?;
        let step = (end - start) / segments as f32;
        let mut prev = center + Vec2::from_angle(start) * radius;
        for i in 1..=segments {
            let next = center + Vec2::from_angle(start + step * i as f32) * radius;
            self.emit_triangle([
                Vertex::solid(center, color),
                Vertex::solid(prev, color),
                Vertex::solid(next, color),
            ])?;
            prev = next;
        }
        Ok(())
    }
}
