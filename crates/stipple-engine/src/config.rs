/// Tunables for a [`Batcher`](crate::batch::Batcher).
///
/// None of these affect correctness; they trade memory and tessellation quality
/// against speed.
#[derive(Debug, Clone, PartialEq)]
pub struct BatcherConfig {
    /// Vertex capacity allocated on first use. Growth doubles from here.
    pub initial_vertex_capacity: usize,

    /// Index capacity allocated on first use. Growth doubles from here.
    pub initial_index_capacity: usize,

    /// Lower bound on triangles per tessellated corner / circle quadrant.
    pub min_corner_segments: u32,

    /// Upper bound on triangles per corner / quadrant, whatever the radius.
    pub max_corner_segments: u32,

    /// Radius (logical px) covered by one segment before another is added.
    ///
    /// Segment count is `max(min_corner_segments, radius / corner_segment_divisor)`,
    /// capped at `max_corner_segments`.
    pub corner_segment_divisor: f32,
}

impl BatcherConfig {
    /// Segment count for an arc of `radius` logical pixels.
    #[inline]
    pub fn corner_segments(&self, radius: f32) -> u32 {
        let divisor = self.corner_segment_divisor.max(f32::EPSILON);
        let by_radius = (radius.max(0.0) / divisor) as u32;
        by_radius
            .min(self.max_corner_segments)
            .max(self.min_corner_segments)
            .max(1)
    }
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            initial_vertex_capacity: 64,
            initial_index_capacity: 64,
            min_corner_segments: 3,
            max_corner_segments: 256,
            corner_segment_divisor: 4.0,
        }
    }
}
