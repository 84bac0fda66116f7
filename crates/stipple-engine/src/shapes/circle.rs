use std::f32::consts::TAU;

use crate::batch::Batcher;
use crate::coords::Vec2;
use crate::error::BatchError;
use crate::paint::Color;

impl Batcher {
    /// Filled circle as a triangle fan; four quadrants of `corner_segments(radius)` each.
    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color) -> Result<(), BatchError> {
        if radius <= 0.0 || !radius.is_finite() {
            return Ok(());
        }
        let segments = self.config().corner_segments(radius).saturating_mul(4);
        self.arc_fan(center, radius, (0.0, TAU), segments, color)
    }
}

#[cfg(test)]
mod tests {
    use crate::batch::Batcher;
    use crate::coords::Vec2;
    use crate::paint::Color;

    #[test]
    fn segment_count_follows_config() {
        let mut b = Batcher::default();
        b.circle(Vec2::new(50.0, 50.0), 40.0, Color::RED).unwrap();
        assert_eq!(b.triangle_count(), 40);
    }

    #[test]
    fn all_rim_vertices_sit_on_the_radius() {
        let mut b = Batcher::default();
        let c = Vec2::new(5.0, 5.0);
        b.circle(c, 8.0, Color::RED).unwrap();
        for (i, v) in b.geometry().vertices().iter().enumerate() {
            let d = (v.position() - c).length();
            if i % 3 == 0 {
                assert_eq!(d, 0.0);
            } else {
                assert!((d - 8.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn non_positive_radius_draws_nothing() {
        let mut b = Batcher::default();
        b.circle(Vec2::ZERO, 0.0, Color::RED).unwrap();
        b.circle(Vec2::ZERO, -3.0, Color::RED).unwrap();
        assert_eq!(b.triangle_count(), 0);
    }

    #[test]
    fn huge_radius_is_capped_not_overflowed() {
        let mut b = Batcher::default();
        b.circle(Vec2::ZERO, 2.0e10, Color::RED).unwrap();
        assert_eq!(b.triangle_count(), 256 * 4);
    }
}
