use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::batch::Batcher;
use crate::coords::{CornerRadii, Rect, Vec2};
use crate::error::BatchError;
use crate::paint::Color;

impl Batcher {
    /// Filled rectangle with quarter-circle corners.
    ///
    /// Geometry:
    /// - five quads: centre plus one per edge, meeting at each corner's arc centre
    /// - one triangle fan per corner with a non-zero radius
    ///
    /// Radii are clamped to half the shorter side. All-zero radii emit a plain rect.
    pub fn rounded_rect(
        &mut self,
        rect: Rect,
        radii: impl Into<CornerRadii>,
        color: Color,
    ) -> Result<(), BatchError> {
        let rect = rect.normalized();
        let (w, h) = (rect.width(), rect.height());
        let r = radii.into().clamped(w.min(h) * 0.5);
        if r.is_zero() {
            return self.rect(rect, color);
        }

        let fans: u32 = r
            .to_array()
            .iter()
            .filter(|r| **r > 0.0)
            .map(|r| self.config().corner_segments(*r))
            .fold(0, u32::saturating_add);
        self.reserve(5, fans as usize)?;

        let (x0, y0) = (rect.min().x, rect.min().y);
        let (x1, y1) = (rect.max().x, rect.max().y);
        let p = |x: f32, y: f32| Vec2::new(x, y);

        // Arc centres.
        let tl = p(x0 + r.top_left, y0 + r.top_left);
        let tr = p(x1 - r.top_right, y0 + r.top_right);
        let br = p(x1 - r.bottom_right, y1 - r.bottom_right);
        let bl = p(x0 + r.bottom_left, y1 - r.bottom_left);

        self.quad([tl, tr, br, bl], color)?;
        self.quad([p(tl.x, y0), p(tr.x, y0), tr, tl], color)?;
        self.quad([tr, p(x1, tr.y), p(x1, br.y), br], color)?;
        self.quad([bl, br, p(br.x, y1), p(bl.x, y1)], color)?;
        self.quad([p(x0, tl.y), tl, bl, p(x0, bl.y)], color)?;

        let corners = [
            (tl, r.top_left, (PI, PI + FRAC_PI_2)),
            (tr, r.top_right, (PI + FRAC_PI_2, TAU)),
            (br, r.bottom_right, (0.0, FRAC_PI_2)),
            (bl, r.bottom_left, (FRAC_PI_2, PI)),
        ];
        for (center, radius, angles) in corners {
            if radius > 0.0 {
                let segments = self.config().corner_segments(radius);
                self.arc_fan(center, radius, angles, segments, color)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::batch::Batcher;
    use crate::coords::{CornerRadii, Rect, Vec2};
    use crate::paint::Color;

    fn bounds(b: &Batcher) -> (Vec2, Vec2) {
        b.geometry().vertices().iter().fold(
            (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
            |(lo, hi), v| {
                let p = v.position();
                (Vec2::new(lo.x.min(p.x), lo.y.min(p.y)), Vec2::new(hi.x.max(p.x), hi.y.max(p.y)))
            },
        )
    }

    #[test]
    fn uniform_radius_uses_five_quads_and_four_fans() {
        let mut b = Batcher::default();
        b.rounded_rect(Rect::new(0.0, 0.0, 100.0, 50.0), 8.0, Color::RED).unwrap();
        // 5 quads (10 tris) + 4 corners x 3 segments
        assert_eq!(b.triangle_count(), 22);
        assert_eq!(bounds(&b), (Vec2::ZERO, Vec2::new(100.0, 50.0)));
    }

    #[test]
    fn zero_radius_corners_emit_no_fan() {
        let mut b = Batcher::default();
        let radii = CornerRadii::new(8.0, 0.0, 0.0, 8.0);
        b.rounded_rect(Rect::new(0.0, 0.0, 100.0, 50.0), radii, Color::RED).unwrap();
        assert_eq!(b.triangle_count(), 16);
    }

    #[test]
    fn all_zero_radii_fall_back_to_a_rect() {
        let mut b = Batcher::default();
        b.rounded_rect(Rect::new(0.0, 0.0, 10.0, 10.0), CornerRadii::ZERO, Color::RED).unwrap();
        assert_eq!(b.triangle_count(), 2);
    }

    #[test]
    fn radii_are_clamped_to_half_the_short_side() {
        let mut b = Batcher::default();
        b.rounded_rect(Rect::new(0.0, 0.0, 40.0, 20.0), 100.0, Color::RED).unwrap();
        assert_eq!(bounds(&b), (Vec2::ZERO, Vec2::new(40.0, 20.0)));
        // clamped radius 10 -> 3 segments per corner
        assert_eq!(b.triangle_count(), 22);
    }

    #[test]
    fn huge_radii_are_capped_not_overflowed() {
        let mut b = Batcher::default();
        b.rounded_rect(Rect::new(0.0, 0.0, 4.0e10, 4.0e10), 2.0e10, Color::RED).unwrap();
        assert_eq!(b.triangle_count(), 10 + 4 * 256);
    }
}
