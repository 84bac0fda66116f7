/// Per-corner radii of a rounded rectangle, in logical pixels.
///
/// Order is top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    pub const ZERO: Self = Self::uniform(0.0);

    #[inline]
    pub const fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    #[inline]
    pub const fn uniform(r: f32) -> Self {
        Self::new(r, r, r, r)
    }

    /// `[top_left, top_right, bottom_right, bottom_left]`
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    /// Each radius clamped to `0..=max`. NaN becomes 0.
    pub fn clamped(self, max: f32) -> Self {
        let max = max.max(0.0);
        let c = |r: f32| if r.is_nan() { 0.0 } else { r.clamp(0.0, max) };
        Self::new(
            c(self.top_left),
            c(self.top_right),
            c(self.bottom_right),
            c(self.bottom_left),
        )
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.to_array().iter().all(|r| *r <= 0.0)
    }
}

impl From<f32> for CornerRadii {
    #[inline]
    fn from(r: f32) -> Self {
        Self::uniform(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_limits_each_corner() {
        let r = CornerRadii::new(-2.0, 4.0, 30.0, f32::NAN).clamped(10.0);
        assert_eq!(r.to_array(), [0.0, 4.0, 10.0, 0.0]);
    }

    #[test]
    fn zero_detection() {
        assert!(CornerRadii::ZERO.is_zero());
        assert!(CornerRadii::uniform(-1.0).is_zero());
        assert!(!CornerRadii::new(0.0, 0.0, 0.5, 0.0).is_zero());
    }
}
