/// 8-bit premultiplied RGBA color, stored per vertex.
///
/// Invariant:
/// - `rgb` components are already multiplied by `a`.
///
/// The default blend mode composites with `One, OneMinusSrcAlpha`, so a straight-alpha
/// color passed here would show fringes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::from_premul(0, 0, 0, 0);
    pub const BLACK: Color = Color::from_premul(0, 0, 0, 255);
    pub const WHITE: Color = Color::from_premul(255, 255, 255, 255);
    pub const RED: Color = Color::from_premul(255, 0, 0, 255);
    pub const GREEN: Color = Color::from_premul(0, 255, 0, 255);
    pub const BLUE: Color = Color::from_premul(0, 0, 255, 255);

    /// Creates a color from already-premultiplied components.
    #[inline]
    pub const fn from_premul(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from `0xRRGGBB`.
    #[inline]
    pub const fn from_hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 255,
        }
    }

    /// Creates a premultiplied color from straight-alpha bytes.
    #[inline]
    pub fn from_straight(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: premul_channel(r, a),
            g: premul_channel(g, a),
            b: premul_channel(b, a),
            a,
        }
    }

    /// Creates a premultiplied color from straight-alpha `f32` components in `[0, 1]`.
    #[inline]
    pub fn from_straight_f32(r: f32, g: f32, b: f32, a: f32) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::from_straight(q(r), q(g), q(b), q(a))
    }

    /// Scales all channels (including alpha) by `alpha` in `[0, 1]`.
    ///
    /// For a premultiplied color this is the correct way to fade it.
    #[inline]
    pub fn with_opacity(self, alpha: f32) -> Self {
        let k = alpha.clamp(0.0, 1.0);
        let s = |v: u8| (v as f32 * k).round() as u8;
        Self { r: s(self.r), g: s(self.g), b: s(self.b), a: s(self.a) }
    }

    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns the color as normalized premultiplied `f32` components.
    #[inline]
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

#[inline]
fn premul_channel(c: u8, a: u8) -> u8 {
    // (c * a + 127) / 255 without overflow
    ((c as u16 * a as u16 + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_straight_premultiplies() {
        let c = Color::from_straight(255, 128, 0, 128);
        assert_eq!(c, Color::from_premul(128, 64, 0, 128));
    }

    #[test]
    fn opaque_straight_is_unchanged() {
        assert_eq!(Color::from_straight(10, 20, 30, 255), Color::from_premul(10, 20, 30, 255));
    }

    #[test]
    fn hex_is_opaque() {
        assert_eq!(Color::from_hex(0x336699), Color::from_premul(0x33, 0x66, 0x99, 255));
    }

    #[test]
    fn half_opacity_halves_all_channels() {
        assert_eq!(Color::WHITE.with_opacity(0.5), Color::from_premul(128, 128, 128, 128));
    }
}
