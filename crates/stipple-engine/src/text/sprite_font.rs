use std::collections::HashMap;

use crate::atlas::AtlasRegion;
use crate::coords::Vec2;

/// Placement of one character.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Top-left of the glyph bitmap relative to the pen position at the top of the line.
    pub offset: Vec2,
    /// Horizontal pen advance after this glyph.
    pub advance: f32,
    /// `None` for glyphs with nothing to draw (spaces).
    pub region: Option<AtlasRegion>,
}

/// Per-character glyph source for [`Batcher::text`](crate::batch::Batcher::text).
pub trait SpriteFont {
    fn glyph(&self, ch: char) -> Option<&Glyph>;

    /// Extra advance between `left` and `right` when they are adjacent.
    fn kerning(&self, _left: char, _right: char) -> f32 {
        0.0
    }

    fn line_height(&self) -> f32;

    /// Pen advance of a single line; `\n` is not expected here.
    fn measure_line(&self, line: &str) -> f32 {
        let mut width = 0.0;
        let mut prev = None;
        for ch in line.chars() {
            if let Some(p) = prev {
                width += self.kerning(p, ch);
            }
            if let Some(g) = self.glyph(ch) {
                width += g.advance;
            }
            prev = Some(ch);
        }
        width
    }

    /// Widest line by number of lines times the line height.
    fn measure(&self, text: &str) -> Vec2 {
        let mut width = 0.0f32;
        let mut lines = 0;
        for line in text.split('\n') {
            width = width.max(self.measure_line(line));
            lines += 1;
        }
        Vec2::new(width, lines as f32 * self.line_height())
    }
}

/// In-memory [`SpriteFont`]: glyphs and kerning pairs in hash maps.
#[derive(Debug, Clone, Default)]
pub struct GlyphTable {
    glyphs: HashMap<char, Glyph>,
    kerning: HashMap<(char, char), f32>,
    line_height: f32,
}

impl GlyphTable {
    pub fn new(line_height: f32) -> Self {
        Self {
            line_height,
            ..Self::default()
        }
    }

    pub fn insert(&mut self, ch: char, glyph: Glyph) {
        self.glyphs.insert(ch, glyph);
    }

    /// Zero entries are not stored.
    pub fn set_kerning(&mut self, left: char, right: char, amount: f32) {
        if amount == 0.0 {
            self.kerning.remove(&(left, right));
        } else {
            self.kerning.insert((left, right), amount);
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub(crate) fn glyphs_mut(&mut self) -> impl Iterator<Item = (&char, &mut Glyph)> {
        self.glyphs.iter_mut()
    }
}

impl SpriteFont for GlyphTable {
    fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    fn kerning(&self, left: char, right: char) -> f32 {
        self.kerning.get(&(left, right)).copied().unwrap_or(0.0)
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> GlyphTable {
        let mut t = GlyphTable::new(10.0);
        for ch in ['A', 'V', ' '] {
            t.insert(ch, Glyph { offset: Vec2::ZERO, advance: 6.0, region: None });
        }
        t.set_kerning('A', 'V', -1.5);
        t
    }

    #[test]
    fn measure_line_applies_kerning_to_adjacent_pairs() {
        let t = table();
        assert_eq!(t.measure_line("AV"), 10.5);
        assert_eq!(t.measure_line("VA"), 12.0);
        assert_eq!(t.measure_line("A V"), 18.0);
    }

    #[test]
    fn unknown_characters_advance_nothing() {
        assert_eq!(table().measure_line("A?"), 6.0);
    }

    #[test]
    fn measure_spans_lines() {
        let size = table().measure("AVA\nA");
        assert_eq!(size, Vec2::new(16.5, 20.0));
    }

    #[test]
    fn zero_kerning_is_removed() {
        let mut t = table();
        t.set_kerning('A', 'V', 0.0);
        assert_eq!(t.kerning('A', 'V'), 0.0);
    }
}
