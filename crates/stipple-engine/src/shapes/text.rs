use crate::batch::Batcher;
use crate::coords::{Rect, Vec2};
use crate::error::BatchError;
use crate::paint::Color;
use crate::text::SpriteFont;

impl Batcher {
    /// Draws `text` with its first line's top-left at `position`.
    ///
    /// `\n` returns to `position.x` and moves down one line height. Glyphs without a
    /// region (spaces) only advance the pen; characters the font lacks are skipped.
    pub fn text<F>(&mut self, font: &F, text: &str, position: Vec2, color: Color) -> Result<(), BatchError>
    where
        F: SpriteFont + ?Sized,
    {
        self.reserve(text.len(), 0)?;
        let mut y = position.y;
        for line in text.split('\n') {
            self.text_line(font, line, Vec2::new(position.x, y), color)?;
            y += font.line_height();
        }
        Ok(())
    }

    /// Draws `text` aligned around `position`.
    ///
    /// Each line is shifted left by `justify.x` of its own width; the block is shifted
    /// up by `justify.y` of its total height. `(0, 0)` matches [`text`](Self::text),
    /// `(0.5, 0.5)` centres, `(1, 1)` anchors the bottom-right.
    pub fn text_justified<F>(
        &mut self,
        font: &F,
        text: &str,
        position: Vec2,
        justify: Vec2,
        color: Color,
    ) -> Result<(), BatchError>
    where
        F: SpriteFont + ?Sized,
    {
        self.reserve(text.len(), 0)?;
        let block = font.measure(text);
        let mut y = position.y - block.y * justify.y;
        for line in text.split('\n') {
            let x = position.x - font.measure_line(line) * justify.x;
            self.text_line(font, line, Vec2::new(x, y), color)?;
            y += font.line_height();
        }
        Ok(())
    }

    fn text_line<F>(&mut self, font: &F, line: &str, origin: Vec2, color: Color) -> Result<(), BatchError>
    where
        F: SpriteFont + ?Sized,
    {
        let mut pen = origin.x;
        let mut prev = None;
        for ch in line.chars() {
            if let Some(p) = prev {
                pen += font.kerning(p, ch);
            }
            prev = Some(ch);

            let Some(glyph) = font.glyph(ch) else { continue };
            if let Some(region) = &glyph.region {
                let at = Vec2::new(pen, origin.y) + glyph.offset + region.frame.origin;
                self.image_stretched(region, Rect::from_origin_size(at, region.frame.size), color)?;
            }
            pen += glyph.advance;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::atlas::{AtlasRegion, TextureRef};
    use crate::batch::{Batcher, TextureId};
    use crate::coords::{Rect, Vec2};
    use crate::paint::Color;
    use crate::text::{Glyph, GlyphTable};

    fn font() -> GlyphTable {
        let tex = TextureRef::new(TextureId(9), 32, 32);
        let mut t = GlyphTable::new(10.0);
        t.insert(
            'a',
            Glyph {
                offset: Vec2::new(1.0, 2.0),
                advance: 6.0,
                region: Some(AtlasRegion::new(tex, Rect::new(0.0, 0.0, 4.0, 5.0))),
            },
        );
        t.insert(' ', Glyph { offset: Vec2::ZERO, advance: 3.0, region: None });
        t.set_kerning('a', 'a', -1.0);
        t
    }

    fn glyph_origins(b: &Batcher) -> Vec<Vec2> {
        b.geometry().vertices().chunks(4).map(|q| q[0].position()).collect()
    }

    #[test]
    fn glyphs_advance_with_kerning_and_offsets() {
        let mut b = Batcher::default();
        b.text(&font(), "aa a", Vec2::new(10.0, 20.0), Color::WHITE).unwrap();
        assert_eq!(
            glyph_origins(&b),
            vec![Vec2::new(11.0, 22.0), Vec2::new(16.0, 22.0), Vec2::new(25.0, 22.0)]
        );
        assert_eq!(b.state().texture, Some(TextureId(9)));
    }

    #[test]
    fn newline_resets_x_and_advances_y() {
        let mut b = Batcher::default();
        b.text(&font(), "a\na", Vec2::ZERO, Color::WHITE).unwrap();
        assert_eq!(glyph_origins(&b), vec![Vec2::new(1.0, 2.0), Vec2::new(1.0, 12.0)]);
    }

    #[test]
    fn unknown_characters_are_skipped() {
        let mut b = Batcher::default();
        b.text(&font(), "?a", Vec2::ZERO, Color::WHITE).unwrap();
        assert_eq!(glyph_origins(&b), vec![Vec2::new(1.0, 2.0)]);
    }

    #[test]
    fn justified_text_centres_each_line() {
        let mut b = Batcher::default();
        // "a" is 6 wide, "aa" is 11; block is 20 high.
        b.text_justified(&font(), "a\naa", Vec2::new(50.0, 50.0), Vec2::new(0.5, 0.5), Color::WHITE)
            .unwrap();
        assert_eq!(
            glyph_origins(&b),
            vec![Vec2::new(48.0, 42.0), Vec2::new(45.5, 52.0), Vec2::new(50.5, 52.0)]
        );
    }
}
