use std::collections::HashMap;
use std::fmt;

use crate::atlas::{AtlasRegion, TextureRef};
use crate::coords::{Rect, Vec2};

use super::{Glyph, GlyphTable, SpriteFont};

const MIN_ATLAS_SIZE: u32 = 128;
const MAX_ATLAS_SIZE: u32 = 4096;

/// Error returned by [`FontAtlas::build`].
#[derive(Debug, Clone, PartialEq)]
pub enum FontLoadError {
    /// fontdue rejected the font bytes.
    Parse(String),
    /// The rasterized charset does not fit a `MAX_ATLAS_SIZE` square.
    AtlasFull { glyphs: usize, px: f32 },
}

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontLoadError::Parse(msg) => write!(f, "font load error: {msg}"),
            FontLoadError::AtlasFull { glyphs, px } => write!(
                f,
                "font load error: {glyphs} glyphs at {px}px do not fit a \
                 {MAX_ATLAS_SIZE}x{MAX_ATLAS_SIZE} atlas"
            ),
        }
    }
}

impl std::error::Error for FontLoadError {}

/// A font rasterized once at a fixed pixel size into a single RGBA bitmap.
///
/// Lifecycle:
/// 1. [`build`](Self::build) rasterizes the charset and packs it (CPU only)
/// 2. the caller uploads [`pixels`](Self::pixels) as a texture through its backend
/// 3. [`with_texture`](Self::with_texture) attaches that texture to every glyph region
///
/// Before step 3 glyphs still advance the pen but draw nothing.
///
/// Pixels are premultiplied white: `[c, c, c, c]` for coverage `c`, so the atlas works
/// under both `ImageMode::Normal` and `ImageMode::Wash`.
#[derive(Debug, Clone)]
pub struct FontAtlas {
    table: GlyphTable,
    placements: HashMap<char, Rect>,
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    px: f32,
    texture: Option<TextureRef>,
}

impl FontAtlas {
    /// Rasterizes `charset` from TrueType/OpenType `bytes` at `px` pixels per em.
    ///
    /// Characters the font has no glyph for are skipped. `padding` transparent pixels
    /// separate packed glyphs.
    pub fn build(
        bytes: &[u8],
        px: f32,
        charset: impl IntoIterator<Item = char>,
        padding: u32,
    ) -> Result<Self, FontLoadError> {
        let settings = fontdue::FontSettings {
            scale: px,
            ..fontdue::FontSettings::default()
        };
        let font = fontdue::Font::from_bytes(bytes, settings)
            .map_err(|e| FontLoadError::Parse(e.to_string()))?;

        let (ascent, line_height) = match font.horizontal_line_metrics(px) {
            Some(m) => (m.ascent, m.new_line_size),
            None => (px, px * 1.2),
        };

        let mut chars: Vec<char> = charset
            .into_iter()
            .filter(|ch| *ch == ' ' || font.lookup_glyph_index(*ch) != 0)
            .collect();
        chars.sort_unstable();
        chars.dedup();

        let mut table = GlyphTable::new(line_height);
        let mut bitmaps = Vec::with_capacity(chars.len());
        for &ch in &chars {
            let (metrics, coverage) = font.rasterize(ch, px);
            let top = ascent - (metrics.ymin as f32 + metrics.height as f32);
            table.insert(
                ch,
                Glyph {
                    offset: Vec2::new(metrics.xmin as f32, top),
                    advance: metrics.advance_width,
                    region: None,
                },
            );
            if metrics.width > 0 && metrics.height > 0 {
                bitmaps.push((ch, metrics.width as u32, metrics.height as u32, coverage));
            }
        }

        for &left in &chars {
            for &right in &chars {
                if let Some(k) = font.horizontal_kern(left, right, px) {
                    table.set_kerning(left, right, k);
                }
            }
        }

        // Tallest first keeps shelves tight.
        bitmaps.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
        let sizes: Vec<(u32, u32)> = bitmaps.iter().map(|(_, w, h, _)| (*w, *h)).collect();
        let (width, height, positions) =
            pack(&sizes, padding).ok_or(FontLoadError::AtlasFull { glyphs: chars.len(), px })?;

        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        let mut placements = HashMap::with_capacity(bitmaps.len());
        for ((ch, w, h, coverage), (x, y)) in bitmaps.iter().zip(&positions) {
            blit(&mut pixels, width, (*x, *y), (*w, *h), coverage);
            placements.insert(*ch, Rect::new(*x as f32, *y as f32, *w as f32, *h as f32));
        }

        log::debug!(
            "built font atlas: {} glyphs at {px}px into {width}x{height}",
            chars.len()
        );

        Ok(Self {
            table,
            placements,
            pixels,
            width,
            height,
            px,
            texture: None,
        })
    }

    /// Attaches the uploaded atlas texture to every drawable glyph.
    pub fn with_texture(mut self, texture: TextureRef) -> Self {
        if texture.width != self.width || texture.height != self.height {
            log::warn!(
                "font atlas is {}x{} but bound texture is {}x{}",
                self.width,
                self.height,
                texture.width,
                texture.height
            );
        }
        let atlas = TextureRef {
            width: self.width,
            height: self.height,
            ..texture
        };
        for (ch, glyph) in self.table.glyphs_mut() {
            glyph.region = self
                .placements
                .get(ch)
                .map(|source| AtlasRegion::new(atlas, *source));
        }
        self.texture = Some(texture);
        self
    }

    /// RGBA8 premultiplied, row-major, `width * height * 4` bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn px(&self) -> f32 {
        self.px
    }

    #[inline]
    pub fn texture(&self) -> Option<TextureRef> {
        self.texture
    }
}

impl SpriteFont for FontAtlas {
    #[inline]
    fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.table.glyph(ch)
    }

    #[inline]
    fn kerning(&self, left: char, right: char) -> f32 {
        self.table.kerning(left, right)
    }

    #[inline]
    fn line_height(&self) -> f32 {
        self.table.line_height()
    }
}

/// Shelf-packs `sizes` into the smallest power-of-two square that holds them.
///
/// Returns `(width, height, top-left per size)`; height is trimmed to the next power of
/// two above the last shelf.
fn pack(sizes: &[(u32, u32)], padding: u32) -> Option<(u32, u32, Vec<(u32, u32)>)> {
    let mut size = MIN_ATLAS_SIZE;
    while size <= MAX_ATLAS_SIZE {
        if let Some((used, positions)) = pack_into(sizes, padding, size) {
            let height = used.next_power_of_two().clamp(1, size);
            return Some((size, height, positions));
        }
        size *= 2;
    }
    None
}

fn pack_into(sizes: &[(u32, u32)], padding: u32, size: u32) -> Option<(u32, Vec<(u32, u32)>)> {
    let mut cursor_x = padding;
    let mut cursor_y = padding;
    let mut row_height = 0;
    let mut positions = Vec::with_capacity(sizes.len());

    for &(w, h) in sizes {
        if w + 2 * padding > size {
            return None;
        }
        // New shelf when the glyph doesn't fit horizontally.
        if cursor_x + w + padding > size {
            cursor_y += row_height + padding;
            cursor_x = padding;
            row_height = 0;
        }
        if cursor_y + h + padding > size {
            return None;
        }
        positions.push((cursor_x, cursor_y));
        cursor_x += w + padding;
        row_height = row_height.max(h);
    }

    Some((cursor_y + row_height + padding, positions))
}

fn blit(pixels: &mut [u8], stride: u32, (x, y): (u32, u32), (w, h): (u32, u32), coverage: &[u8]) {
    for row in 0..h {
        for col in 0..w {
            let c = coverage[(row * w + col) as usize];
            let at = (((y + row) * stride + x + col) * 4) as usize;
            pixels[at..at + 4].copy_from_slice(&[c, c, c, c]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::TextureId;

    fn atlas_with(placements: &[(char, Rect)]) -> FontAtlas {
        let mut table = GlyphTable::new(12.0);
        for (ch, _) in placements {
            table.insert(*ch, Glyph { offset: Vec2::ZERO, advance: 5.0, region: None });
        }
        table.insert(' ', Glyph { offset: Vec2::ZERO, advance: 3.0, region: None });
        FontAtlas {
            table,
            placements: placements.iter().copied().collect(),
            pixels: vec![0; 64 * 64 * 4],
            width: 64,
            height: 64,
            px: 12.0,
            texture: None,
        }
    }

    #[test]
    fn invalid_bytes_are_a_parse_error() {
        let err = FontAtlas::build(b"not a font", 16.0, 'a'..='z', 1).unwrap_err();
        assert!(matches!(err, FontLoadError::Parse(_)));
    }

    #[test]
    fn shelves_wrap_when_the_row_is_full() {
        let (_, positions) = pack_into(&[(60, 10), (60, 8), (10, 4)], 1, 128).unwrap();
        assert_eq!(positions, vec![(1, 1), (62, 1), (1, 12)]);
    }

    #[test]
    fn pack_grows_the_square_until_everything_fits() {
        let sizes = vec![(100, 100); 4];
        let (w, h, positions) = pack(&sizes, 1).unwrap();
        assert_eq!(w, 256);
        assert_eq!(h, 256);
        assert_eq!(positions.len(), 4);
    }

    #[test]
    fn pack_gives_up_beyond_the_maximum() {
        assert!(pack(&[(MAX_ATLAS_SIZE, 1)], 1).is_none());
    }

    #[test]
    fn blit_writes_premultiplied_white() {
        let mut pixels = vec![0u8; 4 * 4 * 4];
        blit(&mut pixels, 4, (1, 2), (2, 1), &[10, 200]);
        let at = |x: usize, y: usize| &pixels[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
        assert_eq!(at(1, 2), &[10, 10, 10, 10]);
        assert_eq!(at(2, 2), &[200, 200, 200, 200]);
        assert_eq!(at(0, 0), &[0, 0, 0, 0]);
    }

    #[test]
    fn binding_a_texture_fills_regions() {
        let atlas = atlas_with(&[('a', Rect::new(16.0, 0.0, 8.0, 16.0))]);
        assert!(atlas.glyph('a').unwrap().region.is_none());

        let atlas = atlas.with_texture(TextureRef::new(TextureId(3), 64, 64));
        let region = atlas.glyph('a').unwrap().region.unwrap();
        assert_eq!(region.texture.id, TextureId(3));
        assert_eq!(region.texcoords[0], Vec2::new(0.25, 0.0));
        assert_eq!(region.frame.size, Vec2::new(8.0, 16.0));
        assert!(atlas.glyph(' ').unwrap().region.is_none());
    }
}
