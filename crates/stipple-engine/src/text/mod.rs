//! Sprite fonts: glyph metrics plus atlas regions, consumed by the text generator.
//!
//! Shaping is out of scope; text is laid out per `char` with pairwise kerning.

mod font_atlas;
mod sprite_font;

pub use font_atlas::{FontAtlas, FontLoadError};
pub use sprite_font::{Glyph, GlyphTable, SpriteFont};
