//! Texture references and sub-rectangles of textures, as consumed by the image and
//! text generators.
//!
//! Packing images into atlases is left to the caller; these types only describe the
//! result.

use crate::batch::TextureId;
use crate::coords::{Rect, Vec2};

/// A texture the backend knows about, plus the facts generators need to map into it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureRef {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    /// Rows are stored bottom-up (e.g. render targets on some APIs); generators flip `v`.
    pub flip_v: bool,
}

impl TextureRef {
    #[inline]
    pub const fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            flip_v: false,
        }
    }

    #[inline]
    pub const fn flipped(self) -> Self {
        Self {
            flip_v: !self.flip_v,
            ..self
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// A region of a texture and how it is placed in draw space.
///
/// `texcoords` are in corner order TL, TR, BR, BL so rotated atlas entries can be
/// expressed. `frame` is the draw-space rectangle relative to the draw position: its
/// origin is the trim offset, its size the drawn size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AtlasRegion {
    pub texture: TextureRef,
    pub texcoords: [Vec2; 4],
    pub frame: Rect,
}

impl AtlasRegion {
    /// Region covering `source` (texture pixels) drawn at its natural size.
    pub fn new(texture: TextureRef, source: Rect) -> Self {
        let size = texture.size();
        let (u0, v0) = (source.min().x / size.x.max(1.0), source.min().y / size.y.max(1.0));
        let (u1, v1) = (source.max().x / size.x.max(1.0), source.max().y / size.y.max(1.0));
        Self {
            texture,
            texcoords: [
                Vec2::new(u0, v0),
                Vec2::new(u1, v0),
                Vec2::new(u1, v1),
                Vec2::new(u0, v1),
            ],
            frame: Rect::from_origin_size(Vec2::ZERO, source.size),
        }
    }

    /// The whole texture.
    #[inline]
    pub fn whole(texture: TextureRef) -> Self {
        Self::new(texture, Rect::from_origin_size(Vec2::ZERO, texture.size()))
    }

    /// Same region drawn displaced by `offset` (e.g. trimmed transparent borders).
    #[inline]
    pub fn with_frame_offset(mut self, offset: Vec2) -> Self {
        self.frame.origin = offset;
        self
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.frame.size
    }

    /// Texcoords as the generators emit them, with the texture's row order applied.
    pub fn oriented_texcoords(&self) -> [Vec2; 4] {
        if !self.texture.flip_v {
            return self.texcoords;
        }
        self.texcoords.map(|t| Vec2::new(t.x, 1.0 - t.y))
    }
}
