use crate::atlas::AtlasRegion;
use crate::batch::Batcher;
use crate::coords::{Rect, Vec2};
use crate::error::BatchError;
use crate::paint::Color;

impl Batcher {
    /// Draws `region` at its natural size with its frame offset applied at `position`.
    ///
    /// Binds the region's texture (splitting the batch if another texture was bound).
    pub fn image(&mut self, region: &AtlasRegion, position: Vec2, color: Color) -> Result<(), BatchError> {
        let dest = Rect::from_origin_size(position + region.frame.origin, region.frame.size);
        self.image_stretched(region, dest, color)
    }

    /// Draws `region` stretched to fill `dest`. The frame offset is ignored.
    pub fn image_stretched(&mut self, region: &AtlasRegion, dest: Rect, color: Color) -> Result<(), BatchError> {
        self.set_texture(Some(region.texture.id));
        self.textured_quad(dest.corners(), region.oriented_texcoords(), color)
    }
}
