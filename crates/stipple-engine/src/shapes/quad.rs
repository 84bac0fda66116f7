use crate::batch::{Batcher, Vertex};
use crate::coords::{Rect, Vec2};
use crate::error::BatchError;
use crate::paint::Color;

impl Batcher {
    /// Solid quad. Corners are TL, TR, BR, BL (any consistent winding works).
    pub fn quad(&mut self, corners: [Vec2; 4], color: Color) -> Result<(), BatchError> {
        self.quad_colors(corners, [color; 4])
    }

    /// Solid quad with a color per corner, interpolated across the surface.
    pub fn quad_colors(&mut self, corners: [Vec2; 4], colors: [Color; 4]) -> Result<(), BatchError> {
        self.reserve(1, 0)?;
        let vertices = std::array::from_fn(|i| Vertex::solid(corners[i], colors[i]));
        self.emit_quad(vertices)
    }

    /// Quad sampling the bound texture with the current image mode.
    pub fn textured_quad(
        &mut self,
        corners: [Vec2; 4],
        texcoords: [Vec2; 4],
        color: Color,
    ) -> Result<(), BatchError> {
        self.reserve(1, 0)?;
        let weights = self.image_mode().weights();
        let vertices = std::array::from_fn(|i| Vertex::new(corners[i], texcoords[i], color, weights));
        self.emit_quad(vertices)
    }

    pub fn rect(&mut self, rect: Rect, color: Color) -> Result<(), BatchError> {
        self.quad(rect.corners(), color)
    }

    /// Colors are TL, TR, BR, BL.
    pub fn rect_colors(&mut self, rect: Rect, colors: [Color; 4]) -> Result<(), BatchError> {
        self.quad_colors(rect.corners(), colors)
    }
}
