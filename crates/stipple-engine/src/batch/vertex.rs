use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::{BlendWeights, Color};

/// Vertex written by every generator.
///
/// Layout (24 bytes):
///
///  offset  0  pos      [f32; 2]
///  offset  8  tex      [f32; 2]
///  offset 16  color    [u8; 4]   premultiplied RGBA, normalized
///  offset 20  multiply u8        normalized
///  offset 21  wash     u8        normalized
///  offset 22  fill     u8        normalized
///  offset 23  _pad     u8
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub tex: [f32; 2],
    pub color: [u8; 4],
    pub multiply: u8,
    pub wash: u8,
    pub fill: u8,
    pub _pad: u8,
}

impl Vertex {
    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: std::mem::size_of::<Vertex>() as u32,
        attributes: &[
            VertexAttribute {
                name: "pos",
                semantic: VertexSemantic::Position,
                components: 2,
                ty: ComponentType::F32,
                normalized: false,
                offset: 0,
            },
            VertexAttribute {
                name: "tex",
                semantic: VertexSemantic::TexCoord,
                components: 2,
                ty: ComponentType::F32,
                normalized: false,
                offset: 8,
            },
            VertexAttribute {
                name: "color",
                semantic: VertexSemantic::Color,
                components: 4,
                ty: ComponentType::U8,
                normalized: true,
                offset: 16,
            },
            // multiply, wash, fill + one padding byte
            VertexAttribute {
                name: "weights",
                semantic: VertexSemantic::BlendWeights,
                components: 4,
                ty: ComponentType::U8,
                normalized: true,
                offset: 20,
            },
        ],
    };

    #[inline]
    pub fn new(pos: Vec2, tex: Vec2, color: Color, weights: BlendWeights) -> Self {
        Self {
            pos: [pos.x, pos.y],
            tex: [tex.x, tex.y],
            color: color.to_array(),
            multiply: weights.multiply,
            wash: weights.wash,
            fill: weights.fill,
            _pad: 0,
        }
    }

    /// Untextured vertex (fill weight only).
    #[inline]
    pub fn solid(pos: Vec2, color: Color) -> Self {
        Self::new(pos, Vec2::ZERO, color, BlendWeights::SOLID)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.pos[0], self.pos[1])
    }

    #[inline]
    pub fn weights(&self) -> BlendWeights {
        BlendWeights::new(self.multiply, self.wash, self.fill)
    }
}

/// What a vertex attribute means to the shading stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    Position,
    TexCoord,
    Color,
    BlendWeights,
}

/// Scalar type of each component of an attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    F32,
    U8,
}

impl ComponentType {
    #[inline]
    pub const fn size(self) -> u32 {
        match self {
            ComponentType::F32 => 4,
            ComponentType::U8 => 1,
        }
    }
}

/// One attribute of a statically declared vertex layout.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub semantic: VertexSemantic,
    pub components: u8,
    pub ty: ComponentType,
    /// Integer components are read as `[0, 1]` floats when set.
    pub normalized: bool,
    /// Byte offset from the start of the vertex.
    pub offset: u32,
}

impl VertexAttribute {
    #[inline]
    pub const fn byte_size(&self) -> u32 {
        self.components as u32 * self.ty.size()
    }
}

/// Vertex layout handed to a rendering backend when it creates buffers and pipelines.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: u32,
    pub attributes: &'static [VertexAttribute],
}

impl VertexLayout {
    /// Returns the attribute carrying `semantic`, if the layout declares one.
    pub fn find(&self, semantic: VertexSemantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.semantic == semantic)
    }
}
