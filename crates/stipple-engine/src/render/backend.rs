use std::fmt;

use crate::batch::{BlendMode, DrawState, MaterialId, TextureId, Vertex};
use crate::coords::{Affine, Rect};

/// Everything a backend needs to bind before drawing one batch.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BindState {
    pub material: Option<MaterialId>,
    pub texture: Option<TextureId>,
    pub blend_mode: BlendMode,
    pub scissor: Option<Rect>,
    /// `view * batch.transform`, ready to upload as the vertex-stage uniform.
    pub transform: Affine,
}

impl BindState {
    #[inline]
    pub fn new(state: &DrawState, view: Affine) -> Self {
        Self {
            material: state.material,
            texture: state.texture,
            blend_mode: state.blend_mode,
            scissor: state.scissor,
            transform: view * state.transform,
        }
    }
}

/// Kind of handle a backend failed to resolve.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Material,
    Texture,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Material => f.write_str("material"),
            HandleKind::Texture => f.write_str("texture"),
        }
    }
}

/// Error raised by a [`RenderBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The handle was never created, or was disposed before this frame rendered.
    InvalidHandle { kind: HandleKind, id: u32 },
    /// The underlying graphics API reported a failure.
    Gpu(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::InvalidHandle { kind, id } => write!(f, "invalid {kind} handle {id}"),
            BackendError::Gpu(msg) => write!(f, "gpu error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// Rendering collaborator driven by [`Batcher::render`](crate::batch::Batcher::render).
///
/// Calls arrive strictly in this shape per render:
/// `upload_geometry?` then (`bind_state?` `draw_indexed`)*.
///
/// Handle liveness is the backend's concern; it reports dead handles from `bind_state`.
pub trait RenderBackend {
    /// Replaces the backend's copy of the frame geometry.
    fn upload_geometry(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<(), BackendError>;

    /// Binds material, texture, blend mode, scissor and the combined transform.
    fn bind_state(&mut self, state: &BindState) -> Result<(), BackendError>;

    /// Draws `element_count` triangles starting at triangle `offset`
    /// (indices `offset * 3 .. (offset + element_count) * 3`).
    fn draw_indexed(&mut self, offset: u32, element_count: u32) -> Result<(), BackendError>;
}

impl<B: RenderBackend + ?Sized> RenderBackend for &mut B {
    #[inline]
    fn upload_geometry(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<(), BackendError> {
        (**self).upload_geometry(vertices, indices)
    }

    #[inline]
    fn bind_state(&mut self, state: &BindState) -> Result<(), BackendError> {
        (**self).bind_state(state)
    }

    #[inline]
    fn draw_indexed(&mut self, offset: u32, element_count: u32) -> Result<(), BackendError> {
        (**self).draw_indexed(offset, element_count)
    }
}
