//! Backend that records calls instead of touching a GPU.

use std::collections::HashSet;

use crate::batch::{MaterialId, TextureId, Vertex};

use super::{BackendError, BindState, HandleKind, RenderBackend};

/// One recorded [`RenderBackend`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Upload { vertices: usize, indices: usize },
    Bind(BindState),
    Draw { offset: u32, element_count: u32 },
}

/// [`RenderBackend`] that records every call and keeps a copy of the last upload.
///
/// Handles can be marked as disposed to exercise `InvalidHandle` propagation.
///
/// # Example
///
/// ```rust
/// use stipple_engine::batch::Batcher;
/// use stipple_engine::coords::{Affine, Rect};
/// use stipple_engine::paint::Color;
/// use stipple_engine::render::{BackendCall, RecordingBackend};
///
/// let mut batcher = Batcher::default();
/// batcher.rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE)?;
///
/// let mut backend = RecordingBackend::new();
/// batcher.render(&mut backend, Affine::IDENTITY)?;
///
/// assert_eq!(backend.draws(), vec![(0, 2)]);
/// assert!(matches!(backend.calls()[0], BackendCall::Upload { vertices: 4, indices: 6 }));
/// # Ok::<(), stipple_engine::BatchError>(())
/// ```
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    disposed_materials: HashSet<MaterialId>,
    disposed_textures: HashSet<TextureId>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes later binds of `material` fail with [`BackendError::InvalidHandle`].
    pub fn dispose_material(&mut self, material: MaterialId) {
        self.disposed_materials.insert(material);
    }

    /// Makes later binds of `texture` fail with [`BackendError::InvalidHandle`].
    pub fn dispose_texture(&mut self, texture: TextureId) {
        self.disposed_textures.insert(texture);
    }

    #[inline]
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Forgets recorded calls; the last upload is kept.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Vertices from the most recent upload.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Indices from the most recent upload.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn upload_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Upload { .. }))
            .count()
    }

    pub fn binds(&self) -> Vec<BindState> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Bind(state) => Some(*state),
                _ => None,
            })
            .collect()
    }

    /// `(offset, element_count)` of every draw, in call order.
    pub fn draws(&self) -> Vec<(u32, u32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Draw {
                    offset,
                    element_count,
                } => Some((*offset, *element_count)),
                _ => None,
            })
            .collect()
    }

    /// Index slice covered by a recorded draw.
    pub fn draw_indices(&self, offset: u32, element_count: u32) -> &[u32] {
        let start = offset as usize * 3;
        let end = (offset + element_count) as usize * 3;
        &self.indices[start..end]
    }
}

impl RenderBackend for RecordingBackend {
    fn upload_geometry(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<(), BackendError> {
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
        self.indices.clear();
        self.indices.extend_from_slice(indices);
        self.calls.push(BackendCall::Upload {
            vertices: vertices.len(),
            indices: indices.len(),
        });
        Ok(())
    }

    fn bind_state(&mut self, state: &BindState) -> Result<(), BackendError> {
        if let Some(material) = state.material.filter(|m| self.disposed_materials.contains(m)) {
            return Err(BackendError::InvalidHandle {
                kind: HandleKind::Material,
                id: material.0,
            });
        }
        if let Some(texture) = state.texture.filter(|t| self.disposed_textures.contains(t)) {
            return Err(BackendError::InvalidHandle {
                kind: HandleKind::Texture,
                id: texture.0,
            });
        }
        self.calls.push(BackendCall::Bind(*state));
        Ok(())
    }

    fn draw_indexed(&mut self, offset: u32, element_count: u32) -> Result<(), BackendError> {
        self.calls.push(BackendCall::Draw {
            offset,
            element_count,
        });
        Ok(())
    }
}
