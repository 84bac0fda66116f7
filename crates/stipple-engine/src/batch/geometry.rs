use crate::error::BatchError;

use super::Vertex;

/// Growable vertex + index storage for one frame.
///
/// Growth policy:
/// - capacity starts at the configured minimum on first use
/// - on overflow capacity doubles until the request fits; contents are preserved
/// - `clear` keeps capacity, so a warmed buffer stops allocating
///
/// Invariants (checked in debug builds):
/// - every index is `< vertex_count()` once the shape that wrote it is complete
/// - `indices().len()` is a multiple of 3
#[derive(Debug)]
pub struct GeometryBuffer {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    min_vertex_capacity: usize,
    min_index_capacity: usize,
    dirty: bool,
}

impl GeometryBuffer {
    pub fn new(min_vertex_capacity: usize, min_index_capacity: usize) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            min_vertex_capacity: min_vertex_capacity.max(1),
            min_index_capacity: min_index_capacity.max(3),
            dirty: false,
        }
    }

    /// Drops all geometry. Capacity is retained.
    #[inline]
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.dirty = true;
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.capacity()
    }

    #[inline]
    pub fn index_capacity(&self) -> usize {
        self.indices.capacity()
    }

    /// True if geometry changed since the last [`mark_uploaded`](Self::mark_uploaded).
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_uploaded(&mut self) {
        self.dirty = false;
    }

    /// Forces the next render to upload even if nothing changed.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Ensures room for `additional` more vertices.
    pub fn reserve_vertices(&mut self, additional: usize) -> Result<(), BatchError> {
        grow(&mut self.vertices, additional, self.min_vertex_capacity, "vertex")
    }

    /// Ensures room for `additional` more indices.
    pub fn reserve_indices(&mut self, additional: usize) -> Result<(), BatchError> {
        grow(&mut self.indices, additional, self.min_index_capacity, "index")
    }

    /// Appends indices for one triangle whose 3 vertices will be written next.
    ///
    /// Index values are relative to the vertex count *before* those vertices exist.
    pub(crate) fn append_triangle_indices(&mut self) -> Result<(), BatchError> {
        self.reserve_indices(3)?;
        let base = self.base_index()?;
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
        self.dirty = true;
        Ok(())
    }

    /// Appends indices for one quad `(0,1,2) + (0,2,3)` whose 4 vertices will be written next.
    pub(crate) fn append_quad_indices(&mut self) -> Result<(), BatchError> {
        self.reserve_indices(6)?;
        let base = self.base_index()?;
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        self.dirty = true;
        Ok(())
    }

    /// Writes one triangle. Returns the number of triangles added (always 1).
    pub fn push_triangle(&mut self, vertices: [Vertex; 3]) -> Result<u32, BatchError> {
        self.reserve_vertices(3)?;
        self.append_triangle_indices()?;
        self.vertices.extend_from_slice(&vertices);
        self.debug_check();
        Ok(1)
    }

    /// Writes one quad as two triangles. Returns the number of triangles added (always 2).
    pub fn push_quad(&mut self, vertices: [Vertex; 4]) -> Result<u32, BatchError> {
        self.reserve_vertices(4)?;
        self.append_quad_indices()?;
        self.vertices.extend_from_slice(&vertices);
        self.debug_check();
        Ok(2)
    }

    fn base_index(&self) -> Result<u32, BatchError> {
        u32::try_from(self.vertices.len())
            .map_err(|_| BatchError::OutOfMemory { requested: self.vertices.len() })
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert!(self.indices.len() % 3 == 0);
        debug_assert!(
            self.indices.iter().rev().take(6).all(|&i| (i as usize) < self.vertices.len()),
            "index refers past the vertex count"
        );
    }
}

impl Default for GeometryBuffer {
    fn default() -> Self {
        Self::new(64, 64)
    }
}

fn grow<T>(
    storage: &mut Vec<T>,
    additional: usize,
    min_capacity: usize,
    what: &str,
) -> Result<(), BatchError> {
    let needed = storage
        .len()
        .checked_add(additional)
        .ok_or(BatchError::OutOfMemory { requested: usize::MAX })?;
    if needed <= storage.capacity() {
        return Ok(());
    }

    let mut capacity = storage.capacity().max(min_capacity);
    while capacity < needed {
        capacity = capacity
            .checked_mul(2)
            .ok_or(BatchError::OutOfMemory { requested: needed })?;
    }

    storage
        .try_reserve_exact(capacity - storage.len())
        .map_err(|_| BatchError::OutOfMemory { requested: capacity })?;

    log::debug!("geometry buffer: {what} capacity grown to {}", storage.capacity());
    Ok(())
}
