use crate::config::BatcherConfig;
use crate::coords::{Affine, Rect, Vec2};
use crate::error::BatchError;
use crate::paint::ImageMode;
use crate::render::{self, RenderBackend, RenderStats};

use super::{
    Batch, BatchList, BlendMode, DrawState, GeometryBuffer, MaterialId, TextureId,
    TransformGuard, TransformStack, Vertex,
};

/// Accumulates 2D geometry into state-sorted, layer-ordered batches and replays them
/// against a [`RenderBackend`].
///
/// Frame lifecycle:
/// 1. set state (`set_layer`, `set_texture`, ...) and call generators (`rect`, `image`, ...)
/// 2. [`render`](Self::render)
/// 3. [`clear`](Self::clear) before the next frame
///
/// The batcher is long-lived: buffers keep their capacity across `clear`.
///
/// Upload tracking is per batcher, not per backend: a render uploads only geometry
/// that changed since the previous render. Call
/// [`invalidate_upload`](Self::invalidate_upload) before rendering into a different
/// backend.
///
/// Not internally synchronised. Share it across threads only behind your own lock.
#[derive(Debug)]
pub struct Batcher {
    config: BatcherConfig,
    geometry: GeometryBuffer,
    batches: BatchList,
    pub(super) transforms: TransformStack,
    image_mode: ImageMode,
}

impl Batcher {
    pub fn new(config: BatcherConfig) -> Self {
        let geometry =
            GeometryBuffer::new(config.initial_vertex_capacity, config.initial_index_capacity);
        Self {
            config,
            geometry,
            batches: BatchList::new(),
            transforms: TransformStack::new(),
            image_mode: ImageMode::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    /// Discards all geometry and batches and resets draw state to defaults.
    ///
    /// Also empties the transform stack, so a frame abandoned mid-way (e.g. after an
    /// error) can be recovered by clearing.
    pub fn clear(&mut self) {
        self.geometry.clear();
        self.batches.clear();
        self.transforms.clear();
        self.image_mode = ImageMode::default();
    }

    // ── draw state ────────────────────────────────────────────────────────

    /// Current layer. Higher layers replay first (are drawn underneath lower ones).
    #[inline]
    pub fn layer(&self) -> i32 {
        self.batches.open().layer
    }

    /// State of the open batch.
    #[inline]
    pub fn state(&self) -> &DrawState {
        &self.batches.open().state
    }

    pub fn set_layer(&mut self, layer: i32) {
        self.batches.set_layer(layer);
    }

    pub fn set_material(&mut self, material: Option<MaterialId>) {
        self.update_state(|s| s.material = material);
    }

    pub fn set_blend_mode(&mut self, blend_mode: BlendMode) {
        self.update_state(|s| s.blend_mode = blend_mode);
    }

    /// GPU-side transform for subsequent geometry, composed with the view at render time.
    ///
    /// Unlike [`push_transform`](Self::push_transform), this does not touch vertex positions.
    pub fn set_transform(&mut self, transform: Affine) {
        self.update_state(|s| s.transform = transform);
    }

    pub fn set_texture(&mut self, texture: Option<TextureId>) {
        self.update_state(|s| s.texture = texture);
    }

    pub fn set_scissor(&mut self, scissor: Option<Rect>) {
        self.update_state(|s| s.scissor = scissor);
    }

    /// How textured generators (`image`, `text`) weight texture against color.
    #[inline]
    pub fn set_image_mode(&mut self, mode: ImageMode) {
        self.image_mode = mode;
    }

    #[inline]
    pub fn image_mode(&self) -> ImageMode {
        self.image_mode
    }

    fn update_state(&mut self, f: impl FnOnce(&mut DrawState)) {
        let mut next = *self.state();
        f(&mut next);
        self.batches.apply_state(next);
    }

    // ── transform stack ───────────────────────────────────────────────────

    /// Pushes `local` on top of the current CPU transform; popped when the guard drops.
    pub fn push_transform(&mut self, local: Affine) -> TransformGuard<'_> {
        self.transforms.push(local);
        TransformGuard::new(self)
    }

    /// Pushes `absolute` as the CPU transform, ignoring any parent.
    pub fn push_absolute_transform(&mut self, absolute: Affine) -> TransformGuard<'_> {
        self.transforms.push_absolute(absolute);
        TransformGuard::new(self)
    }

    /// Runs `f` with `local` pushed, propagating its result.
    pub fn with_transform<R>(&mut self, local: Affine, f: impl FnOnce(&mut Batcher) -> R) -> R {
        let mut guard = self.push_transform(local);
        f(&mut *guard)
    }

    /// Composite CPU transform applied to generator input points.
    #[inline]
    pub fn transform(&self) -> Affine {
        self.transforms.current()
    }

    #[inline]
    pub fn transform_depth(&self) -> usize {
        self.transforms.depth()
    }

    // ── inspection ────────────────────────────────────────────────────────

    #[inline]
    pub fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }

    #[inline]
    pub fn batch_list(&self) -> &BatchList {
        &self.batches
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.geometry.vertex_count()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.geometry.triangle_count()
    }

    /// Batches a render would draw.
    #[inline]
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Batches in the order [`render`](Self::render) replays them.
    pub fn batches(&self) -> impl Iterator<Item = Batch> + '_ {
        self.batches.replay()
    }

    // ── rendering ─────────────────────────────────────────────────────────

    /// Makes the next [`render`](Self::render) upload geometry again.
    ///
    /// Needed when switching backends, since each keeps its own copy of the buffers.
    pub fn invalidate_upload(&mut self) {
        self.geometry.mark_dirty();
    }

    /// Replays every batch against `backend`.
    ///
    /// `view` is composed after each batch's own transform (`view * batch.transform`).
    /// Geometry is uploaded only if it changed since the previous render, whichever
    /// backend that was; see [`invalidate_upload`](Self::invalidate_upload).
    ///
    /// # Panics
    /// Panics if the transform stack is not empty (a guard is still alive, or one was leaked).
    pub fn render<B>(&mut self, backend: &mut B, view: Affine) -> Result<RenderStats, BatchError>
    where
        B: RenderBackend + ?Sized,
    {
        assert!(
            self.transforms.is_empty(),
            "Batcher::render called with {} transform(s) still pushed",
            self.transforms.depth()
        );
        render::replay(&mut self.geometry, &self.batches, backend, view)
    }

    // ── emission primitives used by generators ────────────────────────────

    /// Writes a quad after applying the CPU transform to its positions.
    pub(crate) fn emit_quad(&mut self, mut vertices: [Vertex; 4]) -> Result<(), BatchError> {
        let m = self.transforms.current();
        for v in &mut vertices {
            transform_vertex(m, v);
        }
        let added = self.geometry.push_quad(vertices)?;
        self.batches.add_elements(added);
        Ok(())
    }

    /// Writes a triangle after applying the CPU transform to its positions.
    pub(crate) fn emit_triangle(&mut self, mut vertices: [Vertex; 3]) -> Result<(), BatchError> {
        let m = self.transforms.current();
        for v in &mut vertices {
            transform_vertex(m, v);
        }
        let added = self.geometry.push_triangle(vertices)?;
        self.batches.add_elements(added);
        Ok(())
    }

    /// Reserves room for `quads` quads and `triangles` triangles up front.
    pub(crate) fn reserve(&mut self, quads: usize, triangles: usize) -> Result<(), BatchError> {
        self.geometry.reserve_vertices(quads * 4 + triangles * 3)?;
        self.geometry.reserve_indices(quads * 6 + triangles * 3)
    }
}

impl Default for Batcher {
    fn default() -> Self {
        Self::new(BatcherConfig::default())
    }
}

#[inline]
fn transform_vertex(m: Affine, v: &mut Vertex) {
    if m.is_identity() {
        return;
    }
    let p = m.transform_point(Vec2::new(v.pos[0], v.pos[1]));
    v.pos = [p.x, p.y];
}
