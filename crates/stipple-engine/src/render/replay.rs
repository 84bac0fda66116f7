use crate::batch::{BatchList, GeometryBuffer};
use crate::coords::Affine;
use crate::error::BatchError;

use super::{BindState, RenderBackend};

/// Counters for one [`Batcher::render`](crate::batch::Batcher::render) call.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Geometry was (re)uploaded this render.
    pub uploaded: bool,
    /// `draw_indexed` calls issued.
    pub batches: u32,
    /// `bind_state` calls issued.
    pub binds: u32,
    pub triangles: u32,
}

/// Walks `batches` in replay order and drives `backend`.
pub(crate) fn replay<B>(
    geometry: &mut GeometryBuffer,
    batches: &BatchList,
    backend: &mut B,
    view: Affine,
) -> Result<RenderStats, BatchError>
where
    B: RenderBackend + ?Sized,
{
    let mut stats = RenderStats::default();
    if batches.is_empty() {
        return Ok(stats);
    }

    if geometry.is_dirty() {
        backend.upload_geometry(geometry.vertices(), geometry.indices())?;
        geometry.mark_uploaded();
        stats.uploaded = true;
    }

    let mut rebind = true;
    for batch in batches.replay() {
        if rebind {
            backend.bind_state(&BindState::new(&batch.state, view))?;
            stats.binds += 1;
        }
        backend.draw_indexed(batch.offset, batch.element_count)?;

        stats.batches += 1;
        stats.triangles += batch.element_count;
        rebind = !batch.mergeable_with_next;
    }

    log::debug!(
        "rendered {} batches ({} binds, {} triangles, upload: {})",
        stats.batches,
        stats.binds,
        stats.triangles,
        stats.uploaded
    );
    Ok(stats)
}
