//! Render replay and the rendering-backend seam.
//!
//! The batcher never talks to a graphics API directly. At `render` time it walks its
//! batches in replay order and drives a [`RenderBackend`]:
//! - `upload_geometry` once, only if geometry changed since the last upload
//! - `bind_state` for every batch whose predecessor is not mergeable with it
//! - `draw_indexed` once per batch
//!
//! Backends shipped here:
//! - [`WgpuBackend`]: records a pass and encodes it into a wgpu command encoder
//! - [`RecordingBackend`]: captures every call, for tests and headless inspection

mod backend;
mod recording;
mod replay;
mod wgpu_backend;

pub use backend::{BackendError, BindState, HandleKind, RenderBackend};
pub use recording::{BackendCall, RecordingBackend};
pub use replay::RenderStats;
pub use wgpu_backend::{RenderTargetInfo, WgpuBackend};

pub(crate) use replay::replay;
