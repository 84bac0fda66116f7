//! wgpu implementation of [`RenderBackend`](super::RenderBackend).

mod backend;
mod common;

pub use backend::WgpuBackend;
pub use common::RenderTargetInfo;
