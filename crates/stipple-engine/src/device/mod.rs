//! GPU device + surface management for the on-screen runtime.
//!
//! - creates the wgpu Instance/Adapter/Device/Queue
//! - creates & configures the Surface (swapchain)
//! - acquires frames and maps surface errors to runtime actions

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
