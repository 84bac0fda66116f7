//! Single-window runtime hosting a batcher on screen.
//!
//! Owns the `winit` event loop and window, wires them to the GPU layer, and calls
//! [`App::on_frame`] on every redraw.

mod app;
mod runtime;

pub use app::{App, AppControl, FrameCtx};
pub use runtime::{Runtime, RuntimeConfig};
