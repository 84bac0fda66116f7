use std::time::Duration;

use winit::event::WindowEvent;
use winit::window::Window;

use crate::coords::Viewport;
use crate::device::{Gpu, GpuFrame, SurfaceErrorAction};
use crate::paint::Color;
use crate::render::RenderTargetInfo;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application hosted by [`Runtime`](super::Runtime).
pub trait App {
    /// Called once the window and GPU exist, before the first frame.
    fn on_start(&mut self, gpu: &Gpu<'_>) -> anyhow::Result<()> {
        let _ = gpu;
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}

/// Per-frame context passed to [`App::on_frame`].
///
/// Lifetimes:
/// - `'a` is the duration of the callback
/// - `'w` is the window borrow carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub frame_index: u64,
    /// Time since the runtime started.
    pub elapsed: Duration,
    pub clear_color: Color,
}

impl FrameCtx<'_, '_> {
    /// Window size in logical pixels.
    pub fn viewport(&self) -> Viewport {
        let logical: winit::dpi::LogicalSize<f32> =
            self.window.inner_size().to_logical(self.window.scale_factor());
        Viewport::new(logical.width, logical.height)
    }

    /// Physical target size, for scissor resolution in the backend.
    pub fn target_info(&self) -> RenderTargetInfo {
        let size = self.gpu.size();
        RenderTargetInfo {
            width: size.width,
            height: size.height,
            scale_factor: self.window.scale_factor() as f32,
        }
    }

    /// Acquires the surface, lets `draw` record into its encoder, then presents.
    ///
    /// Surface errors are handled here; only fatal ones end the app.
    pub fn present<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return AppControl::Continue;
        }

        let mut frame: GpuFrame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    _ => AppControl::Continue,
                };
            }
        };

        draw(&mut frame.encoder, &frame.view);

        self.window.pre_present_notify();
        self.gpu.submit(frame);
        AppControl::Continue
    }
}
