//! stipple engine crate.
//!
//! A 2D draw-command batcher: generators append geometry into state-sorted,
//! layer-ordered batches which are replayed against a rendering backend with minimal
//! state changes. Also hosts the wgpu backend, a fontdue sprite font, and the
//! window/GPU runtime used by the studio.

pub mod atlas;
pub mod batch;
pub mod coords;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod text;
pub mod window;

mod config;
mod error;
mod shapes;

pub use batch::Batcher;
pub use config::BatcherConfig;
pub use error::BatchError;
