//! Coordinate and geometry types shared by the batcher, generators and backends.
//!
//! Canonical CPU space:
//! - Logical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Backends receive a combined affine transform per batch and apply it in the
//! vertex stage; no NDC conversion happens on the CPU.

mod affine;
mod corner_radii;
mod rect;
mod vec2;
mod viewport;

pub use affine::Affine;
pub use corner_radii::CornerRadii;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
