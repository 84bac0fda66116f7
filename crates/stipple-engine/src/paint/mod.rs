//! Paint model shared between generators and backends.
//!
//! Scope:
//! - vertex color representation (8-bit premultiplied RGBA)
//! - per-vertex texture/color blend weights
//!
//! Geometry types remain in `coords`.

mod color;
mod mode;

pub use color::Color;
pub use mode::{BlendWeights, ImageMode};
