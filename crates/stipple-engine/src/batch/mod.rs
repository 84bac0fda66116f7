//! Batching core.
//!
//! Responsibilities:
//! - store frame geometry (`GeometryBuffer`)
//! - track draw state and split batches on change (`Batcher` setters → `BatchList::apply_state`)
//! - keep batches in layer order with stable ties (`BatchList`)
//! - own the CPU transform stack and its scope guards
//!
//! Shape emitters live in `crate::shapes` as further `impl Batcher` blocks.

mod batch;
mod batcher;
mod geometry;
mod list;
mod state;
mod transform_stack;
mod vertex;

pub use batch::Batch;
pub use batcher::Batcher;
pub use geometry::GeometryBuffer;
pub use list::{BatchId, BatchList};
pub use state::{BlendMode, DrawState, MaterialId, TextureId};
pub use transform_stack::{TransformGuard, TransformStack};
pub use vertex::{ComponentType, Vertex, VertexAttribute, VertexLayout, VertexSemantic};
