//! Geometry generators.
//!
//! Each generator is an inherent method on [`Batcher`](crate::batch::Batcher) that:
//! - reserves the geometry it is about to write
//! - applies the transform-stack composite to every position
//! - appends quads/triangles to the open batch
//!
//! Solid shapes use fill-only weights, so they never touch the bound texture and never
//! split a textured batch. Image and text generators bind their texture through
//! `set_texture` and use the current [`ImageMode`](crate::paint::ImageMode).

mod circle;
mod hollow_rect;
mod image;
mod line;
mod quad;
mod rounded_rect;
mod text;
mod triangle;
