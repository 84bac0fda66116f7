use crate::coords::{Affine, Rect};

/// Opaque material handle (a shader/pipeline variant owned by the backend).
///
/// The batcher only compares handles; it never looks inside them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// Opaque texture handle owned by the backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Framebuffer blend equation for a batch.
///
/// Colors are premultiplied, so every mode is expressed for premultiplied sources.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// `src + dst * (1 - src.a)`
    #[default]
    Premultiplied,
    /// `src + dst`
    Additive,
    /// `src * dst + dst * (1 - src.a)`
    Multiply,
    /// `src` (no blending)
    Opaque,
}

/// The GPU-bindable state shared by every triangle of a batch.
///
/// Two batches are "state-identical" when their `DrawState`s compare equal.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DrawState {
    /// `None` selects the backend's default material.
    pub material: Option<MaterialId>,
    pub blend_mode: BlendMode,
    /// Applied on the GPU, after the CPU-side transform stack.
    pub transform: Affine,
    /// `None` binds the backend's 1×1 white texture.
    pub texture: Option<TextureId>,
    /// `None` disables scissoring.
    pub scissor: Option<Rect>,
}
