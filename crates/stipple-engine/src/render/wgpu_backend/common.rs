//! GPU-side types and pure conversions shared by the wgpu backend.

use bytemuck::{Pod, Zeroable};

use crate::batch::{BlendMode, ComponentType, VertexAttribute, VertexLayout};
use crate::coords::{Affine, Rect};

// ── blend ─────────────────────────────────────────────────────────────────

/// Fixed-function blend for `mode`. Colors are premultiplied throughout.
///
/// `None` disables blending (source replaces destination).
pub(super) fn blend_state(mode: BlendMode) -> Option<wgpu::BlendState> {
    use wgpu::{BlendComponent, BlendFactor as F, BlendOperation, BlendState};

    let component = |src_factor, dst_factor| BlendComponent {
        src_factor,
        dst_factor,
        operation: BlendOperation::Add,
    };

    match mode {
        BlendMode::Premultiplied => Some(BlendState {
            color: component(F::One, F::OneMinusSrcAlpha),
            alpha: component(F::One, F::OneMinusSrcAlpha),
        }),
        BlendMode::Additive => Some(BlendState {
            color: component(F::One, F::One),
            alpha: component(F::One, F::One),
        }),
        BlendMode::Multiply => Some(BlendState {
            color: component(F::Dst, F::OneMinusSrcAlpha),
            alpha: component(F::DstAlpha, F::OneMinusSrcAlpha),
        }),
        BlendMode::Opaque => None,
    }
}

// ── vertex layout ─────────────────────────────────────────────────────────

/// wgpu format for one attribute of a [`VertexLayout`].
pub(super) fn vertex_format(attr: &VertexAttribute) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as V;
    let format = match (attr.ty, attr.components, attr.normalized) {
        (ComponentType::F32, 1, _) => V::Float32,
        (ComponentType::F32, 2, _) => V::Float32x2,
        (ComponentType::F32, 3, _) => V::Float32x3,
        (ComponentType::F32, 4, _) => V::Float32x4,
        (ComponentType::U8, 2, true) => V::Unorm8x2,
        (ComponentType::U8, 4, true) => V::Unorm8x4,
        (ComponentType::U8, 2, false) => V::Uint8x2,
        (ComponentType::U8, 4, false) => V::Uint8x4,
        _ => return None,
    };
    Some(format)
}

/// Shader locations follow declaration order.
pub(super) fn vertex_attributes(layout: &VertexLayout) -> Vec<wgpu::VertexAttribute> {
    layout
        .attributes
        .iter()
        .enumerate()
        .filter_map(|(location, attr)| {
            let Some(format) = vertex_format(attr) else {
                log::warn!("vertex attribute `{}` has no wgpu format; skipped", attr.name);
                return None;
            };
            Some(wgpu::VertexAttribute {
                format,
                offset: attr.offset as u64,
                shader_location: location as u32,
            })
        })
        .collect()
}

// ── transform uniform ─────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct TransformUniform {
    pub row0: [f32; 4],
    pub row1: [f32; 4],
}

impl From<Affine> for TransformUniform {
    fn from(m: Affine) -> Self {
        let [a, b, c, d, e, f] = m.coeffs();
        Self {
            row0: [a, c, e, 0.0],
            row1: [b, d, f, 0.0],
        }
    }
}

#[inline]
pub(super) fn align_to(value: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    value.div_ceil(alignment) * alignment
}

// ── render target / scissor ───────────────────────────────────────────────

/// Size of the surface the backend is drawing into.
///
/// Scissor rects arrive in logical pixels and are scaled by `scale_factor`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderTargetInfo {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f32,
}

impl Default for RenderTargetInfo {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            scale_factor: 1.0,
        }
    }
}

/// Physical scissor `(x, y, w, h)` for a logical clip rect, clamped to the target.
///
/// `None` clip means the whole target. Returns `None` when the clipped area is empty
/// (draws under it are skipped).
pub(super) fn logical_clip_to_scissor(
    clip: Option<Rect>,
    target: RenderTargetInfo,
) -> Option<(u32, u32, u32, u32)> {
    let (tw, th) = (target.width.max(1), target.height.max(1));
    let scale = target.scale_factor;

    let (x, y, w, h) = match clip {
        None => (0, 0, tw, th),
        Some(r) => {
            let r = r.normalized();
            let x = ((r.min().x * scale).max(0.0) as u32).min(tw);
            let y = ((r.min().y * scale).max(0.0) as u32).min(th);
            let x2 = ((r.max().x * scale).max(0.0) as u32).min(tw);
            let y2 = ((r.max().y * scale).max(0.0) as u32).min(th);
            (x, y, x2.saturating_sub(x), y2.saturating_sub(y))
        }
    };

    if w == 0 || h == 0 { None } else { Some((x, y, w, h)) }
}
