use std::collections::HashMap;
use std::ops::Range;

use crate::atlas::TextureRef;
use crate::batch::{BlendMode, MaterialId, TextureId, Vertex, VertexLayout};
use crate::paint::Color;
use crate::render::{BackendError, BindState, HandleKind, RenderBackend};

use super::common::{
    align_to, blend_state, logical_clip_to_scissor, vertex_attributes, RenderTargetInfo,
    TransformUniform,
};

const MIN_VERTEX_CAPACITY: usize = 1024;
const MIN_INDEX_CAPACITY: usize = 1536;
const MIN_UNIFORM_SLOTS: usize = 64;

type PipelineKey = (Option<MaterialId>, BlendMode);

struct GpuTexture {
    // Kept alive for the bind group.
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

enum PassCommand {
    Bind {
        pipeline: PipelineKey,
        texture: Option<TextureId>,
        scissor: Option<(u32, u32, u32, u32)>,
        uniform_slot: u32,
    },
    Draw {
        indices: Range<u32>,
    },
}

/// [`RenderBackend`] that records a render pass and encodes it on demand.
///
/// Per frame:
/// 1. [`set_target`](Self::set_target) with the surface size
/// 2. `Batcher::render(&mut backend, view)` uploads geometry and records commands
/// 3. [`encode`](Self::encode) writes the transform uniforms and replays the commands
///    into a render pass on the given encoder
///
/// Resources:
/// - one pipeline per (material, blend mode), built on first bind
/// - vertex/index buffers grown to the next power of two
/// - one dynamic-offset uniform slot per `bind_state`
/// - a 1×1 white texture bound when a batch has no texture
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,

    vertex_stride: u64,
    vertex_attributes: Vec<wgpu::VertexAttribute>,

    default_shader: wgpu::ShaderModule,
    materials: HashMap<MaterialId, wgpu::ShaderModule>,
    next_material: u32,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    texture_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    textures: HashMap<TextureId, GpuTexture>,
    next_texture: u32,

    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: usize,
    index_buffer: Option<wgpu::Buffer>,
    index_capacity: usize,

    uniform_bgl: wgpu::BindGroupLayout,
    uniform_stride: u64,
    uniform_buffer: Option<wgpu::Buffer>,
    uniform_bind_group: Option<wgpu::BindGroup>,
    uniform_capacity: usize,
    uniforms: Vec<TransformUniform>,

    target: RenderTargetInfo,
    commands: Vec<PassCommand>,
}

impl WgpuBackend {
    /// Creates a backend rendering `layout` vertices into `format` targets.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        layout: &VertexLayout,
    ) -> Self {
        let default_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stipple batch shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/batch.wgsl").into()),
        });

        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("stipple transform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<TransformUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("stipple texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("stipple pipeline layout"),
            bind_group_layouts: &[&uniform_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("stipple sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let white = upload_texture(
            device,
            queue,
            &texture_bgl,
            &sampler,
            "stipple white texture",
            (1, 1),
            &[255, 255, 255, 255],
        );

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = align_to(std::mem::size_of::<TransformUniform>() as u64, alignment);

        Self {
            device: device.clone(),
            queue: queue.clone(),
            format,
            vertex_stride: layout.stride as u64,
            vertex_attributes: vertex_attributes(layout),
            default_shader,
            materials: HashMap::new(),
            next_material: 0,
            pipeline_layout,
            pipelines: HashMap::new(),
            texture_bgl,
            sampler,
            white,
            textures: HashMap::new(),
            next_texture: 0,
            vertex_buffer: None,
            vertex_capacity: 0,
            index_buffer: None,
            index_capacity: 0,
            uniform_bgl,
            uniform_stride,
            uniform_buffer: None,
            uniform_bind_group: None,
            uniform_capacity: 0,
            uniforms: Vec::new(),
            target: RenderTargetInfo::default(),
            commands: Vec::new(),
        }
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Size of the target the next pass draws into; used to resolve scissor rects.
    pub fn set_target(&mut self, target: RenderTargetInfo) {
        self.target = target;
    }

    // ── resources ─────────────────────────────────────────────────────────

    /// Uploads premultiplied RGBA8 `pixels` as a new texture.
    pub fn create_texture(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<TextureRef, BackendError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(BackendError::Gpu(format!(
                "texture {width}x{height} needs {expected} bytes, got {}",
                pixels.len()
            )));
        }

        let id = TextureId(self.next_texture);
        self.next_texture += 1;

        let label = format!("stipple texture {}", id.0);
        let texture = upload_texture(
            &self.device,
            &self.queue,
            &self.texture_bgl,
            &self.sampler,
            &label,
            (width, height),
            pixels,
        );
        self.textures.insert(id, texture);

        log::debug!("created texture {} ({width}x{height})", id.0);
        Ok(TextureRef::new(id, width, height))
    }

    /// Releases a texture; later binds of it fail with `InvalidHandle`.
    pub fn dispose_texture(&mut self, texture: TextureId) -> bool {
        self.textures.remove(&texture).is_some()
    }

    /// Size of a live texture.
    pub fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&texture).map(|t| (t.width, t.height))
    }

    /// Registers a WGSL shader as a material.
    ///
    /// The module must expose `vs_main`/`fs_main` with the same interface and bind
    /// groups as the default batch shader.
    pub fn register_material(&mut self, label: &str, wgsl: &str) -> MaterialId {
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(wgsl.into()),
        });
        let id = MaterialId(self.next_material);
        self.next_material += 1;
        self.materials.insert(id, module);
        id
    }

    /// Releases a material and its pipelines; later binds fail with `InvalidHandle`.
    pub fn dispose_material(&mut self, material: MaterialId) -> bool {
        self.pipelines.retain(|(m, _), _| *m != Some(material));
        self.materials.remove(&material).is_some()
    }

    // ── encoding ──────────────────────────────────────────────────────────

    /// Replays commands recorded since the last `encode` into one render pass on `view`.
    ///
    /// `clear` selects `LoadOp::Clear` instead of loading the existing contents.
    pub fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, clear: Option<Color>) {
        if self.commands.is_empty() && clear.is_none() {
            return;
        }

        self.write_uniforms();

        let load = match clear {
            Some(c) => {
                let [r, g, b, a] = c.to_f32();
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: r as f64,
                    g: g as f64,
                    b: b as f64,
                    a: a as f64,
                })
            }
            None => wgpu::LoadOp::Load,
        };

        let commands = std::mem::take(&mut self.commands);
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("stipple batch pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let (Some(vbo), Some(ibo)) = (self.vertex_buffer.as_ref(), self.index_buffer.as_ref()) {
                rpass.set_vertex_buffer(0, vbo.slice(..));
                rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
            }

            // Draws are skipped until a bind succeeds.
            let mut drawable = false;
            for cmd in &commands {
                match cmd {
                    PassCommand::Bind {
                        pipeline,
                        texture,
                        scissor,
                        uniform_slot,
                    } => {
                        drawable = false;
                        let Some(pipeline) = self.pipelines.get(pipeline) else { continue };
                        let Some(uniforms) = self.uniform_bind_group.as_ref() else { continue };
                        let Some((sx, sy, sw, sh)) = *scissor else { continue };
                        let texture = match texture {
                            Some(id) => match self.textures.get(id) {
                                Some(t) => t,
                                None => {
                                    log::warn!("texture {} disposed before encode; draws skipped", id.0);
                                    continue;
                                }
                            },
                            None => &self.white,
                        };

                        let offset = (*uniform_slot as u64 * self.uniform_stride) as u32;
                        rpass.set_pipeline(pipeline);
                        rpass.set_bind_group(0, uniforms, &[offset]);
                        rpass.set_bind_group(1, &texture.bind_group, &[]);
                        rpass.set_scissor_rect(sx, sy, sw, sh);
                        drawable = true;
                    }
                    PassCommand::Draw { indices } => {
                        if drawable {
                            rpass.draw_indexed(indices.clone(), 0, 0..1);
                        }
                    }
                }
            }
        }

        self.commands = commands;
        self.commands.clear();
        self.uniforms.clear();
    }

    // ── lazy-init helpers ─────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let (material, blend_mode) = key;
        let shader = match material.and_then(|m| self.materials.get(&m)) {
            Some(module) => module,
            None => &self.default_shader,
        };

        let label = format!("stipple pipeline {material:?}/{blend_mode:?}");
        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: self.vertex_stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &self.vertex_attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: blend_state(blend_mode),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("created {label}");
        self.pipelines.insert(key, pipeline);
    }

    fn ensure_geometry_capacity(&mut self, vertices: usize, indices: usize) {
        if vertices > self.vertex_capacity || self.vertex_buffer.is_none() {
            let cap = vertices.next_power_of_two().max(MIN_VERTEX_CAPACITY);
            self.vertex_buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("stipple vertex buffer"),
                size: cap as u64 * self.vertex_stride,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.vertex_capacity = cap;
            log::debug!("vertex buffer grown to {cap} vertices");
        }

        if indices > self.index_capacity || self.index_buffer.is_none() {
            let cap = indices.next_power_of_two().max(MIN_INDEX_CAPACITY);
            self.index_buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("stipple index buffer"),
                size: (cap * std::mem::size_of::<u32>()) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.index_capacity = cap;
            log::debug!("index buffer grown to {cap} indices");
        }
    }

    fn write_uniforms(&mut self) {
        if self.uniforms.is_empty() {
            return;
        }

        if self.uniforms.len() > self.uniform_capacity || self.uniform_buffer.is_none() {
            let cap = self.uniforms.len().next_power_of_two().max(MIN_UNIFORM_SLOTS);
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("stipple transform ubo"),
                size: cap as u64 * self.uniform_stride,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("stipple transform bind group"),
                layout: &self.uniform_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(std::mem::size_of::<TransformUniform>() as u64),
                    }),
                }],
            });
            self.uniform_buffer = Some(buffer);
            self.uniform_bind_group = Some(bind_group);
            self.uniform_capacity = cap;
        }

        let Some(buffer) = self.uniform_buffer.as_ref() else { return };
        let stride = self.uniform_stride as usize;
        let mut staging = vec![0u8; self.uniforms.len() * stride];
        for (slot, u) in self.uniforms.iter().enumerate() {
            let at = slot * stride;
            staging[at..at + std::mem::size_of::<TransformUniform>()].copy_from_slice(bytemuck::bytes_of(u));
        }
        self.queue.write_buffer(buffer, 0, &staging);
    }
}

impl RenderBackend for WgpuBackend {
    fn upload_geometry(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<(), BackendError> {
        self.ensure_geometry_capacity(vertices.len(), indices.len());
        let (Some(vbo), Some(ibo)) = (self.vertex_buffer.as_ref(), self.index_buffer.as_ref()) else {
            return Err(BackendError::Gpu("geometry buffers unavailable".into()));
        };
        self.queue.write_buffer(vbo, 0, bytemuck::cast_slice(vertices));
        self.queue.write_buffer(ibo, 0, bytemuck::cast_slice(indices));
        Ok(())
    }

    fn bind_state(&mut self, state: &BindState) -> Result<(), BackendError> {
        if let Some(m) = state.material {
            if !self.materials.contains_key(&m) {
                return Err(BackendError::InvalidHandle {
                    kind: HandleKind::Material,
                    id: m.0,
                });
            }
        }
        if let Some(t) = state.texture {
            if !self.textures.contains_key(&t) {
                return Err(BackendError::InvalidHandle {
                    kind: HandleKind::Texture,
                    id: t.0,
                });
            }
        }

        let key = (state.material, state.blend_mode);
        self.ensure_pipeline(key);

        let scissor = logical_clip_to_scissor(state.scissor, self.target);
        if scissor.is_none() {
            log::trace!("scissor {:?} is empty; batch skipped", state.scissor);
        }

        let uniform_slot = self.uniforms.len() as u32;
        self.uniforms.push(TransformUniform::from(state.transform));
        self.commands.push(PassCommand::Bind {
            pipeline: key,
            texture: state.texture,
            scissor,
            uniform_slot,
        });
        Ok(())
    }

    fn draw_indexed(&mut self, offset: u32, element_count: u32) -> Result<(), BackendError> {
        let start = offset * 3;
        self.commands.push(PassCommand::Draw {
            indices: start..start + element_count * 3,
        });
        Ok(())
    }
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &str,
    (width, height): (u32, u32),
    pixels: &[u8],
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    GpuTexture {
        _texture: texture,
        bind_group,
        width,
        height,
    }
}
