//! # Pipeline: The Sprite Render Pipeline
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │ RenderPipeline                                         │
//! │  Shader module ─── vs_main + fs_main from shader.wgsl  │
//! │  Vertex layout ─── SpriteVertex { position, uv }       │
//! │  group 0: screen uniform (mat4x4, vertex-only)         │
//! │  group 1: texture + sampler (fragment-only)            │
//! │  Blend ─── ALPHA_BLENDING, no depth buffer             │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Sprites are pixel art, so the sampler uses nearest filtering. Quads are
//! drawn in submission order with alpha blending; later copies paint over
//! earlier ones.

use wgpu::util::DeviceExt;

use super::gpu::GpuContext;
use super::vertex::{ScreenUniform, SpriteVertex};

/// GPU resources shared by every sprite draw.
pub(crate) struct SpriteRenderer {
    pub pipeline: wgpu::RenderPipeline,
    pub texture_bind_group_layout: wgpu::BindGroupLayout,
    pub screen_bind_group: wgpu::BindGroup,
    pub sampler: wgpu::Sampler,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
}

impl SpriteRenderer {
    /// `width`×`height` is the logical screen the game draws into.
    pub fn new(gpu: &GpuContext, width: f32, height: f32) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let screen_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("screen bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("texture bind group layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
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
            label: Some("sprite pipeline layout"),
            bind_group_layouts: &[&screen_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SpriteVertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
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
            multiview: None,
            cache: None,
        });

        let screen_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("screen uniform buffer"),
            contents: bytemuck::cast_slice(&[ScreenUniform::new(width, height)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("screen bind group"),
            layout: &screen_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            pipeline,
            texture_bind_group_layout,
            screen_bind_group,
            sampler,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    /// Upload this frame's geometry, growing the buffers when they are too
    /// small.
    pub fn upload(&mut self, gpu: &GpuContext, vertices: &[SpriteVertex], indices: &[u32]) {
        write_or_grow(
            gpu,
            &mut self.vertex_buffer,
            "sprite vertex buffer",
            wgpu::BufferUsages::VERTEX,
            bytemuck::cast_slice(vertices),
        );
        write_or_grow(
            gpu,
            &mut self.index_buffer,
            "sprite index buffer",
            wgpu::BufferUsages::INDEX,
            bytemuck::cast_slice(indices),
        );
    }

    /// Vertex and index buffers from the last [`upload`](Self::upload).
    pub fn buffers(&self) -> Option<(&wgpu::Buffer, &wgpu::Buffer)> {
        Some((self.vertex_buffer.as_ref()?, self.index_buffer.as_ref()?))
    }
}

fn write_or_grow(
    gpu: &GpuContext,
    slot: &mut Option<wgpu::Buffer>,
    label: &str,
    usage: wgpu::BufferUsages,
    bytes: &[u8],
) {
    let len = bytes.len() as wgpu::BufferAddress;
    if slot.as_ref().is_some_and(|buffer| buffer.size() < len) {
        *slot = None;
    }
    let buffer = slot.get_or_insert_with(|| {
        let size = len.next_power_of_two().max(wgpu::COPY_BUFFER_ALIGNMENT);
        log::debug!("Allocating {label}, {size} bytes");
        gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    });
    gpu.queue.write_buffer(buffer, 0, bytes);
}
