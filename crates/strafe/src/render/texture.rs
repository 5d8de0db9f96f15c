//! # Texture: Image Data on the GPU
//!
//! The game never holds a `wgpu::Texture`. It holds a
//! [`TextureHandle`](crate::assets::TextureHandle), an index into the
//! [`TextureStore`], which owns the bind groups the shader samples from.
//!
//! ```text
//! TextureStore
//! ┌──────────────────────────────────────────┐
//! │ entries: Vec<TextureEntry>               │
//! │   [0] "resources/images/background.png"  │
//! │   [1] "resources/images/player.png"      │
//! │   ...                                    │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Path deduplication lives one level up, in the
//! [`TextureCache`](crate::assets::TextureCache); the store uploads whatever
//! it is given.

use wgpu::util::DeviceExt;

use crate::assets::TextureHandle;

use super::gpu::GpuContext;
use super::pipeline::SpriteRenderer;

/// One uploaded texture.
pub(crate) struct TextureEntry {
    pub bind_group: wgpu::BindGroup,
    pub width: u32,
    pub height: u32,
}

#[derive(Default)]
pub(crate) struct TextureStore {
    entries: Vec<TextureEntry>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&TextureEntry> {
        self.entries.get(handle.0)
    }

    /// Upload RGBA8 pixels and return the handle of the new entry.
    pub fn create(
        &mut self,
        gpu: &GpuContext,
        renderer: &SpriteRenderer,
        label: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> TextureHandle {
        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &renderer.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&renderer.sampler),
                },
            ],
        });

        let handle = TextureHandle(self.entries.len());
        self.entries.push(TextureEntry {
            bind_group,
            width,
            height,
        });
        handle
    }
}
