//! # GpuCanvas: Copies Batched into wgpu Draws
//!
//! Between `clear` and `present` the canvas only records. Each copy becomes a
//! quad appended to one shared vertex buffer, and consecutive copies of the
//! same texture share one `draw_indexed`:
//!
//! ```text
//!  copy(bg)  copy(ship)  copy(ufo)  copy(ufo)  copy(bullet)
//!  └─ batch ┘└─ batch ──┘└──── batch ────────┘└── batch ──┘
//! ```
//!
//! Batches are never reordered, so the picture matches the order the copies
//! were issued in.

use std::sync::Arc;

use crate::assets::{Texture, TextureFactory, TextureHandle};
use crate::math::Rect;

use super::gpu::GpuContext;
use super::pipeline::SpriteRenderer;
use super::texture::TextureStore;
use super::vertex::{SpriteVertex, quad_indices};
use super::{Canvas, RenderError};

/// A run of consecutive quads sharing one texture.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawBatch {
    texture: TextureHandle,
    index_start: u32,
    index_count: u32,
}

/// Pending geometry for one frame.
#[derive(Debug, Default)]
struct FrameGeometry {
    vertices: Vec<SpriteVertex>,
    indices: Vec<u32>,
    batches: Vec<DrawBatch>,
}

impl FrameGeometry {
    fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.batches.clear();
    }

    fn push_quad(&mut self, texture: TextureHandle, corners: [SpriteVertex; 4]) {
        let base = self.vertices.len() as u32;
        let index_start = self.indices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices.extend_from_slice(&quad_indices(base));

        match self.batches.last_mut() {
            Some(batch) if batch.texture == texture => batch.index_count += 6,
            _ => self.batches.push(DrawBatch {
                texture,
                index_start,
                index_count: 6,
            }),
        }
    }
}

/// The window's canvas: GPU context, sprite pipeline, and uploaded textures.
pub struct GpuCanvas {
    gpu: GpuContext,
    renderer: SpriteRenderer,
    textures: TextureStore,
    clear_color: wgpu::Color,
    frame: FrameGeometry,
}

impl GpuCanvas {
    /// Create the canvas for `window`. Game coordinates span
    /// `width`×`height` regardless of the window's physical size.
    pub fn new(
        window: Arc<winit::window::Window>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let gpu = GpuContext::new(window)?;
        let renderer = SpriteRenderer::new(&gpu, width as f32, height as f32);
        log::info!(
            "GPU canvas ready: {width}x{height} logical, surface {:?} {:?}",
            gpu.surface_size(),
            gpu.surface_format()
        );
        Ok(Self {
            gpu,
            renderer,
            textures: TextureStore::new(),
            clear_color: wgpu::Color::WHITE,
            frame: FrameGeometry::default(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    fn submit(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if !self.frame.batches.is_empty() {
            self.renderer
                .upload(&self.gpu, &self.frame.vertices, &self.frame.indices);
        }

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("strafe frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sprite pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let (false, Some((vertices, indices))) =
                (self.frame.batches.is_empty(), self.renderer.buffers())
            {
                pass.set_pipeline(&self.renderer.pipeline);
                pass.set_bind_group(0, &self.renderer.screen_bind_group, &[]);
                pass.set_vertex_buffer(0, vertices.slice(..));
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);

                for batch in &self.frame.batches {
                    let Some(entry) = self.textures.get(batch.texture) else {
                        continue;
                    };
                    pass.set_bind_group(1, &entry.bind_group, &[]);
                    pass.draw_indexed(
                        batch.index_start..batch.index_start + batch.index_count,
                        0,
                        0..1,
                    );
                }
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl Canvas for GpuCanvas {
    fn clear(&mut self, color: [f32; 4]) {
        let [r, g, b, a] = color.map(f64::from);
        self.clear_color = wgpu::Color { r, g, b, a };
        self.frame.clear();
    }

    fn copy(&mut self, texture: &Texture, src: Rect, dst: Rect) {
        if dst.is_empty() {
            return;
        }
        let corners = SpriteVertex::quad(src, dst, texture.width, texture.height);
        self.frame.push_quad(texture.handle, corners);
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let result = self.submit();
        self.frame.clear();
        match result {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(RenderError::Surface("out of GPU memory".into()))
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                Ok(())
            }
        }
    }
}

impl TextureFactory for GpuCanvas {
    fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> TextureHandle {
        self.textures
            .create(&self.gpu, &self.renderer, label, width, height, rgba)
    }
}
