//! # Vertex: Per-Corner Data Sent to the GPU
//!
//! Every copy becomes one quad, four vertices. A vertex only needs where it
//! lands on screen and which texel it samples; there is no tint, no rotation
//! and no depth.
//!
//! ```text
//! SpriteVertex (16 bytes per vertex)
//! ┌────────────────┬──────────────┐
//! │ position       │ uv           │
//! │ [f32; 2]       │ [f32; 2]     │
//! │ offset 0       │ offset 8     │
//! │ location(0)    │ location(1)  │
//! └────────────────┴──────────────┘
//! ```
//!
//! Positions are in screen pixels, origin top-left, y down, exactly the
//! space `DestinationRect` lives in. The [`ScreenUniform`] maps that space to
//! clip space.

use bytemuck::{Pod, Zeroable};

use crate::math::{Mat4, Rect};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl SpriteVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    /// Corners of `dst` sampling `src` out of a `tex_w`×`tex_h` texture.
    /// Order: top-left, top-right, bottom-right, bottom-left.
    pub fn quad(src: Rect, dst: Rect, tex_w: u32, tex_h: u32) -> [SpriteVertex; 4] {
        let (tw, th) = (tex_w.max(1) as f32, tex_h.max(1) as f32);
        let u0 = src.x as f32 / tw;
        let v0 = src.y as f32 / th;
        let u1 = src.right() as f32 / tw;
        let v1 = src.bottom() as f32 / th;

        let x0 = dst.x as f32;
        let y0 = dst.y as f32;
        let x1 = dst.right() as f32;
        let y1 = dst.bottom() as f32;

        [
            SpriteVertex { position: [x0, y0], uv: [u0, v0] },
            SpriteVertex { position: [x1, y0], uv: [u1, v0] },
            SpriteVertex { position: [x1, y1], uv: [u1, v1] },
            SpriteVertex { position: [x0, y1], uv: [u0, v1] },
        ]
    }
}

/// Two triangles per quad, offset by the quad's first vertex.
pub(crate) fn quad_indices(base: u32) -> [u32; 6] {
    [base, base + 1, base + 2, base, base + 2, base + 3]
}

/// Pixel-to-clip projection, uploaded as a uniform buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct ScreenUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl ScreenUniform {
    /// `(0,0)` maps to the top-left corner, `(width,height)` to bottom-right.
    pub fn new(width: f32, height: f32) -> Self {
        let proj = Mat4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0);
        Self {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    #[test]
    fn quad_covers_destination_and_samples_source() {
        let q = SpriteVertex::quad(Rect::new(32, 0, 32, 32), Rect::new(10, 20, 64, 64), 64, 32);
        assert_eq!(q[0], SpriteVertex { position: [10.0, 20.0], uv: [0.5, 0.0] });
        assert_eq!(q[2], SpriteVertex { position: [74.0, 84.0], uv: [1.0, 1.0] });
    }

    #[test]
    fn projection_maps_corners() {
        let m = Mat4::from_cols_array_2d(&ScreenUniform::new(640.0, 480.0).view_proj);
        let top_left = m.project_point3(Vec2::ZERO.extend(0.0));
        let bottom_right = m.project_point3(Vec2::new(640.0, 480.0).extend(0.0));
        assert!((top_left.x + 1.0).abs() < 1e-6 && (top_left.y - 1.0).abs() < 1e-6);
        assert!((bottom_right.x - 1.0).abs() < 1e-6 && (bottom_right.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn indices_wind_two_triangles() {
        assert_eq!(quad_indices(4), [4, 5, 6, 4, 6, 7]);
    }
}
