//! # Render: Sprites onto a Canvas
//!
//! Rendering is the last stage of every tick. It doesn't touch the GPU
//! directly; it issues copies against a [`Canvas`], the small surface the
//! game needs from a renderer:
//!
//! ```text
//!   clear(color)
//!   copy(background, full texture, full screen)
//!   copy(texture, SourceRect, DestinationRect)   ── once per sprite
//!   present()
//! ```
//!
//! Two canvases exist. [`RecordingCanvas`] keeps every call in a list, which
//! is what tests and headless runs use. `GpuCanvas` (feature `gpu`) turns the
//! same calls into textured quads and submits them through wgpu.
//!
//! ## Draw Order
//!
//! There is no z-ordering. The background goes first, then sprites in view
//! order: archetype creation order, then spawn order within an archetype.
//! Bullets spawned mid-game therefore draw over ships.

#[cfg(feature = "gpu")]
pub mod canvas;
#[cfg(feature = "gpu")]
pub mod gpu;
#[cfg(feature = "gpu")]
pub(crate) mod pipeline;
#[cfg(feature = "gpu")]
pub(crate) mod texture;
#[cfg(feature = "gpu")]
pub(crate) mod vertex;

#[cfg(feature = "gpu")]
pub use canvas::GpuCanvas;
#[cfg(feature = "gpu")]
pub use gpu::GpuContext;

use std::fmt;

use crate::assets::{SpriteSheet, Texture, TextureFactory, TextureHandle};
use crate::components::{DestinationRect, Image, PlayArea, SourceRect};
use crate::ecs::World;
use crate::math::Rect;

/// Background color behind everything. Resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColor(pub [f32; 4]);

impl Default for ClearColor {
    fn default() -> Self {
        Self([1.0, 1.0, 1.0, 1.0])
    }
}

/// Errors from the window and GPU layer. All of them happen at startup,
/// except `Surface`, which the frame loop logs and recovers from.
#[derive(Debug)]
pub enum RenderError {
    EventLoop(String),
    Window(String),
    Surface(String),
    NoAdapter(String),
    Device(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::EventLoop(msg) => write!(f, "event loop error: {msg}"),
            RenderError::Window(msg) => write!(f, "failed to create window: {msg}"),
            RenderError::Surface(msg) => write!(f, "surface error: {msg}"),
            RenderError::NoAdapter(msg) => write!(f, "no suitable GPU adapter: {msg}"),
            RenderError::Device(msg) => write!(f, "failed to create GPU device: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// The drawing surface a frame is rendered onto.
pub trait Canvas {
    fn clear(&mut self, color: [f32; 4]);

    /// Copy the `src` region of `texture` onto the `dst` region of the
    /// screen, scaling if sizes differ.
    fn copy(&mut self, texture: &Texture, src: Rect, dst: Rect);

    fn present(&mut self) -> Result<(), RenderError>;
}

/// One call made against a [`RecordingCanvas`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCall {
    Clear([f32; 4]),
    Copy {
        texture: TextureHandle,
        src: Rect,
        dst: Rect,
    },
    Present,
}

/// A canvas that draws nothing and remembers everything.
///
/// It also hands out texture handles, so the whole load path can run without
/// a GPU.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    calls: Vec<DrawCall>,
    textures: Vec<(String, u32, u32)>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Copies issued since the most recent clear.
    pub fn last_frame(&self) -> &[DrawCall] {
        let start = self
            .calls
            .iter()
            .rposition(|c| matches!(c, DrawCall::Clear(_)))
            .unwrap_or(0);
        &self.calls[start..]
    }

    pub fn frames_presented(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Present))
            .count()
    }

    /// Label and size of every texture created through this canvas.
    pub fn textures(&self) -> &[(String, u32, u32)] {
        &self.textures
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(DrawCall::Clear(color));
    }

    fn copy(&mut self, texture: &Texture, src: Rect, dst: Rect) {
        self.calls.push(DrawCall::Copy {
            texture: texture.handle,
            src,
            dst,
        });
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.calls.push(DrawCall::Present);
        Ok(())
    }
}

impl TextureFactory for RecordingCanvas {
    fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        _rgba: &[u8],
    ) -> TextureHandle {
        let handle = TextureHandle(self.textures.len());
        self.textures.push((label.to_owned(), width, height));
        handle
    }
}

/// Draw the frame: clear, background, then every sprite in view order.
///
/// Presenting is left to the caller, which owns the error policy.
pub fn render_sprites(world: &mut World, canvas: &mut dyn Canvas) {
    let clear = world.get_resource::<ClearColor>().copied().unwrap_or_default();
    canvas.clear(clear.0);

    let background = world.get_resource::<SpriteSheet>().map(|sheet| sheet.background);
    let screen = world.get_resource::<PlayArea>().map(|area| area.0);
    if let (Some(texture), Some(screen)) = (background, screen) {
        let src = Rect::new(0, 0, texture.width as i32, texture.height as i32);
        canvas.copy(&texture, src, screen);
    }

    world.query::<(&Image, &SourceRect, &DestinationRect)>(|_, (image, src, dst)| {
        canvas.copy(&image.0, src.0, dst.0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Position;
    use crate::spawn::tests::test_sheet;

    fn sprite(world: &mut World, texture: Texture, dst: Rect) {
        world.spawn((
            Image(texture),
            SourceRect(Rect::new(0, 0, dst.w, dst.h)),
            DestinationRect(dst),
        ));
    }

    #[test]
    fn background_first_then_sprites_in_spawn_order() {
        let sheet = test_sheet();
        let mut world = World::new();
        world.insert_resource(sheet);
        world.insert_resource(PlayArea(Rect::new(0, 0, 640, 480)));
        world.insert_resource(ClearColor([0.0, 0.0, 0.0, 1.0]));
        sprite(&mut world, sheet.player, Rect::new(84, 284, 32, 32));
        sprite(&mut world, sheet.boss, Rect::new(288, 176, 64, 48));
        sprite(&mut world, sheet.ufo, Rect::new(188, 38, 24, 24));

        let mut canvas = RecordingCanvas::new();
        render_sprites(&mut world, &mut canvas);

        let handles: Vec<_> = canvas
            .calls()
            .iter()
            .filter_map(|c| match c {
                DrawCall::Copy { texture, .. } => Some(texture.0),
                _ => None,
            })
            .collect();
        assert_eq!(canvas.calls()[0], DrawCall::Clear([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(handles, vec![0, 1, 3, 2]);
        assert_eq!(
            canvas.calls()[1],
            DrawCall::Copy {
                texture: sheet.background.handle,
                src: Rect::new(0, 0, 640, 480),
                dst: Rect::new(0, 0, 640, 480),
            }
        );
    }

    #[test]
    fn entities_without_image_are_not_drawn() {
        let mut world = World::new();
        world.spawn((Position::new(1.0, 1.0), DestinationRect(Rect::new(0, 0, 4, 4))));

        let mut canvas = RecordingCanvas::new();
        render_sprites(&mut world, &mut canvas);
        assert_eq!(canvas.calls(), &[DrawCall::Clear([1.0, 1.0, 1.0, 1.0])]);
    }

    #[test]
    fn last_frame_starts_at_latest_clear() {
        let mut canvas = RecordingCanvas::new();
        let texture = Texture::new(TextureHandle(7), 4, 4);
        canvas.clear([0.0; 4]);
        canvas.copy(&texture, Rect::new(0, 0, 4, 4), Rect::new(0, 0, 4, 4));
        canvas.present().unwrap();
        canvas.clear([0.0; 4]);
        canvas.present().unwrap();

        assert_eq!(canvas.last_frame().len(), 2);
        assert_eq!(canvas.frames_presented(), 2);
    }

    #[test]
    fn recording_canvas_hands_out_sequential_handles() {
        let mut canvas = RecordingCanvas::new();
        let a = canvas.create_texture("a.png", 2, 2, &[0; 16]);
        let b = canvas.create_texture("b.png", 1, 1, &[0; 4]);
        assert_eq!((a, b), (TextureHandle(0), TextureHandle(1)));
        assert_eq!(canvas.textures()[1], ("b.png".to_owned(), 1, 1));
    }
}
