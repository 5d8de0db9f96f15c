//! Math types and glam re-exports.
//!
//! World positions and directions are glam vectors. Everything that touches
//! the screen or a texture atlas is an integer pixel [`Rect`], which keeps
//! sprite placement and hit tests exact.

pub use glam::{Mat4, Vec2};

use serde::Deserialize;

/// An axis-aligned pixel rectangle. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// A `w × h` rectangle centered on `center`.
    ///
    /// The center is truncated to whole pixels first and the half extents use
    /// integer division, so odd sizes lean one pixel to the bottom-right.
    pub fn centered_on(center: Vec2, w: i32, h: i32) -> Self {
        Self {
            x: center.x as i32 - w / 2,
            y: center.y as i32 - h / 2,
            w,
            h,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// True if the two rectangles share at least one pixel. Empty rectangles
    /// never intersect anything, and touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True if the horizontal spans overlap, ignoring `y` entirely.
    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        other.x < self.right() && other.right() > self.x
    }

    /// Bottom-center point, where the boss releases its shots.
    pub fn bottom_center(&self) -> Vec2 {
        Vec2::new((self.x + self.w / 2) as f32, self.bottom() as f32)
    }
}
