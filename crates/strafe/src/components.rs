//! Gameplay components.
//!
//! Every component is optional per entity. Which systems touch an entity is
//! decided purely by which of these it carries: a bullet is anything with
//! `Damage`, something that can be hit is anything with `Energy`.

use crate::assets::Texture;
use crate::ecs::Entity;
use crate::math::{Rect, Vec2};

/// Bullets fired by enemies carry this bit; so does the player.
pub const MASK_PLAYER: u32 = 1 << 0;
/// Bullets fired by the player carry this bit; so do the enemies.
pub const MASK_ENEMIES: u32 = 1 << 1;

/// World-space position, the center of the sprite.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// Direction of travel plus speed in units per second.
///
/// `direction` does not have to be unit length; motion normalizes it before
/// integrating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub direction: Vec2,
    pub speed: f32,
}

impl Velocity {
    /// Stationary until something sets a direction.
    pub fn idle(speed: f32) -> Self {
        Self {
            direction: Vec2::ZERO,
            speed,
        }
    }

    pub fn new(dx: f32, dy: f32, speed: f32) -> Self {
        Self {
            direction: Vec2::new(dx, dy),
            speed,
        }
    }
}

/// Region of the entity's texture to draw.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SourceRect(pub Rect);

impl SourceRect {
    /// The whole texture.
    pub fn from_texture(texture: &Texture) -> Self {
        Self(Rect::new(0, 0, texture.width as i32, texture.height as i32))
    }
}

/// Screen-space rectangle, recomputed every tick from position and source
/// size. Hit tests and culling read this.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DestinationRect(pub Rect);

/// The texture an entity is drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Image(pub Texture);

/// Countdown used as a cooldown. Ready once `remaining` reaches zero and stays
/// ready until whoever consumes it calls [`rearm`](Timer::rearm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    remaining: f32,
    duration: f32,
}

impl Timer {
    /// Armed: first ready after `duration` seconds.
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: duration,
            duration,
        }
    }

    /// Ready immediately, then every `duration` seconds once rearmed.
    pub fn ready(duration: f32) -> Self {
        Self {
            remaining: 0.0,
            duration,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.remaining -= dt;
    }

    pub fn timed_out(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn rearm(&mut self) {
        self.remaining = self.duration;
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

/// Hit points. The entity dies when this drops to zero or below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Energy(pub i32);

/// Energy removed from whatever this entity hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Damage(pub i32);

/// Collision filter. Two entities interact only if their masks share a bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionMask(pub u32);

impl CollisionMask {
    pub fn matches(self, other: CollisionMask) -> bool {
        self.0 & other.0 != 0
    }
}

/// Entity this one shoots at. Resolved every tick; once the target is gone
/// the component is removed and the shooter holds fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target(pub Entity);

/// Play field this entity is allowed to live in. Leaving it entirely
/// destroys the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenBoundaries(pub Rect);

/// Resource: the screen rectangle, used as the viewport and as the default
/// culling boundary for projectiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayArea(pub Rect);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armed_timer_waits_full_duration() {
        let mut timer = Timer::new(0.5);
        assert!(!timer.timed_out());
        timer.update(0.25);
        assert!(!timer.timed_out());
        timer.update(0.25);
        assert!(timer.timed_out());
    }

    #[test]
    fn timed_out_timer_stays_ready_until_rearmed() {
        let mut timer = Timer::ready(0.2);
        assert!(timer.timed_out());
        timer.update(1.0);
        assert!(timer.timed_out());
        timer.rearm();
        assert!(!timer.timed_out());
        assert_eq!(timer.remaining(), 0.2);
    }

    #[test]
    fn masks_match_on_shared_bits_only() {
        let player_bullet = CollisionMask(MASK_ENEMIES);
        assert!(player_bullet.matches(CollisionMask(MASK_ENEMIES)));
        assert!(!player_bullet.matches(CollisionMask(MASK_PLAYER)));
        assert!(CollisionMask(0b11).matches(CollisionMask(MASK_PLAYER)));
        assert!(!CollisionMask(0).matches(CollisionMask(u32::MAX)));
    }

    #[test]
    fn source_rect_covers_texture() {
        let texture = Texture::new(crate::assets::TextureHandle(3), 64, 32);
        assert_eq!(SourceRect::from_texture(&texture).0, Rect::new(0, 0, 64, 32));
    }
}
