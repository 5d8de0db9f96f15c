//! Entity spawners.
//!
//! Each spawner assembles one kind of entity from its components. Textures
//! come from the [`SpriteSheet`] resource, so spawning can't fail once the
//! game is running; only [`spawn_level`] can, when a named animation clip is
//! missing.

use std::sync::Arc;

use crate::animation::{Animation, AnimationClip, AnimationTable};
use crate::assets::{AssetError, SpriteSheet};
use crate::components::{
    CollisionMask, Damage, DestinationRect, Energy, Image, MASK_ENEMIES, MASK_PLAYER, Position,
    ScreenBoundaries, SourceRect, Target, Timer, Velocity,
};
use crate::config::{BossConfig, GameConfig, PlayerConfig};
use crate::ecs::{Entity, World};
use crate::input::Gamepad;
use crate::math::{Rect, Vec2};

/// A projectile about to be fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    /// Center of the bullet sprite at spawn.
    pub origin: Vec2,
    /// Straight up is `(0, -1)`.
    pub direction: Vec2,
    pub speed: f32,
    pub damage: i32,
    /// Which side the bullet hurts.
    pub mask: u32,
}

fn first_frame(clip: &AnimationClip) -> Rect {
    clip.frames().first().map(|f| f.rect).unwrap_or_default()
}

fn placed(position: Vec2, source: Rect) -> DestinationRect {
    DestinationRect(Rect::centered_on(position, source.w, source.h))
}

/// Spawn a bullet that lives until it hits something or leaves `boundaries`.
///
/// The destination rect is placed immediately so a bullet fired after the
/// per-tick rect pass is still inside its boundaries when culling runs.
pub fn spawn_bullet(world: &mut World, shot: Shot, boundaries: Rect) -> Entity {
    let texture = world.resource::<SpriteSheet>().bullet;
    let source = SourceRect::from_texture(&texture);
    world.spawn((
        Position(shot.origin),
        Velocity {
            direction: shot.direction,
            speed: shot.speed,
        },
        source,
        placed(shot.origin, source.0),
        Image(texture),
        ScreenBoundaries(boundaries),
        Damage(shot.damage),
        CollisionMask(shot.mask),
    ))
}

/// Spawn the keyboard-controlled ship.
pub fn spawn_player(world: &mut World, config: &PlayerConfig, clip: Arc<AnimationClip>) -> Entity {
    let texture = world.resource::<SpriteSheet>().player;
    let source = first_frame(&clip);
    world.spawn((
        Position(config.position),
        Velocity::idle(config.speed),
        SourceRect(source),
        placed(config.position, source),
        Animation::new(clip, config.animation_speed),
        Image(texture),
        Timer::ready(config.fire_interval),
        Gamepad::default(),
        Energy(config.energy),
        CollisionMask(MASK_PLAYER),
    ))
}

/// Spawn a stationary, animated UFO.
pub fn spawn_enemy(
    world: &mut World,
    position: Vec2,
    energy: i32,
    clip: Arc<AnimationClip>,
    animation_speed: f32,
) -> Entity {
    let texture = world.resource::<SpriteSheet>().ufo;
    let source = first_frame(&clip);
    world.spawn((
        Position(position),
        SourceRect(source),
        placed(position, source),
        Energy(energy),
        Animation::new(clip, animation_speed),
        Image(texture),
        CollisionMask(MASK_ENEMIES),
    ))
}

/// Spawn the boss, which bombs `target` whenever it passes underneath.
pub fn spawn_boss(world: &mut World, config: &BossConfig, target: Entity) -> Entity {
    let texture = world.resource::<SpriteSheet>().boss;
    let source = SourceRect::from_texture(&texture);
    world.spawn((
        Position(config.position),
        Velocity::idle(config.speed),
        source,
        placed(config.position, source.0),
        Energy(config.energy),
        Timer::new(config.fire_interval),
        Target(target),
        Image(texture),
        CollisionMask(MASK_ENEMIES),
    ))
}

/// Handles to the entities of a freshly populated level.
#[derive(Debug, Clone)]
pub struct Level {
    pub player: Entity,
    pub boss: Entity,
    pub enemies: Vec<Entity>,
}

/// Spawn the player, the UFO formation and the boss.
pub fn spawn_level(
    world: &mut World,
    config: &GameConfig,
    animations: &AnimationTable,
) -> Result<Level, AssetError> {
    let player_clip = animations.clip(&config.player.animation)?;
    let enemy_clip = animations.clip(&config.enemies.animation)?;

    let player = spawn_player(world, &config.player, player_clip);
    let enemies = config
        .enemies
        .positions
        .iter()
        .map(|&position| {
            spawn_enemy(
                world,
                position,
                config.enemies.energy,
                enemy_clip.clone(),
                config.enemies.animation_speed,
            )
        })
        .collect::<Vec<_>>();
    let boss = spawn_boss(world, &config.boss, player);

    log::info!(
        "Level spawned: player {player}, boss {boss}, {} enemies",
        enemies.len()
    );
    Ok(Level {
        player,
        boss,
        enemies,
    })
}
