//! Scripted fire-at-target behaviour.
//!
//! A shooter with a ready [`Timer`] drops a bullet from its bottom edge
//! whenever its target is horizontally "in lane", regardless of height. The
//! result is a bombing run rather than aimed fire.
//!
//! A destroyed target can never come back, so the shooter's [`Target`] is
//! removed and it stops firing. A live target without a [`DestinationRect`]
//! only skips this tick.

use crate::components::{DestinationRect, MASK_PLAYER, PlayArea, Target, Timer};
use crate::config::BulletConfig;
use crate::ecs::World;
use crate::math::Vec2;
use crate::spawn::{Shot, spawn_bullet};

pub fn fire_at_targets(world: &mut World) {
    let mut shooters = Vec::new();
    world.query::<(&Timer, &Target, &DestinationRect)>(|entity, (timer, target, dest)| {
        shooters.push((entity, target.0, dest.0, timer.timed_out()));
    });
    if shooters.is_empty() {
        return;
    }

    let bullets = *world.resource::<BulletConfig>();
    let area = world.resource::<PlayArea>().0;

    for (shooter, target, rect, ready) in shooters {
        if !world.is_alive(target) {
            log::warn!("{shooter} lost its target {target}, holding fire");
            world.remove::<Target>(shooter);
            continue;
        }
        let Some(target_rect) = world.get::<DestinationRect>(target).map(|d| d.0) else {
            continue;
        };
        if !ready || !rect.overlaps_horizontally(&target_rect) {
            continue;
        }

        let origin = rect.bottom_center();
        log::trace!("{shooter} bombs {target} from {origin}");
        spawn_bullet(
            world,
            Shot {
                origin,
                direction: Vec2::Y,
                speed: bullets.enemy_speed,
                damage: bullets.damage,
                mask: MASK_PLAYER,
            },
            area,
        );
        if let Some(timer) = world.get_mut::<Timer>(shooter) {
            timer.rearm();
        }
    }
}
