//! # Collision and combat
//!
//! Two populations share the screen:
//!
//! ```text
//! damaging:   DestinationRect + CollisionMask + Damage   (bullets)
//! damageable: DestinationRect + CollisionMask + Energy   (ships, UFOs, boss)
//! ```
//!
//! Every bullet is tested against every damageable entity, O(n·m). A pair
//! interacts when the masks share a bit and the rects overlap. The bullet is
//! consumed by the first entity it hits, in view order, and that entity loses
//! `Damage` energy. Anything at zero energy or below dies.
//!
//! Both views are snapshotted first and all destruction happens after the
//! scan, so no entity disappears from under a live view. A target killed
//! earlier in the pass can't absorb later bullets. One that starts the pass
//! at zero energy or below is still hit, and dies.

use crate::components::{CollisionMask, Damage, DestinationRect, Energy};
use crate::ecs::{Entity, World};
use crate::math::Rect;

struct Damageable {
    entity: Entity,
    rect: Rect,
    mask: CollisionMask,
    energy: i32,
    hit: bool,
    dead: bool,
}

pub fn resolve_collisions(world: &mut World) {
    let mut targets = Vec::new();
    world.query::<(&DestinationRect, &CollisionMask, &Energy)>(|entity, (dest, mask, energy)| {
        targets.push(Damageable {
            entity,
            rect: dest.0,
            mask: *mask,
            energy: energy.0,
            hit: false,
            dead: false,
        });
    });
    if targets.is_empty() {
        return;
    }

    let mut bullets = Vec::new();
    world.query::<(&DestinationRect, &CollisionMask, &Damage)>(|entity, (dest, mask, damage)| {
        bullets.push((entity, dest.0, *mask, damage.0));
    });

    let mut destroyed = Vec::new();
    for (bullet, rect, mask, damage) in bullets {
        let victim = targets.iter_mut().find(|t| {
            !t.dead && t.entity != bullet && mask.matches(t.mask) && rect.intersects(&t.rect)
        });
        let Some(victim) = victim else {
            continue;
        };

        victim.energy -= damage;
        victim.hit = true;
        destroyed.push(bullet);
        log::trace!(
            "{bullet} hit {} for {damage}, {} energy left",
            victim.entity,
            victim.energy
        );
        if victim.energy <= 0 {
            victim.dead = true;
            log::debug!("{} destroyed", victim.entity);
            destroyed.push(victim.entity);
        }
    }

    for target in targets.iter().filter(|t| t.hit && !t.dead) {
        if let Some(energy) = world.get_mut::<Energy>(target.entity) {
            energy.0 = target.energy;
        }
    }
    world.despawn_batch(destroyed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{MASK_ENEMIES, MASK_PLAYER};
    use crate::systems::tests::test_world;

    fn target(world: &mut World, rect: Rect, mask: u32, energy: i32) -> Entity {
        world.spawn((DestinationRect(rect), CollisionMask(mask), Energy(energy)))
    }

    fn bullet(world: &mut World, rect: Rect, mask: u32, damage: i32) -> Entity {
        world.spawn((DestinationRect(rect), CollisionMask(mask), Damage(damage)))
    }

    const BOX: Rect = Rect::new(100, 100, 20, 20);
    const INSIDE: Rect = Rect::new(105, 105, 4, 8);

    #[test]
    fn hit_consumes_bullet_and_drains_energy() {
        let mut world = test_world(0.016);
        let boss = target(&mut world, BOX, MASK_ENEMIES, 300);
        let shot = bullet(&mut world, INSIDE, MASK_ENEMIES, 10);

        resolve_collisions(&mut world);
        assert!(!world.is_alive(shot));
        assert_eq!(world.get::<Energy>(boss), Some(&Energy(290)));
    }

    #[test]
    fn mask_mismatch_never_collides() {
        let mut world = test_world(0.016);
        let ship = target(&mut world, BOX, MASK_ENEMIES, 100);
        let shot = bullet(&mut world, INSIDE, MASK_PLAYER, 10);

        resolve_collisions(&mut world);
        assert!(world.is_alive(shot));
        assert_eq!(world.get::<Energy>(ship), Some(&Energy(100)));
    }

    #[test]
    fn shared_bit_is_enough() {
        let mut world = test_world(0.016);
        let ship = target(&mut world, BOX, MASK_PLAYER | MASK_ENEMIES, 100);
        bullet(&mut world, INSIDE, MASK_PLAYER, 10);

        resolve_collisions(&mut world);
        assert_eq!(world.get::<Energy>(ship), Some(&Energy(90)));
    }

    #[test]
    fn no_overlap_no_damage() {
        let mut world = test_world(0.016);
        let ship = target(&mut world, BOX, u32::MAX, 100);
        let shot = bullet(&mut world, Rect::new(120, 100, 4, 8), u32::MAX, 10);

        resolve_collisions(&mut world);
        assert!(world.is_alive(shot));
        assert_eq!(world.get::<Energy>(ship), Some(&Energy(100)));
    }

    #[test]
    fn lethal_damage_destroys_target() {
        let cases = [(10, 10, true), (10, 25, true), (11, 10, false), (1, 0, false)];
        for (energy, damage, dies) in cases {
            let mut world = test_world(0.016);
            let ship = target(&mut world, BOX, MASK_ENEMIES, energy);
            bullet(&mut world, INSIDE, MASK_ENEMIES, damage);

            resolve_collisions(&mut world);
            assert_eq!(!world.is_alive(ship), dies, "energy {energy} damage {damage}");
            if !dies {
                assert_eq!(world.get::<Energy>(ship), Some(&Energy(energy - damage)));
            }
        }
    }

    #[test]
    fn target_starting_at_zero_energy_is_hit_and_destroyed() {
        let mut world = test_world(0.016);
        let ship = target(&mut world, BOX, MASK_ENEMIES, 0);
        let shot = bullet(&mut world, INSIDE, MASK_ENEMIES, 10);

        resolve_collisions(&mut world);
        assert!(!world.is_alive(shot));
        assert!(!world.is_alive(ship));
    }

    #[test]
    fn bullet_hits_only_first_overlapping_target() {
        let mut world = test_world(0.016);
        let first = target(&mut world, BOX, MASK_ENEMIES, 100);
        let second = target(&mut world, BOX, MASK_ENEMIES, 100);
        bullet(&mut world, INSIDE, MASK_ENEMIES, 10);

        resolve_collisions(&mut world);
        assert_eq!(world.get::<Energy>(first), Some(&Energy(90)));
        assert_eq!(world.get::<Energy>(second), Some(&Energy(100)));
    }

    #[test]
    fn dead_target_does_not_absorb_later_bullets() {
        let mut world = test_world(0.016);
        let weak = target(&mut world, BOX, MASK_ENEMIES, 10);
        let strong = target(&mut world, BOX, MASK_ENEMIES, 100);
        let b1 = bullet(&mut world, INSIDE, MASK_ENEMIES, 10);
        let b2 = bullet(&mut world, INSIDE, MASK_ENEMIES, 10);

        resolve_collisions(&mut world);
        assert!(!world.is_alive(weak));
        assert!(!world.is_alive(b1));
        assert!(!world.is_alive(b2));
        assert_eq!(world.get::<Energy>(strong), Some(&Energy(90)));
    }

    #[test]
    fn several_bullets_stack_damage() {
        let mut world = test_world(0.016);
        let boss = target(&mut world, BOX, MASK_ENEMIES, 300);
        for _ in 0..3 {
            bullet(&mut world, INSIDE, MASK_ENEMIES, 10);
        }
        resolve_collisions(&mut world);
        assert_eq!(world.get::<Energy>(boss), Some(&Energy(270)));
        assert!(world.entities_with::<Damage>().is_empty());
    }
}
