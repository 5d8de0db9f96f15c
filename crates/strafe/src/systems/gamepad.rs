//! Keyboard intent: movement direction and the fire button.
//!
//! Movement is level-triggered. Left wins over right and up wins over down
//! when both are held. Fire is level-triggered too, gated by the entity's
//! [`Timer`]: holding fire shoots once per cooldown, and the timer is rearmed
//! on every shot.

use crate::components::{MASK_ENEMIES, PlayArea, Position, Timer, Velocity};
use crate::config::BulletConfig;
use crate::ecs::World;
use crate::input::{Action, Gamepad, Input, KeyCode};
use crate::math::Vec2;
use crate::spawn::{Shot, spawn_bullet};

fn axis(pad: &Gamepad, negative: Action, positive: Action) -> f32 {
    if pad.down(negative) {
        -1.0
    } else if pad.down(positive) {
        1.0
    } else {
        0.0
    }
}

pub fn handle_gamepad(world: &mut World) {
    // Extract the input so it can be read while the view borrows the world.
    let Some(input) = world.resource_remove::<Input<KeyCode>>() else {
        return;
    };
    let bullets = *world.resource::<BulletConfig>();

    let mut shots = Vec::new();
    world.query::<(&Position, &mut Velocity, &mut Timer, &mut Gamepad)>(
        |entity, (position, velocity, timer, pad)| {
            pad.update(&input);
            velocity.direction = Vec2::new(
                axis(pad, Action::MoveLeft, Action::MoveRight),
                axis(pad, Action::MoveUp, Action::MoveDown),
            );

            if pad.down(Action::Fire) && timer.timed_out() {
                timer.rearm();
                log::trace!("{entity} fires at {}", position.0);
                shots.push(Shot {
                    origin: position.0,
                    direction: Vec2::NEG_Y,
                    speed: bullets.player_speed,
                    damage: bullets.damage,
                    mask: MASK_ENEMIES,
                });
            }
        },
    );

    world.insert_resource(input);

    if shots.is_empty() {
        return;
    }
    let area = world.resource::<PlayArea>().0;
    for shot in shots {
        spawn_bullet(world, shot, area);
    }
}
