//! Per-tick simulation systems, one file per concern.
//!
//! [`pipeline`] builds the schedule in the only order that is correct:
//!
//! ```text
//! update_timers → handle_gamepad → animate_sprites → update_linear_velocity
//!   → update_destination_rects → fire_at_targets → resolve_collisions
//!   → check_boundaries
//! ```
//!
//! Rendering runs after the schedule against a canvas; see
//! [`render_sprites`](crate::render::render_sprites).
//!
//! Systems that destroy or spawn entities collect those changes during their
//! view and apply them before returning, so the next system always sees a
//! consistent store.

pub mod boundary;
pub mod collision;
pub mod gamepad;
pub mod motion;
pub mod targeting;
pub mod timer;

pub use boundary::check_boundaries;
pub use collision::resolve_collisions;
pub use gamepad::handle_gamepad;
pub use motion::{update_destination_rects, update_linear_velocity};
pub use targeting::fire_at_targets;
pub use timer::update_timers;

use crate::animation::animate_sprites;
use crate::ecs::Schedule;

/// The simulation schedule, everything but rendering.
pub fn pipeline() -> Schedule {
    let mut schedule = Schedule::new();
    schedule
        .add_system(update_timers)
        .add_system(handle_gamepad)
        .add_system(animate_sprites)
        .add_system(update_linear_velocity)
        .add_system(update_destination_rects)
        .add_system(fire_at_targets)
        .add_system(resolve_collisions)
        .add_system(check_boundaries);
    schedule
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use super::*;
    use crate::components::PlayArea;
    use crate::config::BulletConfig;
    use crate::ecs::World;
    use crate::input::{Input, KeyCode};
    use crate::math::Rect;
    use crate::spawn::tests::test_sheet;
    use crate::time::Time;

    /// World with every resource the systems read, and one tick of `dt`.
    pub(crate) fn test_world(dt: f32) -> World {
        let mut world = World::new();
        let mut time = Time::new();
        time.advance(Duration::from_secs_f32(dt));
        world.insert_resource(time);
        world.insert_resource(Input::<KeyCode>::new());
        world.insert_resource(PlayArea(Rect::new(0, 0, 640, 480)));
        world.insert_resource(BulletConfig::default());
        world.insert_resource(test_sheet());
        world
    }

    #[test]
    fn pipeline_order() {
        let names: Vec<_> = pipeline().system_names().map(str::to_string).collect();
        assert_eq!(
            names,
            vec![
                "update_timers",
                "handle_gamepad",
                "animate_sprites",
                "update_linear_velocity",
                "update_destination_rects",
                "fire_at_targets",
                "resolve_collisions",
                "check_boundaries",
            ]
        );
    }
}
