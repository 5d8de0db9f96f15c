use crate::components::Timer;
use crate::ecs::World;
use crate::time::Time;

/// Count every cooldown down by this tick's delta.
pub fn update_timers(world: &mut World) {
    let dt = world.resource::<Time>().delta_secs();
    world.query::<(&mut Timer,)>(|_, (timer,)| timer.update(dt));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::tests::test_world;

    #[test]
    fn all_timers_advance() {
        let mut world = test_world(0.25);
        let a = world.spawn((Timer::new(0.5),));
        let b = world.spawn((Timer::new(0.2),));

        update_timers(&mut world);
        assert!(world.get::<Timer>(a).is_some_and(|t| !t.timed_out()));
        assert!(world.get::<Timer>(b).is_some_and(|t| t.timed_out()));

        update_timers(&mut world);
        assert!(world.get::<Timer>(a).is_some_and(|t| t.timed_out()));
    }
}
