use crate::components::{DestinationRect, Position, SourceRect, Velocity};
use crate::ecs::World;
use crate::math::Rect;
use crate::time::Time;

/// Integrate `position += normalize(direction) * speed * dt`.
///
/// The direction is normalized in place first; a zero direction stays zero.
pub fn update_linear_velocity(world: &mut World) {
    let dt = world.resource::<Time>().delta_secs();
    world.query::<(&mut Position, &mut Velocity)>(|_, (position, velocity)| {
        velocity.direction = velocity.direction.normalize_or_zero();
        position.0 += velocity.direction * velocity.speed * dt;
    });
}

/// Center each sprite's screen rect on its position.
pub fn update_destination_rects(world: &mut World) {
    world.query::<(&Position, &SourceRect, &mut DestinationRect)>(|_, (position, source, dest)| {
        dest.0 = Rect::centered_on(position.0, source.0.w, source.0.h);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::systems::tests::test_world;

    #[test]
    fn diagonal_is_normalized() {
        let mut world = test_world(1.0);
        let e = world.spawn((Position::new(0.0, 0.0), Velocity::new(1.0, 1.0, 10.0)));
        update_linear_velocity(&mut world);

        let v = world.get::<Velocity>(e).map(|v| v.direction).unwrap();
        assert!((v.length() - 1.0).abs() < 1e-6);
        let p = world.get::<Position>(e).unwrap().0;
        let expected = 10.0 / 2f32.sqrt();
        assert!((p.x - expected).abs() < 1e-4 && (p.y - expected).abs() < 1e-4);
    }

    #[test]
    fn any_nonzero_direction_becomes_unit() {
        let mut world = test_world(0.0);
        let dirs = [(3.0, 4.0), (-0.001, 0.0), (250.0, -17.5), (0.0, -9.0)];
        let entities: Vec<_> = dirs
            .iter()
            .map(|&(dx, dy)| world.spawn((Position::default(), Velocity::new(dx, dy, 1.0))))
            .collect();
        update_linear_velocity(&mut world);
        for e in entities {
            let len = world.get::<Velocity>(e).unwrap().direction.length();
            assert!((len - 1.0).abs() < 1e-5, "length {len}");
        }
    }

    #[test]
    fn zero_direction_stays_put() {
        let mut world = test_world(0.5);
        let e = world.spawn((Position::new(5.0, 6.0), Velocity::idle(100.0)));
        update_linear_velocity(&mut world);

        let v = world.get::<Velocity>(e).unwrap().direction;
        assert_eq!(v, Vec2::ZERO);
        assert!(!v.x.is_nan() && !v.y.is_nan());
        assert_eq!(world.get::<Position>(e), Some(&Position::new(5.0, 6.0)));
    }

    #[test]
    fn destination_is_centered_on_position() {
        let mut world = test_world(0.0);
        let e = world.spawn((
            Position::new(320.0, 200.0),
            SourceRect(Rect::new(0, 0, 64, 48)),
            DestinationRect::default(),
        ));
        update_destination_rects(&mut world);
        assert_eq!(world.get::<DestinationRect>(e).map(|d| d.0), Some(Rect::new(288, 176, 64, 48)));
    }
}
