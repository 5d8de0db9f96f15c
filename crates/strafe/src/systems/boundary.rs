use crate::components::{DestinationRect, ScreenBoundaries};
use crate::ecs::World;

/// Destroy entities whose rect no longer touches their play field.
///
/// Only entities carrying [`ScreenBoundaries`] are considered, so ships and
/// UFOs may drift off screen without being culled.
pub fn check_boundaries(world: &mut World) {
    let mut outside = Vec::new();
    world.query::<(&DestinationRect, &ScreenBoundaries)>(|entity, (dest, bounds)| {
        if !dest.0.intersects(&bounds.0) {
            outside.push(entity);
        }
    });
    let culled = world.despawn_batch(outside);
    if culled > 0 {
        log::trace!("Culled {culled} entities outside their boundaries");
    }
}
