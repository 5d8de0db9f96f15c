//! # System: Functions That Operate on the World
//!
//! A system is any `FnMut(&mut World)`. A [`Schedule`] runs its systems one
//! after another in the order they were added, with no parallelism and no
//! dependency graph. For this game the order is the contract: timers tick
//! before anything asks whether they expired, and destination rects are fresh
//! before targeting, collision and culling read them.

use super::world::World;

pub trait System {
    fn run(&mut self, world: &mut World);
}

impl<F: FnMut(&mut World)> System for F {
    fn run(&mut self, world: &mut World) {
        (self)(world);
    }
}

struct NamedSystem {
    name: String,
    system: Box<dyn System>,
}

/// An ordered list of systems.
pub struct Schedule {
    systems: Vec<NamedSystem>,
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Append a system. Returns `self` so pipelines read top to bottom.
    pub fn add_system<S: System + 'static>(&mut self, system: S) -> &mut Self {
        self.systems.push(NamedSystem {
            name: short_system_name(std::any::type_name::<S>()),
            system: Box::new(system),
        });
        self
    }

    pub fn run(&mut self, world: &mut World) {
        for ns in &mut self.systems {
            ns.system.run(world);
        }
    }

    /// Short names of the systems in run order.
    pub fn system_names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|ns| ns.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

/// `strafe::systems::motion::update_linear_velocity` → `update_linear_velocity`,
/// closures → `<closure>`.
fn short_system_name(full: &str) -> String {
    let name = full.rsplit("::").next().unwrap_or(full);
    if name.contains("closure") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_system(_world: &mut World) {}

    #[test]
    fn schedule_captures_system_name() {
        let mut schedule = Schedule::new();
        schedule.add_system(dummy_system);
        assert_eq!(schedule.system_names().collect::<Vec<_>>(), vec!["dummy_system"]);
    }

    #[test]
    fn closure_system_name() {
        let mut schedule = Schedule::new();
        schedule.add_system(|_world: &mut World| {});
        assert_eq!(schedule.system_names().next(), Some("<closure>"));
    }

    #[test]
    fn systems_run_in_insertion_order() {
        let mut world = World::new();
        world.insert_resource(Vec::<&'static str>::new());

        let mut schedule = Schedule::new();
        schedule
            .add_system(|w: &mut World| w.resource_mut::<Vec<&'static str>>().push("first"))
            .add_system(|w: &mut World| w.resource_mut::<Vec<&'static str>>().push("second"));
        schedule.run(&mut world);

        assert_eq!(schedule.len(), 2);
        assert_eq!(world.resource::<Vec<&'static str>>(), &vec!["first", "second"]);
    }
}
