//! # Entity: Generational Handles
//!
//! An [`Entity`] carries no data of its own. It is a key into the
//! [`World`](super::world::World)'s component tables, nothing more.
//!
//! ## Why Generations Matter Here
//!
//! The boss keeps a [`Target`](crate::components::Target) pointing at the
//! player. The player can be destroyed by a bullet while the boss lives on,
//! and the freed slot can be handed to the next bullet that spawns:
//!
//! ```text
//! 1. Spawn player      → Entity { index: 0, generation: 0 }
//! 2. Boss stores Target(Entity(0v0))
//! 3. Player dies       → slot 0 freed, generation bumped to 1
//! 4. Bullet spawns     → Entity { index: 0, generation: 1 }
//! 5. Boss resolves Target(0v0) → generation mismatch → None
//! ```
//!
//! Without the generation the boss would start aiming at a bullet.

use std::fmt;

/// A lightweight handle to an entity in the [`World`](super::world::World).
///
/// Only valid for the world that created it, and only while its generation
/// matches the slot's current generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    /// Slot index in the allocator. Recycled after despawn.
    pub(crate) index: u32,
    /// Bumped every time the slot is freed, so stale handles fail lookups.
    pub(crate) generation: u32,
}

impl Entity {
    /// Raw slot index.
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity IDs and recycles freed slots.
///
/// ```text
/// generations: [0, 1, 0, 2, 0]   ← one generation per slot ever allocated
/// free_list:   [1, 3]             ← slots available for reuse
/// ```
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    free_list: Vec<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Allocate a new [`Entity`], reusing a freed slot when one exists.
    pub fn allocate(&mut self) -> Entity {
        if let Some(index) = self.free_list.pop() {
            // Generation was already bumped on deallocate.
            let generation = self.generations[index as usize];
            Entity { index, generation }
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            Entity {
                index,
                generation: 0,
            }
        }
    }

    /// Free an entity's slot. Returns `false` if the handle was already stale.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let idx = entity.index as usize;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_list.push(entity.index);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index as usize)
            .is_some_and(|&g| g == entity.generation)
    }

    /// Number of currently alive entities.
    pub fn alive_count(&self) -> usize {
        self.generations.len() - self.free_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sequential() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        let e1 = alloc.allocate();
        assert_eq!(e0.index, 0);
        assert_eq!(e1.index, 1);
        assert_eq!(e0.generation, 0);
        assert_eq!(e1.generation, 0);
    }

    #[test]
    fn recycled_slot_gets_new_generation() {
        let mut alloc = EntityAllocator::new();
        let player = alloc.allocate();
        assert!(alloc.deallocate(player));

        let bullet = alloc.allocate();
        assert_eq!(bullet.index, player.index);
        assert_eq!(bullet.generation, 1);
        assert!(!alloc.is_alive(player));
        assert!(alloc.is_alive(bullet));
    }

    #[test]
    fn double_free_is_rejected() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        assert!(alloc.deallocate(e0));
        assert!(!alloc.deallocate(e0));
        assert_eq!(alloc.alive_count(), 0);
    }

    #[test]
    fn unknown_index_is_not_alive() {
        let alloc = EntityAllocator::new();
        let ghost = Entity {
            index: 7,
            generation: 0,
        };
        assert!(!alloc.is_alive(ghost));
    }

    #[test]
    fn alive_count_tracks_frees() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        let _e1 = alloc.allocate();
        assert_eq!(alloc.alive_count(), 2);
        alloc.deallocate(e0);
        assert_eq!(alloc.alive_count(), 1);
    }
}
