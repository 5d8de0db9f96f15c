//! # World: The Component Store
//!
//! The [`World`] owns every entity, every component and every resource. It is
//! the single source of truth for one running game.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ World                                                │
//! │                                                      │
//! │  EntityAllocator: generational entity ids            │
//! │                                                      │
//! │  archetypes: Vec<Archetype>   (creation order)       │
//! │  archetype_index: HashMap<ArchetypeKey, usize>       │
//! │                                                      │
//! │  entity_locations: HashMap<u32, EntityLocation>      │
//! │    entity index → (archetype index, row)             │
//! │                                                      │
//! │  resources: HashMap<TypeId, Box<dyn Any>>            │
//! │    Time, Input, PlayArea, SpriteSheet, ...           │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Archetypes live in a `Vec` so every view visits them in the order they
//! were first created. Together with row order inside each table this makes
//! draw order and collision order reproducible from run to run.
//!
//! ## Structural changes during a view
//!
//! [`World::query`] borrows the world mutably for the whole pass, so a system
//! cannot despawn or spawn from inside its closure. Systems collect what they
//! want to destroy or create and apply it when their pass ends, typically
//! through [`World::despawn_batch`].

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::archetype::{Archetype, ArchetypeKey, DetachedRow, archetype_key};
use super::component::ComponentColumn;
use super::entity::{Entity, EntityAllocator};
use super::query::QueryParam;

/// Where an entity's components currently live.
#[derive(Clone, Copy, Debug)]
struct EntityLocation {
    archetype: usize,
    row: usize,
}

pub struct World {
    allocator: EntityAllocator,
    archetypes: Vec<Archetype>,
    archetype_index: HashMap<ArchetypeKey, usize>,
    entity_locations: HashMap<u32, EntityLocation>,
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl World {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            archetypes: Vec::new(),
            archetype_index: HashMap::new(),
            entity_locations: HashMap::new(),
            resources: HashMap::new(),
        }
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Insert a resource, replacing any existing one of the same type.
    pub fn insert_resource<T: 'static + Send + Sync>(&mut self, value: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource<T: 'static + Send + Sync>(&self) -> &T {
        self.get_resource::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource_mut<T: 'static + Send + Sync>(&mut self) -> &mut T {
        self.get_resource_mut::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn get_resource<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|r| r.downcast_ref::<T>())
    }

    pub fn get_resource_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|r| r.downcast_mut::<T>())
    }

    pub fn has_resource<T: 'static + Send + Sync>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    /// Take a resource out of the world. Pair with [`insert_resource`] to
    /// borrow a resource and the world at the same time (e.g. while
    /// rendering).
    ///
    /// [`insert_resource`]: World::insert_resource
    pub fn resource_remove<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|r| r.downcast::<T>().ok())
            .map(|b| *b)
    }

    // ── Entities ─────────────────────────────────────────────────────

    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// All live entities carrying a `T`, in view order.
    pub fn entities_with<T: 'static + Send + Sync>(&self) -> Vec<Entity> {
        let type_id = TypeId::of::<T>();
        self.archetypes
            .iter()
            .filter(|arch| arch.has_component(&type_id))
            .flat_map(|arch| arch.entities.iter().copied())
            .collect()
    }

    /// Find or create the archetype for `key`, returning its index.
    fn archetype_id(&mut self, key: ArchetypeKey) -> usize {
        if let Some(&id) = self.archetype_index.get(&key) {
            return id;
        }
        let id = self.archetypes.len();
        self.archetypes.push(Archetype::new(key.clone()));
        self.archetype_index.insert(key, id);
        id
    }

    /// Point whichever entity was swapped into `row` at its new row.
    fn patch_swapped(&mut self, swapped: Option<Entity>, row: usize) {
        if let Some(moved) = swapped {
            if let Some(loc) = self.entity_locations.get_mut(&moved.index) {
                loc.row = row;
            }
        }
    }

    /// Create an entity with no components.
    pub fn spawn_empty(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        let archetype = self.archetype_id(Vec::new());
        let row = self.archetypes[archetype].push_row(entity, DetachedRow::new());
        self.entity_locations
            .insert(entity.index, EntityLocation { archetype, row });
        entity
    }

    /// Create an entity from a tuple of components.
    ///
    /// ```ignore
    /// let e = world.spawn((Position::new(100.0, 300.0), Energy(100)));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the bundle names the same component type twice.
    pub fn spawn<B: SpawnBundle>(&mut self, bundle: B) -> Entity {
        let type_ids = B::type_ids();
        let key = archetype_key(type_ids.clone());
        assert_eq!(
            key.len(),
            type_ids.len(),
            "spawn bundle `{}` contains the same component type twice",
            std::any::type_name::<B>()
        );

        let entity = self.allocator.allocate();
        let archetype = self.archetype_id(key);
        let arch = &mut self.archetypes[archetype];
        bundle.push_into(&mut arch.columns);
        arch.entities.push(entity);
        let row = arch.entities.len() - 1;
        self.entity_locations
            .insert(entity.index, EntityLocation { archetype, row });
        entity
    }

    /// Destroy an entity and drop all of its components immediately.
    ///
    /// Returns `false` for a stale handle, so despawning twice is harmless.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }
        if let Some(loc) = self.entity_locations.remove(&entity.index) {
            let swapped = self.archetypes[loc.archetype].swap_remove(loc.row);
            self.patch_swapped(swapped, loc.row);
        }
        self.allocator.deallocate(entity)
    }

    /// Despawn every entity in `entities`, skipping ones already gone.
    /// Returns how many were actually destroyed.
    pub fn despawn_batch(&mut self, entities: impl IntoIterator<Item = Entity>) -> usize {
        entities
            .into_iter()
            .filter(|&entity| self.despawn(entity))
            .count()
    }

    // ── Per-Entity Component Access ──────────────────────────────────

    /// `None` if the entity is dead or lacks the component.
    pub fn get<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        let loc = self.entity_locations.get(&entity.index)?;
        let col = self.archetypes[loc.archetype]
            .columns
            .get(&TypeId::of::<T>())?;
        Some(col.get::<T>(loc.row))
    }

    /// `None` if the entity is dead or lacks the component.
    pub fn get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        let loc = *self.entity_locations.get(&entity.index)?;
        let col = self.archetypes[loc.archetype]
            .columns
            .get_mut(&TypeId::of::<T>())?;
        Some(col.get_mut::<T>(loc.row))
    }

    /// Move an entity's row from its archetype into the one for `new_key`.
    fn migrate(
        &mut self,
        entity: Entity,
        from: EntityLocation,
        new_key: ArchetypeKey,
        row: DetachedRow,
    ) {
        let archetype = self.archetype_id(new_key);
        let new_row = self.archetypes[archetype].push_row(entity, row);
        self.entity_locations.insert(
            entity.index,
            EntityLocation {
                archetype,
                row: new_row,
            },
        );
        debug_assert_ne!(from.archetype, archetype);
    }

    /// Attach a component, replacing an existing one of the same type.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    pub fn insert<T: 'static + Send + Sync>(&mut self, entity: Entity, component: T) {
        assert!(
            self.allocator.is_alive(entity),
            "Cannot insert component `{}` on dead entity {:?}",
            std::any::type_name::<T>(),
            entity
        );
        let Some(&loc) = self.entity_locations.get(&entity.index) else {
            return;
        };
        let tid = TypeId::of::<T>();

        if let Some(col) = self.archetypes[loc.archetype].columns.get_mut(&tid) {
            *col.get_mut::<T>(loc.row) = component;
            return;
        }

        let mut new_key = self.archetypes[loc.archetype].key.clone();
        new_key.push(tid);
        let new_key = archetype_key(new_key);

        let (mut row, swapped) = self.archetypes[loc.archetype].take_row(loc.row);
        self.patch_swapped(swapped, loc.row);
        row.insert(tid, Box::new(component));
        self.migrate(entity, loc, new_key, row);
    }

    /// Detach a component. Returns `false` if the entity didn't have one.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    pub fn remove<T: 'static + Send + Sync>(&mut self, entity: Entity) -> bool {
        assert!(
            self.allocator.is_alive(entity),
            "Cannot remove component `{}` from dead entity {:?}",
            std::any::type_name::<T>(),
            entity
        );
        let Some(&loc) = self.entity_locations.get(&entity.index) else {
            return false;
        };
        let tid = TypeId::of::<T>();
        if !self.archetypes[loc.archetype].has_component(&tid) {
            return false;
        }

        let new_key: ArchetypeKey = self.archetypes[loc.archetype]
            .key
            .iter()
            .copied()
            .filter(|&t| t != tid)
            .collect();

        let (mut row, swapped) = self.archetypes[loc.archetype].take_row(loc.row);
        self.patch_swapped(swapped, loc.row);
        row.remove(&tid);
        self.migrate(entity, loc, new_key, row);
        true
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Visit every entity that has all of `Q`'s component types.
    ///
    /// ```ignore
    /// world.query::<(&mut Position, &Velocity)>(|_, (pos, vel)| {
    ///     pos.0 += vel.direction * vel.speed * dt;
    /// });
    /// ```
    pub fn query<Q: QueryParam>(&mut self, mut f: impl FnMut(Entity, Q::Item<'_>)) {
        let required = Q::type_ids();
        for arch in self.archetypes.iter_mut() {
            if arch.entities.is_empty() || !arch.has_all(&required) {
                continue;
            }
            let mut cols = Q::extract(&mut arch.columns);
            for (row, &entity) in arch.entities.iter().enumerate() {
                f(entity, Q::fetch(&mut cols, row));
            }
            Q::restore(cols, &mut arch.columns);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ── Spawn Bundles ────────────────────────────────────────────────────────

/// A tuple of components that can be spawned in one go. Implemented for
/// tuples of up to 12 components.
pub trait SpawnBundle {
    fn type_ids() -> Vec<TypeId>;

    #[doc(hidden)]
    fn push_into(self, columns: &mut HashMap<TypeId, ComponentColumn>);
}

macro_rules! impl_spawn_bundle {
    ($($T:ident),+) => {
        impl<$($T: 'static + Send + Sync),+> SpawnBundle for ($($T,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$T>()),+]
            }

            #[allow(non_snake_case)]
            fn push_into(self, columns: &mut HashMap<TypeId, ComponentColumn>) {
                let ($($T,)+) = self;
                $(
                    if let Some(column) = columns.get_mut(&TypeId::of::<$T>()) {
                        column.push::<$T>($T);
                    }
                )+
            }
        }
    };
}

impl_spawn_bundle!(A);
impl_spawn_bundle!(A, B);
impl_spawn_bundle!(A, B, C);
impl_spawn_bundle!(A, B, C, D);
impl_spawn_bundle!(A, B, C, D, E);
impl_spawn_bundle!(A, B, C, D, E, F);
impl_spawn_bundle!(A, B, C, D, E, F, G);
impl_spawn_bundle!(A, B, C, D, E, F, G, H);
impl_spawn_bundle!(A, B, C, D, E, F, G, H, I);
impl_spawn_bundle!(A, B, C, D, E, F, G, H, I, J);
impl_spawn_bundle!(A, B, C, D, E, F, G, H, I, J, K);
impl_spawn_bundle!(A, B, C, D, E, F, G, H, I, J, K, L);
