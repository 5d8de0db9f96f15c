//! # Archetype: Entities Grouped by Component Signature
//!
//! Every entity that has exactly the same set of component types lives in the
//! same archetype table. A bullet (`Position`, `Velocity`, `Image`, ...,
//! `Damage`) and the player (`Position`, `Velocity`, `Gamepad`, `Timer`, ...)
//! live in different tables; all bullets share one.
//!
//! ```text
//! Archetype { key: [Position, Velocity, Damage] }
//!
//! columns:
//!   Position: [p0, p1, p2]
//!   Velocity: [v0, v1, v2]
//!   Damage:   [d0, d1, d2]
//! entities:   [e0, e1, e2]   ← row i in every column belongs to entities[i]
//! ```
//!
//! Removing a row swap-removes it from every column, so the last entity moves
//! into the hole and the caller must patch that entity's location.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::component::ComponentColumn;
use super::entity::Entity;

/// Sorted, deduplicated list of component [`TypeId`]s. `(A, B)` and `(B, A)`
/// produce the same key.
pub(crate) type ArchetypeKey = Vec<TypeId>;

pub(crate) fn archetype_key(mut type_ids: Vec<TypeId>) -> ArchetypeKey {
    type_ids.sort();
    type_ids.dedup();
    type_ids
}

/// All components of one entity, detached from any archetype.
pub(crate) type DetachedRow = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

pub(crate) struct Archetype {
    pub key: ArchetypeKey,
    pub columns: HashMap<TypeId, ComponentColumn>,
    pub entities: Vec<Entity>,
}

impl Archetype {
    /// Create an empty table with one column per type in `key`.
    pub fn new(key: ArchetypeKey) -> Self {
        let columns = key.iter().map(|&tid| (tid, ComponentColumn::new())).collect();
        Self {
            key,
            columns,
            entities: Vec::new(),
        }
    }

    pub fn has_component(&self, type_id: &TypeId) -> bool {
        self.columns.contains_key(type_id)
    }

    /// Superset check used by queries.
    pub fn has_all(&self, type_ids: &[TypeId]) -> bool {
        type_ids.iter().all(|tid| self.has_component(tid))
    }

    /// Drop the row at `index`. Returns the entity that was moved into the
    /// hole, if any.
    pub fn swap_remove(&mut self, index: usize) -> Option<Entity> {
        for column in self.columns.values_mut() {
            column.swap_remove(index);
        }
        self.entities.swap_remove(index);
        self.entities.get(index).copied()
    }

    /// Detach the row at `index` without dropping its components. Returns the
    /// components plus the entity moved into the hole, if any.
    pub fn take_row(&mut self, index: usize) -> (DetachedRow, Option<Entity>) {
        let row = self
            .columns
            .iter_mut()
            .map(|(&tid, column)| (tid, column.take(index)))
            .collect();
        self.entities.swap_remove(index);
        (row, self.entities.get(index).copied())
    }

    /// Append a detached row. Components whose type has no column here are
    /// dropped. Returns the new row index.
    pub fn push_row(&mut self, entity: Entity, mut row: DetachedRow) -> usize {
        for (tid, column) in self.columns.iter_mut() {
            if let Some(value) = row.remove(tid) {
                column.push_any(value);
            }
        }
        self.entities.push(entity);
        self.entities.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_order_independent() {
        let a = archetype_key(vec![TypeId::of::<u32>(), TypeId::of::<f32>()]);
        let b = archetype_key(vec![TypeId::of::<f32>(), TypeId::of::<u32>()]);
        assert_eq!(a, b);
    }

    #[test]
    fn take_row_reports_swapped_entity() {
        let key = archetype_key(vec![TypeId::of::<u32>()]);
        let mut arch = Archetype::new(key);
        let e0 = Entity { index: 0, generation: 0 };
        let e1 = Entity { index: 1, generation: 0 };
        for (e, v) in [(e0, 10u32), (e1, 20u32)] {
            let mut row = DetachedRow::new();
            row.insert(TypeId::of::<u32>(), Box::new(v));
            arch.push_row(e, row);
        }

        let (row, swapped) = arch.take_row(0);
        assert_eq!(swapped, Some(e1));
        assert_eq!(arch.entities, vec![e1]);
        let value = row.get(&TypeId::of::<u32>()).and_then(|b| b.downcast_ref::<u32>());
        assert_eq!(value, Some(&10));
        assert_eq!(*arch.columns[&TypeId::of::<u32>()].get::<u32>(0), 20);
    }

    #[test]
    fn swap_remove_last_row_swaps_nothing() {
        let mut arch = Archetype::new(archetype_key(vec![TypeId::of::<u8>()]));
        let e0 = Entity { index: 0, generation: 0 };
        let mut row = DetachedRow::new();
        row.insert(TypeId::of::<u8>(), Box::new(1u8));
        arch.push_row(e0, row);
        assert_eq!(arch.swap_remove(0), None);
        assert!(arch.entities.is_empty());
        assert_eq!(arch.columns[&TypeId::of::<u8>()].len(), 0);
    }
}
