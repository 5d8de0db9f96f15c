//! # Component Columns
//!
//! Components are plain data: a `Position`, a `Timer`, an `Energy`. The store
//! has to hold any of them without knowing the type at compile time, because
//! archetypes are assembled while the game runs (a bullet gains nothing, but
//! `insert` can move an entity into a brand-new archetype).
//!
//! A [`ComponentColumn`] is a `Vec<Box<dyn Any + Send + Sync>>`. Every access
//! goes through `downcast_ref` / `downcast_mut`, so there is no `unsafe`
//! anywhere in the store. A type mismatch means the store itself is broken and
//! panics with the expected type name.

use std::any::Any;

/// One column of boxed components, parallel to an archetype's entity list.
///
/// Public only so [`QueryParam`](super::query::QueryParam) can name it; the
/// module itself is private to the crate.
pub struct ComponentColumn {
    data: Vec<Box<dyn Any + Send + Sync>>,
}

impl ComponentColumn {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Push a typed component onto the end of the column.
    pub fn push<T: 'static + Send + Sync>(&mut self, value: T) {
        self.data.push(Box::new(value));
    }

    /// Push an already boxed component. Used when an entity changes archetype.
    pub fn push_any(&mut self, value: Box<dyn Any + Send + Sync>) {
        self.data.push(value);
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds or the stored type is not `T`.
    pub fn get<T: 'static>(&self, index: usize) -> &T {
        self.data[index].downcast_ref().unwrap_or_else(|| {
            panic!(
                "component column type mismatch: expected `{}`",
                std::any::type_name::<T>()
            )
        })
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds or the stored type is not `T`.
    pub fn get_mut<T: 'static>(&mut self, index: usize) -> &mut T {
        self.data[index].downcast_mut().unwrap_or_else(|| {
            panic!(
                "component column type mismatch: expected `{}`",
                std::any::type_name::<T>()
            )
        })
    }

    /// Swap-remove and drop the component at `index`.
    pub fn swap_remove(&mut self, index: usize) {
        self.data.swap_remove(index);
    }

    /// Swap-remove the component at `index` and hand it back still boxed.
    pub fn take(&mut self, index: usize) -> Box<dyn Any + Send + Sync> {
        self.data.swap_remove(index)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}
