//! # Archetype-Based Component Store
//!
//! A small Entity Component System in the style of
//! [hecs](https://github.com/Ralith/hecs): archetype tables, generational
//! handles, closure-based views and `FnMut(&mut World)` systems. No `unsafe`.
//!
//! - [`entity`]: generational entity ids
//! - `component`: type-erased columns (`Box<dyn Any>`)
//! - `archetype`: entities grouped by component signature
//! - [`world`]: entities, components and resources
//! - `query`: views over matching archetypes
//! - [`system`]: system trait and ordered schedule

pub(crate) mod archetype;
pub(crate) mod component;
pub mod entity;
pub(crate) mod query;
pub mod system;
pub mod world;

pub use entity::Entity;
pub use query::QueryParam;
pub use system::{Schedule, System};
pub use world::{SpawnBundle, World};
