//! # Query: Views Over Matching Archetypes
//!
//! ```text
//! world.query::<(&mut Position, &Velocity)>(|entity, (pos, vel)| { ... });
//!
//! 1. TypeIds: [Position, Velocity]
//! 2. For each archetype, in creation order:
//!    - superset check: has Position AND Velocity?
//!    - extract those columns, visit every row, restore the columns
//! ```
//!
//! `Iterator` cannot hand out items that borrow from the iterator itself, so
//! views are closures. The needed columns are temporarily removed from the
//! archetype's map, which lets the borrow checker see that `&mut Position` and
//! `&Velocity` never alias, and are put back once the rows are visited.

use std::any::TypeId;
use std::collections::HashMap;

use super::component::ComponentColumn;

/// Something that can be fetched per row from an archetype: `&T`, `&mut T`,
/// or a tuple of those.
pub trait QueryParam {
    type Item<'w>;

    /// Columns owned by the query while it runs.
    #[doc(hidden)]
    type Column;

    fn type_ids() -> Vec<TypeId>;

    #[doc(hidden)]
    fn extract(columns: &mut HashMap<TypeId, ComponentColumn>) -> Self::Column;

    #[doc(hidden)]
    fn restore(col: Self::Column, columns: &mut HashMap<TypeId, ComponentColumn>);

    #[doc(hidden)]
    fn fetch(col: &mut Self::Column, index: usize) -> Self::Item<'_>;
}

fn extract_column<T: 'static>(
    columns: &mut HashMap<TypeId, ComponentColumn>,
) -> (TypeId, ComponentColumn) {
    let tid = TypeId::of::<T>();
    let col = columns.remove(&tid).unwrap_or_else(|| {
        panic!(
            "query: column for `{}` missing or requested twice",
            std::any::type_name::<T>()
        )
    });
    (tid, col)
}

impl<T: 'static + Send + Sync> QueryParam for &T {
    type Item<'w> = &'w T;
    type Column = (TypeId, ComponentColumn);

    fn type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn extract(columns: &mut HashMap<TypeId, ComponentColumn>) -> Self::Column {
        extract_column::<T>(columns)
    }

    fn restore(col: Self::Column, columns: &mut HashMap<TypeId, ComponentColumn>) {
        columns.insert(col.0, col.1);
    }

    fn fetch(col: &mut Self::Column, index: usize) -> Self::Item<'_> {
        col.1.get::<T>(index)
    }
}

impl<T: 'static + Send + Sync> QueryParam for &mut T {
    type Item<'w> = &'w mut T;
    type Column = (TypeId, ComponentColumn);

    fn type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn extract(columns: &mut HashMap<TypeId, ComponentColumn>) -> Self::Column {
        extract_column::<T>(columns)
    }

    fn restore(col: Self::Column, columns: &mut HashMap<TypeId, ComponentColumn>) {
        columns.insert(col.0, col.1);
    }

    fn fetch(col: &mut Self::Column, index: usize) -> Self::Item<'_> {
        col.1.get_mut::<T>(index)
    }
}

macro_rules! impl_query_param_tuple {
    ($($P:ident),+) => {
        impl<$($P: QueryParam),+> QueryParam for ($($P,)+) {
            type Item<'w> = ($($P::Item<'w>,)+);
            type Column = ($($P::Column,)+);

            fn type_ids() -> Vec<TypeId> {
                let mut ids = Vec::new();
                $(ids.extend($P::type_ids());)+
                ids
            }

            fn extract(columns: &mut HashMap<TypeId, ComponentColumn>) -> Self::Column {
                ($($P::extract(columns),)+)
            }

            #[allow(non_snake_case)]
            fn restore(col: Self::Column, columns: &mut HashMap<TypeId, ComponentColumn>) {
                let ($($P,)+) = col;
                $($P::restore($P, columns);)+
            }

            #[allow(non_snake_case)]
            fn fetch(col: &mut Self::Column, index: usize) -> Self::Item<'_> {
                let ($($P,)+) = col;
                ($($P::fetch($P, index),)+)
            }
        }
    };
}

impl_query_param_tuple!(A);
impl_query_param_tuple!(A, B);
impl_query_param_tuple!(A, B, C);
impl_query_param_tuple!(A, B, C, D);
impl_query_param_tuple!(A, B, C, D, E);
impl_query_param_tuple!(A, B, C, D, E, F);
impl_query_param_tuple!(A, B, C, D, E, F, G);
impl_query_param_tuple!(A, B, C, D, E, F, G, H);
