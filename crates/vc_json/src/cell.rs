//! Static storage keyed by type.
//!
//! A `static` declared inside a generic function is shared by every
//! instantiation of that function, so per-type data such as the token table
//! of a [`FieldEnum`](crate::field::FieldEnum) needs a map keyed by [`TypeId`].
//!
//! [`TypeCell`] builds each entry at most once, under the write lock, and
//! leaks it so readers can hold a `'static` reference.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use std::sync::{PoisonError, RwLock};

use foldhash::fast::FixedState;
use hashbrown::HashMap;

type TypeIdMap<V> = HashMap<TypeId, V, FixedState>;

/// Container of lazily built, never mutated values, one per type.
///
/// # Example
///
/// ```
/// use vc_json::cell::TypeCell;
///
/// fn type_name_len<T: 'static>() -> &'static usize {
///     static CELL: TypeCell = TypeCell::new();
///     CELL.get_or_insert::<T, usize>(|| core::any::type_name::<T>().len())
/// }
///
/// assert_eq!(*type_name_len::<u8>(), 2);
/// assert_eq!(*type_name_len::<u16>(), 3);
/// ```
pub struct TypeCell(RwLock<TypeIdMap<&'static (dyn Any + Send + Sync)>>);

impl TypeCell {
    /// Create a empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(HashMap::with_hasher(FixedState::with_seed(0x7C15_9E37_79B9_7F4A))))
    }

    /// Returns the value stored for `G`, building it with `f` on first use.
    ///
    /// Concurrent first calls for the same `G` run `f` once.
    #[inline(always)]
    pub fn get_or_insert<G, T>(&self, f: impl FnOnce() -> T) -> &'static T
    where
        G: Any + ?Sized,
        T: Any + Send + Sync,
    {
        let entry = self.get_or_insert_by_type_id(TypeId::of::<G>(), || {
            Box::leak(Box::new(f())) as &'static (dyn Any + Send + Sync)
        });
        let Some(value) = entry.downcast_ref::<T>() else {
            unreachable!("TypeCell entry stored with a different value type");
        };
        value
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(
        &self,
        type_id: TypeId,
        f: impl FnOnce() -> &'static (dyn Any + Send + Sync),
    ) -> &'static (dyn Any + Send + Sync) {
        if let Some(entry) = self
            .0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
        {
            return *entry;
        }

        *self
            .0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(type_id)
            .or_insert_with(f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeCell;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn built_once_per_type() {
        static CELL: TypeCell = TypeCell::new();
        static BUILDS: AtomicUsize = AtomicUsize::new(0);

        fn get<G: 'static>(v: u32) -> &'static u32 {
            CELL.get_or_insert::<G, u32>(|| {
                BUILDS.fetch_add(1, Ordering::SeqCst);
                v
            })
        }

        let handles: alloc::vec::Vec<_> = (0..8)
            .map(|i| thread::spawn(move || *get::<u8>(i)))
            .collect();
        let values: alloc::vec::Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(values.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(*get::<u16>(42), 42);
        assert_eq!(*get::<u16>(7), 42);
        assert_eq!(BUILDS.load(Ordering::SeqCst), 2);
    }
}
