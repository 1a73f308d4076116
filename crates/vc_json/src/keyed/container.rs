use alloc::collections::BTreeMap;
use core::hash::{BuildHasher, Hash};

// -----------------------------------------------------------------------------
// KeyedContainer

/// A map the keyed codec can fill and walk.
///
/// Implemented for the standard maps, [`hashbrown::HashMap`],
/// [`indexmap::IndexMap`] and [`KeyedMap`](super::KeyedMap).
pub trait KeyedContainer {
    type Key;
    type Value;

    /// An empty container sized for about `capacity` entries.
    fn with_capacity(capacity: usize) -> Self;

    /// Inserts an entry unless the key is already present.
    ///
    /// Returns `false` and leaves the container unchanged for a repeated key.
    fn insert_entry(&mut self, key: Self::Key, value: Self::Value) -> bool;

    fn entry_count(&self) -> usize;

    /// Entries in the iteration order of the container.
    fn entries(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> KeyedContainer for std::collections::HashMap<K, V, S> {
    type Key = K;
    type Value = V;

    #[inline]
    fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }

    fn insert_entry(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    #[inline]
    fn entry_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }
}

impl<K: Ord, V> KeyedContainer for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    #[inline]
    fn with_capacity(_: usize) -> Self {
        Self::new()
    }

    fn insert_entry(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            alloc::collections::btree_map::Entry::Occupied(_) => false,
            alloc::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    #[inline]
    fn entry_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> KeyedContainer for hashbrown::HashMap<K, V, S> {
    type Key = K;
    type Value = V;

    #[inline]
    fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }

    fn insert_entry(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            hashbrown::hash_map::Entry::Occupied(_) => false,
            hashbrown::hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    #[inline]
    fn entry_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }
}

impl<K: Eq + Hash, V, S: BuildHasher + Default> KeyedContainer for indexmap::IndexMap<K, V, S> {
    type Key = K;
    type Value = V;

    #[inline]
    fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }

    fn insert_entry(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    #[inline]
    fn entry_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }
}

// -----------------------------------------------------------------------------
// Tests
