use core::fmt;
use core::hash::Hash;
use core::ops::{Deref, DerefMut};

use foldhash::fast::FixedState;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::KeyedContainer;

// -----------------------------------------------------------------------------
// KeyedMap

/// An insertion ordered map that serializes through the keyed codec.
///
/// Use it where only the map contract matters, the keys come back in the
/// order they were written.
///
/// # Example
///
/// ```
/// use vc_json::keyed::KeyedMap;
///
/// let map: KeyedMap<(u8, u8), &str> = [((1, 2), "a"), ((0, 0), "b")].into_iter().collect();
/// let text = serde_json::to_string(&map).unwrap();
/// assert_eq!(text, r#"{"[1,2]":"a","[0,0]":"b"}"#);
///
/// let back: KeyedMap<(u8, u8), String> = serde_json::from_str(&text).unwrap();
/// assert_eq!(back[&(0, 0)], "b");
/// ```
pub struct KeyedMap<K, V>(IndexMap<K, V, FixedState>);

impl<K, V> KeyedMap<K, V> {
    #[inline]
    pub fn new() -> Self {
        Self(IndexMap::with_hasher(FixedState::default()))
    }

    #[inline]
    pub fn into_inner(self) -> IndexMap<K, V, FixedState> {
        self.0
    }
}

impl<K, V> Default for KeyedMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for KeyedMap<K, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for KeyedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<K: Eq + Hash, V: PartialEq> PartialEq for KeyedMap<K, V> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<K: Eq + Hash, V: Eq> Eq for KeyedMap<K, V> {}

impl<K, V> Deref for KeyedMap<K, V> {
    type Target = IndexMap<K, V, FixedState>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K, V> DerefMut for KeyedMap<K, V> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for KeyedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.0.extend(iter);
        map
    }
}

impl<K, V> IntoIterator for KeyedMap<K, V> {
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Eq + Hash, V> KeyedContainer for KeyedMap<K, V> {
    type Key = K;
    type Value = V;

    #[inline]
    fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity_and_hasher(capacity, FixedState::default()))
    }

    #[inline]
    fn insert_entry(&mut self, key: K, value: V) -> bool {
        KeyedContainer::insert_entry(&mut self.0, key, value)
    }

    #[inline]
    fn entry_count(&self) -> usize {
        self.0.len()
    }

    #[inline]
    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.0.iter()
    }
}

impl<K: Eq + Hash + Serialize, V: Serialize> Serialize for KeyedMap<K, V> {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        super::serialize(self, serializer)
    }
}

impl<'de, K, V> Deserialize<'de> for KeyedMap<K, V>
where
    K: Eq + Hash + DeserializeOwned,
    V: Deserialize<'de>,
{
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        super::deserialize(deserializer)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use serde::{Deserialize, Serialize};

    use super::KeyedMap;

    #[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone, Copy)]
    enum Side {
        Left,
        Right,
    }

    #[test]
    fn order_follows_insertion() {
        let map: KeyedMap<i64, bool> = [(9, true), (-1, false), (3, true)].into_iter().collect();
        let text = serde_json::to_string(&map).unwrap();
        assert_eq!(text, r#"{"9":true,"-1":false,"3":true}"#);

        let back: KeyedMap<i64, bool> = serde_json::from_str(&text).unwrap();
        let keys: Vec<i64> = back.keys().copied().collect();
        assert_eq!(keys, [9, -1, 3]);
        assert_eq!(back, map);
    }

    #[test]
    fn enum_keys() {
        let mut map = KeyedMap::new();
        map.insert(Side::Right, String::from("r"));
        map.insert(Side::Left, String::from("l"));

        let text = serde_json::to_string(&map).unwrap();
        assert_eq!(text, r#"{"Right":"r","Left":"l"}"#);
        assert_eq!(serde_json::from_str::<KeyedMap<Side, String>>(&text).unwrap(), map);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = serde_json::from_str::<KeyedMap<u8, u8>>(r#"{"1":1,"1":2}"#).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
