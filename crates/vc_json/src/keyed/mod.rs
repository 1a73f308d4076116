//! Keyed-map codec.
//!
//! Writes maps with keys of any serializable type as JSON objects. A key is
//! written through `serde_json`: a key that serializes to a string is used as
//! the property name as is, any other key as its compact JSON text.
//!
//! Reading tries each property name first as a string value, then as JSON
//! text, so `1`, `"a"`, a custom scalar and a struct key all come back as
//! they were written.
//!
//! ## Menu
//!
//! - [`KeyedContainer`]: maps this codec can fill and walk.
//! - [`KeyedMap`]: insertion ordered map encoded with this codec.
//! - [`serialize`] / [`deserialize`]: for `#[serde(with = "vc_json::keyed")]`.
//! - [`encode_key`] / [`decode_key`]: the key conversion alone.
//!
//! ## Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Debug)]
//! struct Cell { x: i32, y: i32 }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Sheet {
//!     #[serde(with = "vc_json::keyed")]
//!     cells: BTreeMap<Cell, String>,
//! }
//!
//! let mut cells = BTreeMap::new();
//! cells.insert(Cell { x: 1, y: 2 }, "a".to_string());
//! let sheet = Sheet { cells };
//!
//! let text = serde_json::to_string(&sheet).unwrap();
//! assert_eq!(text, r#"{"cells":{"{\"x\":1,\"y\":2}":"a"}}"#);
//! assert_eq!(serde_json::from_str::<Sheet>(&text).unwrap(), sheet);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod container;
mod map;

// -----------------------------------------------------------------------------
// Exports

pub use container::KeyedContainer;
pub use map::KeyedMap;

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use core::any::type_name;
use core::fmt;
use core::marker::PhantomData;

use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::Error;
use crate::error::describe;

// -----------------------------------------------------------------------------
// Keys

/// Converts a key to the property name it is written as.
///
/// A `null` key fails with [`Error::MissingKey`].
pub fn encode_key<K: Serialize + ?Sized>(key: &K) -> Result<Cow<'static, str>, Error> {
    match serde_json::to_value(key)? {
        Value::String(name) => Ok(Cow::Owned(name)),
        Value::Null => Err(Error::MissingKey {
            key: type_name::<K>(),
        }),
        other => Ok(Cow::Owned(other.to_string())),
    }
}

/// Converts a property name back to a key.
///
/// The name is tried as a string value first, then as JSON text. A name that
/// reads as `null` fails with [`Error::MissingKey`].
pub fn decode_key<K: DeserializeOwned>(name: &str) -> Result<K, Error> {
    if let Ok(key) = serde_json::from_value::<K>(Value::String(name.to_string())) {
        return Ok(key);
    }

    let value: Value = match serde_json::from_str(name) {
        Ok(value) => value,
        Err(_) => {
            return Err(Error::MalformedInput {
                expected: type_name::<K>(),
                found: alloc::format!("the property name '{name}'"),
            });
        }
    };

    if value.is_null() {
        return Err(Error::MissingKey {
            key: type_name::<K>(),
        });
    }

    let kind = describe(&value);
    serde_json::from_value(value).map_err(|err| Error::MalformedInput {
        expected: type_name::<K>(),
        found: alloc::format!("{kind} in the property name '{name}': {err}"),
    })
}

// -----------------------------------------------------------------------------
// Serde

/// Writes the map as a JSON object.
pub fn serialize<M, S>(map: &M, serializer: S) -> Result<S::Ok, S::Error>
where
    M: KeyedContainer,
    M::Key: Serialize,
    M::Value: Serialize,
    S: Serializer,
{
    let mut state = serializer.serialize_map(Some(map.entry_count()))?;
    for (key, value) in map.entries() {
        let name = encode_key(key).map_err(Error::into_ser)?;
        state.serialize_entry(&*name, value)?;
    }
    state.end()
}

/// Reads a JSON object into the map.
///
/// A property name repeated in the object fails with [`Error::MalformedInput`].
pub fn deserialize<'de, M, D>(deserializer: D) -> Result<M, D::Error>
where
    M: KeyedContainer,
    M::Key: DeserializeOwned,
    M::Value: serde::Deserialize<'de>,
    D: Deserializer<'de>,
{
    deserializer.deserialize_map(KeyedVisitor::<M>(PhantomData))
}

struct KeyedVisitor<M>(PhantomData<fn() -> M>);

impl<'de, M> Visitor<'de> for KeyedVisitor<M>
where
    M: KeyedContainer,
    M::Key: DeserializeOwned,
    M::Value: serde::Deserialize<'de>,
{
    type Value = M;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an object keyed by `{}`", type_name::<M::Key>())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<M, A::Error> {
        let mut map = M::with_capacity(access.size_hint().unwrap_or_default());

        while let Some(name) = access.next_key::<String>()? {
            let key = decode_key::<M::Key>(&name).map_err(Error::into_de)?;
            let value = access.next_value::<M::Value>()?;
            if !map.insert_entry(key, value) {
                return Err(Error::into_de(Error::MalformedInput {
                    expected: "unique property names",
                    found: alloc::format!("'{name}' more than once"),
                }));
            }
        }

        Ok(map)
    }
}

// -----------------------------------------------------------------------------
// Tests
