use alloc::format;
use alloc::string::String;
use core::fmt;
use core::marker::PhantomData;

use serde::Deserializer;
use serde::de::{DeserializeSeed, Error as _, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};

// -----------------------------------------------------------------------------
// Captured

/// Outcome of walking one top-level value.
pub(super) enum Captured<D> {
    /// An object, fully mirrored into `buffer`.
    Object {
        discriminator: Option<D>,
        buffer: Map<String, Value>,
    },
    /// Anything but an object.
    Other(&'static str),
}

// -----------------------------------------------------------------------------
// CaptureSeed

/// Walks the properties of an object at depth 0, mirroring each of them into
/// a buffer and decoding the first one named `field` as `D`.
///
/// Nested values are captured whole, so a property of an inner object that
/// happens to share the name of the discriminator is only mirrored.
pub(super) struct CaptureSeed<D> {
    field: &'static str,
    _marker: PhantomData<fn() -> D>,
}

impl<D> CaptureSeed<D> {
    #[inline]
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            _marker: PhantomData,
        }
    }
}

impl<'de, D> DeserializeSeed<'de> for CaptureSeed<D>
where
    D: serde::Deserialize<'de> + serde::Serialize,
{
    type Value = Captured<D>;

    fn deserialize<De: Deserializer<'de>>(self, deserializer: De) -> Result<Captured<D>, De::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de, D> Visitor<'de> for CaptureSeed<D>
where
    D: serde::Deserialize<'de> + serde::Serialize,
{
    type Value = Captured<D>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an object with a '{}' property", self.field)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Captured<D>, A::Error> {
        let mut buffer = Map::new();
        let mut discriminator = None;

        while let Some(key) = map.next_key::<String>()? {
            if discriminator.is_none() && key == self.field {
                let value: D = map.next_value()?;
                let mirrored = serde_json::to_value(&value).map_err(|err| {
                    A::Error::custom(format!("discriminator '{}' is not a JSON value: {err}", self.field))
                })?;
                buffer.insert(key, mirrored);
                discriminator = Some(value);
            } else {
                let value: Value = map.next_value()?;
                buffer.insert(key, value);
            }
        }

        Ok(Captured::Object {
            discriminator,
            buffer,
        })
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Captured<D>, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Captured::Other("an array"))
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Captured<D>, E> {
        Ok(Captured::Other("null"))
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Captured<D>, E> {
        Ok(Captured::Other("null"))
    }

    fn visit_some<De: Deserializer<'de>>(self, deserializer: De) -> Result<Captured<D>, De::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: serde::de::Error>(self, _: bool) -> Result<Captured<D>, E> {
        Ok(Captured::Other("a boolean"))
    }

    fn visit_i64<E: serde::de::Error>(self, _: i64) -> Result<Captured<D>, E> {
        Ok(Captured::Other("a number"))
    }

    fn visit_u64<E: serde::de::Error>(self, _: u64) -> Result<Captured<D>, E> {
        Ok(Captured::Other("a number"))
    }

    fn visit_f64<E: serde::de::Error>(self, _: f64) -> Result<Captured<D>, E> {
        Ok(Captured::Other("a number"))
    }

    fn visit_str<E: serde::de::Error>(self, _: &str) -> Result<Captured<D>, E> {
        Ok(Captured::Other("a string"))
    }

    fn visit_bytes<E: serde::de::Error>(self, _: &[u8]) -> Result<Captured<D>, E> {
        Ok(Captured::Other("bytes"))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{CaptureSeed, Captured};
    use serde::de::DeserializeSeed;

    fn capture(text: &str) -> Captured<i32> {
        let mut de = serde_json::Deserializer::from_str(text);
        let captured = CaptureSeed::<i32>::new("Type").deserialize(&mut de).unwrap();
        de.end().unwrap();
        captured
    }

    #[test]
    fn mirrors_every_property() {
        let Captured::Object { discriminator, buffer } =
            capture(r#"{"Name":"a","Inner":{"Type":9,"List":[1,2.5,null,true]},"Type":1}"#)
        else {
            panic!("expected an object");
        };

        assert_eq!(discriminator, Some(1));
        let keys: alloc::vec::Vec<&str> = buffer.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["Name", "Inner", "Type"]);
        assert_eq!(buffer["Inner"]["Type"], 9);
        assert_eq!(buffer["Inner"]["List"][1], 2.5);
        assert_eq!(buffer["Type"], 1);
    }

    #[test]
    fn first_discriminator_wins() {
        let Captured::Object { discriminator, .. } = capture(r#"{"Type":2,"Type":3}"#) else {
            panic!("expected an object");
        };
        assert_eq!(discriminator, Some(2));
    }

    #[test]
    fn empty_object() {
        let Captured::Object { discriminator, buffer } = capture("{}") else {
            panic!("expected an object");
        };
        assert!(discriminator.is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn other_values() {
        for (text, found) in [
            ("123", "a number"),
            ("\"value\"", "a string"),
            ("[]", "an array"),
            ("[1,[2]]", "an array"),
            ("null", "null"),
            ("false", "a boolean"),
        ] {
            match capture(text) {
                Captured::Other(kind) => assert_eq!(kind, found),
                Captured::Object { .. } => panic!("{text} is not an object"),
            }
        }
    }

    #[test]
    fn wrong_discriminator_type() {
        let mut de = serde_json::Deserializer::from_str(r#"{"Type":"one"}"#);
        assert!(CaptureSeed::<i32>::new("Type").deserialize(&mut de).is_err());
    }
}
