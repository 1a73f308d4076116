use alloc::borrow::ToOwned;
use alloc::string::{String, ToString};
use core::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::{HasDiscriminator, Polymorphic};
use crate::Error;
use crate::error::describe;

/// Serializes `value` through its runtime type.
///
/// The trait object dispatches to the `Serialize` implementation of the
/// concrete type, so every field of that type is written.
#[inline]
pub fn serialize_by_runtime_type<B, S>(value: &B, serializer: S) -> Result<S::Ok, S::Error>
where
    B: ?Sized + erased_serde::Serialize,
    S: Serializer,
{
    erased_serde::serialize(value, serializer)
}

/// Serializes a value of a polymorphic base with its discriminator.
///
/// The runtime type is written as an object. The property
/// [`B::DISCRIMINATOR_FIELD`](Polymorphic::DISCRIMINATOR_FIELD) is inserted
/// first when the type does not write it itself. When it does, the written
/// value must equal [`HasDiscriminator::discriminator`], otherwise encoding
/// fails with [`Error::DiscriminatorMismatch`].
pub fn serialize_polymorphic<B, S>(value: &B, serializer: S) -> Result<S::Ok, S::Error>
where
    B: ?Sized + Polymorphic + HasDiscriminator<B::Discriminator> + erased_serde::Serialize,
    S: Serializer,
{
    tagged_object(value)
        .map_err(Error::into_ser)?
        .serialize(serializer)
}

/// The runtime fields of `value` with the discriminator property set.
pub(super) fn tagged_object<B>(value: &B) -> Result<Map<String, Value>, Error>
where
    B: ?Sized + Polymorphic + HasDiscriminator<B::Discriminator> + erased_serde::Serialize,
{
    let field = B::DISCRIMINATOR_FIELD;
    let expected = serde_json::to_value(value.discriminator())?;

    let object = match serde_json::to_value(RuntimeTyped::new(value))? {
        Value::Object(object) => object,
        other => {
            return Err(Error::MalformedInput {
                expected: "a variant written as an object",
                found: describe(&other).to_owned(),
            });
        }
    };

    match object.get(field) {
        Some(found) if *found == expected => Ok(object),
        Some(found) => Err(Error::DiscriminatorMismatch {
            field,
            expected: expected.to_string(),
            found: found.to_string(),
        }),
        None => {
            let mut tagged = Map::new();
            tagged.insert(field.to_owned(), expected);
            tagged.extend(object);
            Ok(tagged)
        }
    }
}

/// Wraps a trait object so it serializes as its runtime type.
///
/// Only encoding goes through the runtime type; there is nothing to decode
/// into without a discriminator.
///
/// # Example
///
/// ```
/// use vc_json::typed::RuntimeTyped;
///
/// trait Named: erased_serde::Serialize {}
///
/// #[derive(serde::Serialize)]
/// struct Dog { name: &'static str, good: bool }
/// impl Named for Dog {}
///
/// let dog: Box<dyn Named> = Box::new(Dog { name: "rex", good: true });
/// let text = serde_json::to_string(&RuntimeTyped::new(&*dog)).unwrap();
/// assert_eq!(text, r#"{"name":"rex","good":true}"#);
/// ```
pub struct RuntimeTyped<'a, B: ?Sized>(&'a B);

impl<'a, B: ?Sized + erased_serde::Serialize> RuntimeTyped<'a, B> {
    #[inline]
    pub const fn new(value: &'a B) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn get(&self) -> &'a B {
        self.0
    }
}

impl<B: ?Sized + erased_serde::Serialize> Serialize for RuntimeTyped<'_, B> {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_by_runtime_type(self.0, serializer)
    }
}

impl<B: ?Sized> Clone for RuntimeTyped<'_, B> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized> Copy for RuntimeTyped<'_, B> {}

impl<B: ?Sized> fmt::Debug for RuntimeTyped<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RuntimeTyped")
            .field(&core::any::type_name::<B>())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
