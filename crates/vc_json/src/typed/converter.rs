use alloc::boxed::Box;
use alloc::string::String;
use core::any::{TypeId, type_name};
use core::fmt;
use core::marker::PhantomData;

use serde::de::DeserializeSeed;
use serde::{Deserializer, Serializer};
use serde_json::Value;

use super::de::{CaptureSeed, Captured};
use super::ser::tagged_object;
use super::{HasDiscriminator, Polymorphic, VariantRegistry, serialize_polymorphic};
use crate::Error;

// -----------------------------------------------------------------------------
// TypedConverter

/// Decoder and encoder of the polymorphic base `B`.
///
/// `D` is the discriminator type the converter was declared with. When it is
/// not exactly [`B::Discriminator`](Polymorphic::Discriminator) the converter
/// declines every type, and decoding through it reports [`Error::NotConvertible`].
///
/// # Decoding
///
/// See the [module documentation](crate::typed) for the algorithm.
/// The failures are:
///
/// - [`Error::MalformedInput`]: the value is not an object.
/// - [`Error::DiscriminatorMissing`]: the object has no discriminator property.
/// - [`Error::NotFound`], [`Error::AmbiguousVariant`]: from [`VariantRegistry::resolve`].
/// - [`Error::Json`]: the discriminator or the concrete type failed to decode.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use vc_json::derive::{Variant, polymorphic};
/// use vc_json::typed::{TypedConverter, VariantRegistry};
/// use vc_json::Error;
///
/// #[polymorphic(discriminator = String, field = "status")]
/// trait Reply {}
///
/// #[derive(Variant, Serialize, Deserialize)]
/// #[variant(base = dyn Reply, value = "ok")]
/// struct Accepted {
///     status: String,
///     body: String,
/// }
///
/// impl Reply for Accepted {}
///
/// let mut registry = VariantRegistry::<dyn Reply>::new();
/// registry.register::<Accepted>();
/// let converter = TypedConverter::with_registry(&registry);
///
/// let reply = converter.from_str(r#"{"body":"hi","status":"ok"}"#).unwrap();
/// assert_eq!(converter.to_string(&*reply).unwrap(), r#"{"status":"ok","body":"hi"}"#);
///
/// assert!(matches!(converter.from_str("{}"), Err(Error::DiscriminatorMissing { field: "status" })));
/// assert!(matches!(converter.from_str("[]"), Err(Error::MalformedInput { .. })));
/// assert!(matches!(converter.from_str(r#"{"status":"no"}"#), Err(Error::NotFound { .. })));
/// ```
pub struct TypedConverter<'r, B, D = <B as Polymorphic>::Discriminator>
where
    B: ?Sized + Polymorphic,
{
    registry: &'r VariantRegistry<B>,
    _marker: PhantomData<fn() -> D>,
}

impl<B: ?Sized + Polymorphic> TypedConverter<'static, B> {
    /// A converter over the registry of the base.
    #[inline]
    pub fn new() -> Self {
        Self::with_registry(B::registry())
    }
}

impl<'r, B: ?Sized + Polymorphic> TypedConverter<'r, B> {
    /// A converter over the given registry.
    #[inline]
    pub const fn with_registry(registry: &'r VariantRegistry<B>) -> Self {
        Self {
            registry,
            _marker: PhantomData,
        }
    }

    /// The same converter declared with the discriminator type `D`.
    #[inline]
    pub const fn declared_as<D: 'static>(self) -> TypedConverter<'r, B, D> {
        TypedConverter {
            registry: self.registry,
            _marker: PhantomData,
        }
    }
}

impl<B: ?Sized + Polymorphic> Default for TypedConverter<'static, B> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'r, B: ?Sized + Polymorphic, D: 'static> TypedConverter<'r, B, D> {
    #[inline]
    pub const fn registry(&self) -> &'r VariantRegistry<B> {
        self.registry
    }

    /// Whether `D` is the discriminator type of the base.
    #[inline]
    pub fn is_applicable(&self) -> bool {
        TypeId::of::<D>() == TypeId::of::<B::Discriminator>()
    }

    /// Whether the converter handles the type.
    ///
    /// True for `B`, `Box<B>` and the registered variants,
    /// provided the discriminator type matches.
    pub fn can_convert(&self, type_id: TypeId) -> bool {
        self.is_applicable()
            && (type_id == TypeId::of::<B>()
                || type_id == TypeId::of::<Box<B>>()
                || self.registry.contains(type_id))
    }

    #[inline]
    fn check_applicable(&self) -> Result<(), Error> {
        if self.is_applicable() {
            Ok(())
        } else {
            Err(Error::NotConvertible {
                ty: type_name::<B>(),
            })
        }
    }

    fn finish(&self, captured: Captured<B::Discriminator>) -> Result<Box<B>, Error> {
        let (discriminator, buffer) = match captured {
            Captured::Object {
                discriminator,
                buffer,
            } => (discriminator, buffer),
            Captured::Other(found) => {
                return Err(Error::MalformedInput {
                    expected: "an object",
                    found: String::from(found),
                });
            }
        };

        let Some(discriminator) = discriminator else {
            return Err(Error::DiscriminatorMissing {
                field: B::DISCRIMINATOR_FIELD,
            });
        };

        let meta = self.registry.resolve(&discriminator)?;
        Ok(meta.deserialize(Value::Object(buffer))?)
    }

    /// Decodes a polymorphic value from any self-describing format.
    pub fn read<'de, De: Deserializer<'de>>(&self, deserializer: De) -> Result<Box<B>, De::Error> {
        self.check_applicable().map_err(Error::into_de)?;
        let captured = CaptureSeed::new(B::DISCRIMINATOR_FIELD).deserialize(deserializer)?;
        self.finish(captured).map_err(Error::into_de)
    }

    /// Decodes a polymorphic value from JSON text.
    pub fn from_str(&self, text: &str) -> Result<Box<B>, Error> {
        self.from_json(serde_json::Deserializer::from_str(text))
    }

    /// Decodes a polymorphic value from JSON bytes.
    pub fn from_slice(&self, bytes: &[u8]) -> Result<Box<B>, Error> {
        self.from_json(serde_json::Deserializer::from_slice(bytes))
    }

    fn from_json<'de, R>(&self, mut deserializer: serde_json::Deserializer<R>) -> Result<Box<B>, Error>
    where
        R: serde_json::de::Read<'de>,
    {
        self.check_applicable()?;
        let captured = CaptureSeed::new(B::DISCRIMINATOR_FIELD).deserialize(&mut deserializer)?;
        deserializer.end()?;
        self.finish(captured)
    }

    /// Decodes a polymorphic value from a [`Value`].
    pub fn from_value(&self, value: Value) -> Result<Box<B>, Error> {
        self.check_applicable()?;
        let captured = CaptureSeed::new(B::DISCRIMINATOR_FIELD).deserialize(value)?;
        self.finish(captured)
    }
}

impl<'r, B, D> TypedConverter<'r, B, D>
where
    B: ?Sized + Polymorphic + HasDiscriminator<B::Discriminator> + erased_serde::Serialize,
    D: 'static,
{
    /// Encodes `value` through its runtime type, with its discriminator.
    ///
    /// See [`serialize_polymorphic`].
    #[inline]
    pub fn write<S: Serializer>(&self, value: &B, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_polymorphic(value, serializer)
    }

    /// Encodes `value` as JSON text.
    pub fn to_string(&self, value: &B) -> Result<String, Error> {
        Ok(serde_json::to_string(&tagged_object(value)?)?)
    }

    /// Encodes `value` as a [`Value`].
    pub fn to_value(&self, value: &B) -> Result<Value, Error> {
        Ok(Value::Object(tagged_object(value)?))
    }
}

impl<B: ?Sized + Polymorphic, D> Clone for TypedConverter<'_, B, D> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized + Polymorphic, D> Copy for TypedConverter<'_, B, D> {}

impl<B: ?Sized + Polymorphic, D> fmt::Debug for TypedConverter<'_, B, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedConverter")
            .field("base", &type_name::<B>())
            .field("discriminator", &type_name::<D>())
            .field("registry", self.registry)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Serde seed

impl<'de, B: ?Sized + Polymorphic, D: 'static> DeserializeSeed<'de> for TypedConverter<'_, B, D> {
    type Value = Box<B>;

    #[inline]
    fn deserialize<De: Deserializer<'de>>(self, deserializer: De) -> Result<Box<B>, De::Error> {
        self.read(deserializer)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};
    use core::any::{Any, TypeId};

    use serde::de::DeserializeSeed;
    use serde::{Deserialize, Serialize};

    use super::TypedConverter;
    use crate::Error;
    use crate::typed::{HasDiscriminator, Polymorphic, Variant, VariantRegistry};

    trait Base: HasDiscriminator<i32> + erased_serde::Serialize + core::fmt::Debug {
        fn as_any(&self) -> &dyn Any;
    }

    impl Polymorphic for dyn Base {
        type Discriminator = i32;

        fn registry() -> &'static VariantRegistry<Self> {
            static REGISTRY: std::sync::LazyLock<VariantRegistry<dyn Base>> =
                std::sync::LazyLock::new(|| {
                    let mut registry = VariantRegistry::new();
                    registry.register::<Sub1>();
                    registry.register::<Sub2>();
                    registry
                });
            &REGISTRY
        }
    }

    macro_rules! sub {
        ($name:ident = $value:literal { $($field:ident: $ty:ty),* }) => {
            #[derive(Serialize, Deserialize, PartialEq, Debug)]
            struct $name {
                #[serde(rename = "Type")]
                ty: i32,
                $($field: $ty,)*
            }

            impl HasDiscriminator<i32> for $name {
                fn discriminator(&self) -> i32 {
                    self.ty
                }
            }

            impl Base for $name {
                fn as_any(&self) -> &dyn Any {
                    self
                }
            }

            impl Variant<dyn Base> for $name {
                fn discriminator_value() -> i32 {
                    $value
                }

                fn into_base(self: Box<Self>) -> Box<dyn Base> {
                    self
                }
            }
        };
    }

    sub!(Sub1 = 1 { name: String });
    sub!(Sub2 = 2 { name: String, size: f64 });
    sub!(Sub5 = 5 { name: String });
    sub!(Sub6 = 5 { label: String });

    fn downcast<T: 'static>(value: &dyn Base) -> &T {
        value.as_any().downcast_ref::<T>().unwrap()
    }

    #[test]
    fn round_trip_keeps_runtime_type() {
        let converter = TypedConverter::<dyn Base>::new();

        let value: Box<dyn Base> = Box::new(Sub2 { ty: 2, name: "b".to_string(), size: 1.5 });
        let text = converter.to_string(&*value).unwrap();
        assert_eq!(text, r#"{"Type":2,"name":"b","size":1.5}"#);

        let back = converter.from_str(&text).unwrap();
        assert_eq!(back.as_any().type_id(), TypeId::of::<Sub2>());
        assert_eq!(downcast::<Sub2>(&*back), &Sub2 { ty: 2, name: "b".to_string(), size: 1.5 });
    }

    #[test]
    fn field_order_does_not_matter() {
        let converter = TypedConverter::<dyn Base>::new();
        let first = converter.from_str(r#"{"name":"a","Type":1}"#).unwrap();
        let second = converter.from_str(r#"{"Type":1,"name":"a"}"#).unwrap();
        assert_eq!(downcast::<Sub1>(&*first), downcast::<Sub1>(&*second));
    }

    #[test]
    fn nested_property_is_not_the_discriminator() {
        let converter = TypedConverter::<dyn Base>::new();
        let err = converter.from_str(r#"{"name":{"Type":1}}"#).unwrap_err();
        assert!(matches!(err, Error::DiscriminatorMissing { field: "Type" }));
    }

    #[test]
    fn malformed_input() {
        let converter = TypedConverter::<dyn Base>::new();
        for text in ["123", "\"value\"", "[]", "null", "true"] {
            match converter.from_str(text) {
                Err(Error::MalformedInput { expected: "an object", .. }) => {}
                other => panic!("{text}: unexpected {:?}", other.map(|_| ())),
            }
        }
    }

    #[test]
    fn missing_and_unknown() {
        let converter = TypedConverter::<dyn Base>::new();
        assert!(matches!(
            converter.from_str("{}"),
            Err(Error::DiscriminatorMissing { field: "Type" })
        ));
        assert!(matches!(
            converter.from_str(r#"{"Type":-1}"#),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            converter.from_str(r#"{"Type":"1","name":"a"}"#),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            converter.from_str(r#"{"Type":1,"name":"a"} x"#),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn ambiguous_for_both_payloads() {
        let mut registry = VariantRegistry::<dyn Base>::new();
        registry.register::<Sub5>();
        registry.register::<Sub6>();
        let converter = TypedConverter::with_registry(&registry);

        for text in [r#"{"Type":5,"name":"a"}"#, r#"{"Type":5,"label":"a"}"#] {
            assert!(matches!(
                converter.from_str(text),
                Err(Error::AmbiguousVariant { .. })
            ));
        }
    }

    #[test]
    fn declared_discriminator_must_match() {
        let converter = TypedConverter::<dyn Base>::new();
        assert!(converter.can_convert(TypeId::of::<Box<dyn Base>>()));
        assert!(converter.can_convert(TypeId::of::<dyn Base>()));
        assert!(converter.can_convert(TypeId::of::<Sub1>()));
        assert!(!converter.can_convert(TypeId::of::<Sub5>()));
        assert!(!converter.can_convert(TypeId::of::<String>()));

        let declined = converter.declared_as::<i64>();
        assert!(!declined.is_applicable());
        assert!(!declined.can_convert(TypeId::of::<Sub1>()));
        assert!(matches!(
            declined.from_str(r#"{"Type":1,"name":"a"}"#),
            Err(Error::NotConvertible { .. })
        ));
    }

    #[test]
    fn as_seed_and_value() {
        let converter = TypedConverter::<dyn Base>::new();

        let mut de = serde_json::Deserializer::from_str(r#"{"name":"a","Type":1}"#);
        let value = converter.deserialize(&mut de).unwrap();
        assert_eq!(value.discriminator(), 1);

        let json = converter.to_value(&*value).unwrap();
        assert_eq!(json, serde_json::json!({ "Type": 1, "name": "a" }));
        let back = converter.from_value(json).unwrap();
        assert_eq!(downcast::<Sub1>(&*back).name, "a");

        let mut de = serde_json::Deserializer::from_str("[1]");
        let err = converter.deserialize(&mut de).unwrap_err();
        assert!(err.to_string().contains("found an array"));
    }

    #[test]
    fn from_ron() {
        let converter = TypedConverter::<dyn Base>::new();
        let mut de = ron::Deserializer::from_str(r#"{"name":"c","Type":2,"size":0.5}"#).unwrap();
        let value = converter.read(&mut de).unwrap();
        assert_eq!(downcast::<Sub2>(&*value).size, 0.5);
    }
}
