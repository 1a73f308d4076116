use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;
use core::any::{TypeId, type_name};
use core::fmt;

use foldhash::fast::FixedState;
use hashbrown::HashMap;
use serde_json::Value;

use super::{Polymorphic, Variant};
use crate::Error;

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0xA54F_F53A_5F1D_36F1);

// -----------------------------------------------------------------------------
// VariantMeta

/// Registration of one concrete type of the base `B`.
pub struct VariantMeta<B: ?Sized + Polymorphic> {
    value: B::Discriminator,
    type_id: TypeId,
    type_path: &'static str,
    deserialize: fn(Value) -> Result<Box<B>, serde_json::Error>,
}

impl<B: ?Sized + Polymorphic> VariantMeta<B> {
    /// Create the registration of `V`.
    pub fn of<V: Variant<B>>() -> Self {
        Self {
            value: V::discriminator_value(),
            type_id: TypeId::of::<V>(),
            type_path: type_name::<V>(),
            deserialize: |value| Ok(V::into_base(Box::new(serde_json::from_value::<V>(value)?))),
        }
    }

    #[inline]
    pub fn value(&self) -> &B::Discriminator {
        &self.value
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Decodes a captured object as the concrete type, then upcasts it.
    ///
    /// Only the concrete type's own `Deserialize` implementation is used.
    #[inline]
    pub fn deserialize(&self, value: Value) -> Result<Box<B>, serde_json::Error> {
        (self.deserialize)(value)
    }
}

impl<B: ?Sized + Polymorphic> fmt::Debug for VariantMeta<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantMeta")
            .field("value", &self.value)
            .field("type_path", &self.type_path)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// VariantRegistry

/// Concrete types of the base `B`, indexed by discriminator value.
///
/// Registration never fails. Several types may be registered with one value,
/// but resolving that value then fails with [`Error::AmbiguousVariant`].
///
/// # Example
///
/// ```
/// use vc_json::derive::{Variant, polymorphic};
/// use vc_json::typed::VariantRegistry;
/// use serde::{Deserialize, Serialize};
///
/// #[polymorphic(discriminator = u8)]
/// trait Event {}
///
/// #[derive(Variant, Serialize, Deserialize)]
/// #[variant(base = dyn Event, value = 1)]
/// struct Start;
///
/// #[derive(Variant, Serialize, Deserialize)]
/// #[variant(base = dyn Event, value = 1)]
/// struct Begin;
///
/// impl Event for Start {}
/// impl Event for Begin {}
///
/// let mut registry = VariantRegistry::<dyn Event>::new();
/// registry.register::<Start>();
/// assert!(registry.resolve(&1).is_ok());
/// assert!(registry.resolve(&2).is_err());
///
/// registry.register::<Begin>();
/// assert!(registry.resolve(&1).is_err());
/// ```
pub struct VariantRegistry<B: ?Sized + Polymorphic> {
    variants: Vec<VariantMeta<B>>,
    by_type: HashMap<TypeId, usize, FixedState>,
    by_value: HashMap<B::Discriminator, Vec<usize>, FixedState>,
}

impl<B: ?Sized + Polymorphic> Default for VariantRegistry<B> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ?Sized + Polymorphic> fmt::Debug for VariantRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.variants).finish()
    }
}

impl<B: ?Sized + Polymorphic> VariantRegistry<B> {
    /// Create a empty registry.
    #[inline]
    pub const fn new() -> Self {
        Self {
            variants: Vec::new(),
            by_type: HashMap::with_hasher(FIXED_HASH_STATE),
            by_value: HashMap::with_hasher(FIXED_HASH_STATE),
        }
    }

    /// Registers `V` if it is not registered yet.
    ///
    /// Returns `false` if `V` was already present.
    pub fn register<V: Variant<B>>(&mut self) -> bool {
        if self.by_type.contains_key(&TypeId::of::<V>()) {
            return false;
        }
        self.insert(VariantMeta::of::<V>());
        true
    }

    fn insert(&mut self, meta: VariantMeta<B>) {
        let index = self.variants.len();
        let slot = self.by_value.entry(meta.value.clone()).or_default();

        if let Some(&other) = slot.first() {
            log::warn!(
                "`{}` and `{}` share the discriminator {:?} of `{}`",
                self.variants[other].type_path,
                meta.type_path,
                meta.value,
                type_name::<B>(),
            );
        } else {
            log::trace!(
                "registered `{}` as {:?} of `{}`",
                meta.type_path,
                meta.value,
                type_name::<B>(),
            );
        }

        slot.push(index);
        self.by_type.insert(meta.type_id, index);
        self.variants.push(meta);
    }

    /// Registers every variant submitted with `#[variant(auto_register)]`.
    ///
    /// Repeated calls do not insert duplicates. Returns `false` when the
    /// `auto_register` feature is disabled or nothing was collected.
    #[inline]
    pub fn auto_register(&mut self) -> bool {
        B::auto_register(self)
    }

    /// Runs a batch of registration functions.
    pub fn extend<I>(&mut self, registrations: I)
    where
        I: IntoIterator<Item = fn(&mut Self)>,
    {
        for register in registrations {
            register(self);
        }
    }

    /// Whether the concrete type is registered.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.by_type.contains_key(&type_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Registrations in insertion order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &VariantMeta<B>> {
        self.variants.iter()
    }

    /// The registration of the concrete type.
    pub fn get(&self, type_id: TypeId) -> Option<&VariantMeta<B>> {
        self.by_type.get(&type_id).map(|&index| &self.variants[index])
    }

    /// Finds the single concrete type carrying `value`.
    ///
    /// - no type: [`Error::NotFound`]
    /// - several types: [`Error::AmbiguousVariant`]
    pub fn resolve(&self, value: &B::Discriminator) -> Result<&VariantMeta<B>, Error> {
        match self.by_value.get(value).map(Vec::as_slice) {
            Some(&[index]) => {
                let meta = &self.variants[index];
                log::trace!("resolved {value:?} of `{}` to `{}`", type_name::<B>(), meta.type_path);
                Ok(meta)
            }
            None | Some(&[]) => Err(Error::NotFound {
                base: type_name::<B>(),
                value: format!("{value:?}"),
            }),
            Some(indices) => Err(Error::AmbiguousVariant {
                base: type_name::<B>(),
                value: format!("{value:?}"),
                candidates: indices.iter().map(|&i| self.variants[i].type_path).collect(),
            }),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use core::any::TypeId;

    use serde::Deserialize;

    use super::VariantRegistry;
    use crate::Error;
    use crate::typed::{HasDiscriminator, Polymorphic, Variant};

    trait Base: HasDiscriminator<i32> {
        fn name(&self) -> &str;
    }

    impl Polymorphic for dyn Base {
        type Discriminator = i32;

        fn registry() -> &'static VariantRegistry<Self> {
            static REGISTRY: std::sync::LazyLock<VariantRegistry<dyn Base>> =
                std::sync::LazyLock::new(VariantRegistry::new);
            &REGISTRY
        }
    }

    macro_rules! sub {
        ($name:ident = $value:literal) => {
            #[derive(Deserialize)]
            struct $name {
                #[serde(rename = "Name")]
                name: alloc::string::String,
            }

            impl HasDiscriminator<i32> for $name {
                fn discriminator(&self) -> i32 {
                    $value
                }
            }

            impl Base for $name {
                fn name(&self) -> &str {
                    &self.name
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

    sub!(Sub1 = 1);
    sub!(Sub5 = 5);
    sub!(Sub6 = 5);

    #[test]
    fn register_is_idempotent() {
        let mut registry = VariantRegistry::<dyn Base>::new();
        assert!(registry.is_empty());
        assert!(registry.register::<Sub1>());
        assert!(!registry.register::<Sub1>());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(TypeId::of::<Sub1>()));
        assert!(!registry.contains(TypeId::of::<Sub5>()));
        assert_eq!(*registry.get(TypeId::of::<Sub1>()).unwrap().value(), 1);
    }

    #[test]
    fn resolve_outcomes() {
        let mut registry = VariantRegistry::<dyn Base>::new();
        registry.extend([
            <Sub1 as Variant<dyn Base>>::register as fn(&mut _),
            <Sub5 as Variant<dyn Base>>::register,
            <Sub6 as Variant<dyn Base>>::register,
        ]);

        let meta = registry.resolve(&1).unwrap();
        assert_eq!(meta.type_id(), TypeId::of::<Sub1>());

        let value = serde_json::json!({ "Name": "a", "Type": 1 });
        let base = meta.deserialize(value).unwrap();
        assert_eq!(base.name(), "a");
        assert_eq!(base.discriminator(), 1);

        assert!(matches!(registry.resolve(&-1), Err(Error::NotFound { .. })));

        match registry.resolve(&5) {
            Err(Error::AmbiguousVariant { candidates, .. }) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].ends_with("Sub5"));
                assert!(candidates[1].ends_with("Sub6"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn static_registry_starts_empty() {
        assert!(<dyn Base as Polymorphic>::registry().is_empty());
        let mut registry = VariantRegistry::<dyn Base>::new();
        assert!(!registry.auto_register());
    }
}
