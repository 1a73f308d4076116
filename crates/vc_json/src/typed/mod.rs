//! Discriminator driven polymorphic decoding.
//!
//! A base is a trait used as `dyn Base`. Every concrete type of the base
//! carries one discriminator value, and a payload names its concrete type
//! through a property holding that value (`"Type"` unless the base renames it).
//!
//! Decoding an object:
//!
//! 1. The object is captured into a [`serde_json::Map`] while its top-level
//!    properties are walked. The first property named after the
//!    discriminator is decoded as the discriminator type on the way.
//! 2. The value is resolved against the [`VariantRegistry`] of the base.
//! 3. The captured map is decoded as the resolved type by its own
//!    `Deserialize` implementation and upcast to `Box<dyn Base>`.
//!
//! Encoding writes the fields of the runtime type of the value, with the
//! discriminator property inserted first when the type does not write it
//! itself, see [`serialize_polymorphic`].
//!
//! ## Menu
//!
//! - [`HasDiscriminator`]: exposes the discriminator of a value.
//! - [`Polymorphic`]: implemented for `dyn Base`, usually by [`polymorphic`](crate::derive::polymorphic).
//! - [`Variant`]: implemented by concrete types, usually by [`derive Variant`](crate::derive::Variant).
//! - [`VariantRegistry`]: discriminator value to concrete type.
//! - [`TypedConverter`]: the decoder and encoder.
//!
//! ## Example
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use vc_json::derive::{Variant, polymorphic};
//! use vc_json::typed::HasDiscriminator;
//!
//! #[polymorphic(discriminator = i32, variants(Circle, Square))]
//! trait Shape {
//!     fn area(&self) -> f64;
//! }
//!
//! #[derive(Variant, Serialize, Deserialize, PartialEq, Debug)]
//! #[variant(base = dyn Shape, value = 1)]
//! struct Circle {
//!     #[serde(rename = "Type")]
//!     kind: i32,
//!     radius: f64,
//! }
//!
//! #[derive(Variant, Serialize, Deserialize, PartialEq, Debug)]
//! #[variant(base = dyn Shape, value = 2)]
//! struct Square {
//!     side: f64,
//! }
//!
//! impl Shape for Circle {
//!     fn area(&self) -> f64 { 3.0 * self.radius * self.radius }
//! }
//!
//! impl Shape for Square {
//!     fn area(&self) -> f64 { self.side * self.side }
//! }
//!
//! let shape: Box<dyn Shape> = serde_json::from_str(r#"{"side":2.0,"Type":2}"#).unwrap();
//! assert_eq!(shape.area(), 4.0);
//! assert_eq!(shape.discriminator(), 2);
//!
//! let circle: Box<dyn Shape> = Box::new(Circle { kind: 1, radius: 1.0 });
//! assert_eq!(serde_json::to_string(&circle).unwrap(), r#"{"Type":1,"radius":1.0}"#);
//!
//! // `Square` has no property of its own for the discriminator.
//! let square: Box<dyn Shape> = Box::new(Square { side: 2.0 });
//! let text = serde_json::to_string(&square).unwrap();
//! assert_eq!(text, r#"{"Type":2,"side":2.0}"#);
//! let back: Box<dyn Shape> = serde_json::from_str(&text).unwrap();
//! assert_eq!(back.area(), 4.0);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod converter;
mod de;
mod registry;
mod ser;

// -----------------------------------------------------------------------------
// Exports

pub use converter::TypedConverter;
pub use registry::{VariantMeta, VariantRegistry};
pub use ser::{RuntimeTyped, serialize_by_runtime_type, serialize_polymorphic};

use core::fmt::Debug;
use core::hash::Hash;

use serde::Serialize;
use serde::de::DeserializeOwned;

// -----------------------------------------------------------------------------
// Traits

/// A value exposing the discriminator of its concrete type.
///
/// The encoder writes this value as the discriminator property, so it must
/// name the concrete type in the registry of the base.
pub trait HasDiscriminator<D> {
    fn discriminator(&self) -> D;
}

/// A polymorphic base, implemented for the trait object type `dyn Base`.
pub trait Polymorphic: 'static {
    /// The type of the discriminator property.
    type Discriminator: Eq + Hash + Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// External name of the discriminator property.
    const DISCRIMINATOR_FIELD: &'static str = "Type";

    /// The registry used by [`TypedConverter::new`].
    fn registry() -> &'static VariantRegistry<Self>;

    /// Adds the variants submitted with `#[variant(auto_register)]`.
    ///
    /// Returns `false` when nothing can be collected.
    fn auto_register(registry: &mut VariantRegistry<Self>) -> bool {
        let _ = registry;
        false
    }
}

/// A concrete type of the base `B`.
pub trait Variant<B: ?Sized + Polymorphic>: DeserializeOwned + 'static {
    /// The discriminator value of this type.
    fn discriminator_value() -> B::Discriminator;

    fn into_base(self: alloc::boxed::Box<Self>) -> alloc::boxed::Box<B>;

    /// Registers this type, usable as a function pointer.
    fn register(registry: &mut VariantRegistry<B>) {
        registry.register::<Self>();
    }
}
