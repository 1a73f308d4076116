//! See following macros:
//!
//! - [`FieldEnum`]
//! - [`Variant`]
//! - [`polymorphic`]
//!
//! `impl_field_enum!` for `bitflags` types lives in `vc_json` itself.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemTrait, parse_macro_input};

static FIELD_ENUM_ATTRIBUTE_NAME: &str = "field_enum";
static FIELD_ATTRIBUTE_NAME: &str = "field";
static VARIANT_ATTRIBUTE_NAME: &str = "variant";

// -----------------------------------------------------------------------------
// Modules

mod field_enum;
mod path;
mod polymorphic;
mod variant;

// -----------------------------------------------------------------------------
// Macros

/// # Symbolic Enum Derivation
///
/// `#[derive(FieldEnum)]` implements `FieldEnum` for a fieldless enum. Every
/// variant is written as its name unless it carries a token override.
///
/// ## Variant attributes
///
/// - `#[field(value = "token")]`: the token of the variant. An empty token
///   is rejected.
/// - `#[field(ignore)]`: the variant has no token. It can still be a value,
///   it just can't be written or read.
///
/// ## Enum attributes
///
/// - `#[field_enum(flags)]`: values combine through bitwise OR. A value
///   without its own token is written as the tokens of the variants it
///   contains, and a separated token list is read back by OR-ing them.
/// - `#[field_enum(serde)]`: also implements `Serialize` and `Deserialize`
///   through the token codec with the default separator.
///
/// ## Example
///
/// ```rust, ignore
/// #[derive(FieldEnum, Clone, Copy, PartialEq, Debug)]
/// #[field_enum(flags, serde)]
/// enum Shade {
///     #[field(value = "none")]
///     None = 0,
///     Red = 1,
///     Blue = 2,
///     #[field(value = "purple")]
///     Purple = 3,
///     #[field(ignore)]
///     Unused = 8,
/// }
/// ```
#[proc_macro_derive(FieldEnum, attributes(field_enum, field))]
pub fn derive_field_enum(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    field_enum::impl_field_enum(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// # Variant Derivation
///
/// `#[derive(Variant)]` makes a type a concrete variant of a polymorphic base
/// declared with [`polymorphic`]. It implements `Variant<Base>` and
/// `HasDiscriminator`.
///
/// The type must also implement `Deserialize` and the base trait itself.
///
/// ## Attributes
///
/// - `#[variant(base = dyn Trait)]`: the base, required.
/// - `#[variant(value = expr)]`: the discriminator value, required. A string
///   literal is converted with `Into`, any other expression must have the
///   discriminator type.
/// - `#[variant(auto_register)]`: submits the type so the registry of the base
///   picks it up without being listed. No effect on generic types, or when
///   the `auto_register` feature is disabled.
///
/// `HasDiscriminator` returns the annotated value. The encoder of the base
/// writes it as the discriminator property, unless the type writes that
/// property itself, in which case both must agree.
///
/// ## Example
///
/// ```rust, ignore
/// #[derive(Variant, Serialize, Deserialize)]
/// #[variant(base = dyn Shape, value = 1, auto_register)]
/// struct Circle {
///     radius: f64,
/// }
/// ```
#[proc_macro_derive(Variant, attributes(variant))]
pub fn derive_variant(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    variant::impl_variant(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// # Polymorphic Base
///
/// Placed on a trait, makes `dyn Trait` a polymorphic base:
///
/// - adds `HasDiscriminator<D>` and `erased_serde::Serialize` as supertraits,
/// - implements `Polymorphic` for `dyn Trait` with a lazily built registry,
/// - implements `Serialize` for `dyn Trait`, through the runtime type with
///   the discriminator property added,
/// - implements `Deserialize` for `Box<dyn Trait>`, through `TypedConverter`.
///
/// ## Arguments
///
/// - `discriminator = Type`: the discriminator type, required.
/// - `field = "name"`: the discriminator property, `"Type"` by default.
/// - `variants(A, B, ...)`: types registered when the registry is built.
///   Variants marked `auto_register` are added as well.
///
/// The trait can't be generic.
///
/// ## Example
///
/// ```rust, ignore
/// #[polymorphic(discriminator = i32, variants(Circle, Square))]
/// trait Shape {
///     fn area(&self) -> f64;
/// }
/// ```
#[proc_macro_attribute]
pub fn polymorphic(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut polymorphic_args = polymorphic::PolymorphicArgs::default();
    let parser = syn::meta::parser(|meta| polymorphic_args.parse(meta));
    parse_macro_input!(args with parser);
    let item = parse_macro_input!(input as ItemTrait);

    polymorphic::impl_polymorphic(polymorphic_args, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
