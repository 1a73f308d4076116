//! Paths of the `vc_json` items the generated code refers to.
//!
//! Every helper takes the crate path resolved once per macro invocation by
//! [`vc_json`], so a rename of a runtime module only touches this file.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the access path to the `vc_json` crate.
///
/// 1. For crates that depend on `vc_json`, `::vc_json` is returned.
/// 2. For crates that depend on `vc_serde`, `::vc_serde::json` is returned.
/// 3. Otherwise `::vc_json` is returned, which may be incorrect.
///
/// Reading the manifest is not free, call it once per macro invocation.
pub(crate) fn vc_json() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_json"))
}

// -----------------------------------------------------------------------------
// Runtime items

#[inline(always)]
pub(crate) fn macro_exports_(vc_json_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_json_path::__macro_exports
    }
}

#[inline(always)]
pub(crate) fn field_enum_(vc_json_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_json_path::field::FieldEnum
    }
}

#[inline(always)]
pub(crate) fn field_value_(vc_json_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_json_path::field::FieldValue
    }
}

#[inline(always)]
pub(crate) fn as_token_(vc_json_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_json_path::field::as_token
    }
}

#[inline(always)]
pub(crate) fn polymorphic_(vc_json_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_json_path::typed::Polymorphic
    }
}

#[inline(always)]
pub(crate) fn variant_(vc_json_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_json_path::typed::Variant
    }
}

#[inline(always)]
pub(crate) fn has_discriminator_(vc_json_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_json_path::typed::HasDiscriminator
    }
}

#[inline(always)]
pub(crate) fn variant_registry_(vc_json_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_json_path::typed::VariantRegistry
    }
}

#[inline(always)]
pub(crate) fn typed_converter_(vc_json_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_json_path::typed::TypedConverter
    }
}

#[inline(always)]
pub(crate) fn serialize_polymorphic_(vc_json_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_json_path::typed::serialize_polymorphic
    }
}

// -----------------------------------------------------------------------------
// Names

/// Method on `dyn Base` that wraps a registration function for `inventory`.
#[cfg(feature = "auto_register")]
pub(crate) const SUBMIT_FN: &str = "__vc_json_variant";

#[inline]
pub(crate) fn empty() -> TokenStream {
    TokenStream::new()
}
