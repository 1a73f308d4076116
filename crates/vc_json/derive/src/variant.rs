use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote};
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Expr, Field, Lit, Type};

use crate::VARIANT_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// Attributes

/// `#[variant(...)]` on the type.
struct VariantAttributes {
    base: Type,
    value: Expr,
    auto_register: Option<Span>,
}

impl VariantAttributes {
    fn parse_attrs(ast: &DeriveInput) -> syn::Result<Self> {
        let mut base = None;
        let mut value = None;
        let mut auto_register = None;

        for attr in &ast.attrs {
            if !attr.path().is_ident(VARIANT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("base") {
                    base = Some(meta.value()?.parse::<Type>()?);
                    Ok(())
                } else if meta.path.is_ident("value") {
                    value = Some(meta.value()?.parse::<Expr>()?);
                    Ok(())
                } else if meta.path.is_ident("auto_register") {
                    auto_register = Some(meta.path.span());
                    Ok(())
                } else {
                    Err(meta.error("expected `base`, `value` or `auto_register`"))
                }
            })?;
        }

        let Some(base) = base else {
            return Err(syn::Error::new(
                ast.ident.span(),
                "missing `#[variant(base = dyn Trait)]`",
            ));
        };
        let Some(value) = value else {
            return Err(syn::Error::new(
                ast.ident.span(),
                "missing `#[variant(value = ...)]`",
            ));
        };

        Ok(Self {
            base,
            value,
            auto_register,
        })
    }
}

/// `#[variant]` is only read on the type itself.
fn reject_field_attributes(ast: &DeriveInput) -> syn::Result<()> {
    let fields: Vec<&Field> = match &ast.data {
        Data::Struct(data) => data.fields.iter().collect(),
        Data::Enum(data) => data.variants.iter().flat_map(|v| v.fields.iter()).collect(),
        Data::Union(data) => data.fields.named.iter().collect(),
    };

    for field in fields {
        if let Some(attr) = field
            .attrs
            .iter()
            .find(|attr| attr.path().is_ident(VARIANT_ATTRIBUTE_NAME))
        {
            return Err(syn::Error::new(
                attr.span(),
                "`#[variant]` is only allowed on the type, the discriminator property is written by the encoder",
            ));
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Derive

pub(crate) fn impl_variant(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let attrs = VariantAttributes::parse_attrs(ast)?;
    reject_field_attributes(ast)?;

    let vc_json_path = crate::path::vc_json();
    let polymorphic_ = crate::path::polymorphic_(&vc_json_path);
    let variant_ = crate::path::variant_(&vc_json_path);
    let has_discriminator_ = crate::path::has_discriminator_(&vc_json_path);
    let macro_exports_ = crate::path::macro_exports_(&vc_json_path);

    let ident = &ast.ident;
    let base = &attrs.base;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    // A string literal is converted, anything else must already have the
    // discriminator type.
    let value = match &attrs.value {
        Expr::Lit(lit) if matches!(lit.lit, Lit::Str(_)) => {
            quote! { ::core::convert::Into::into(#lit) }
        }
        other => other.to_token_stream(),
    };

    let auto_register_tokens = impl_auto_register(&vc_json_path, ast, &attrs);

    Ok(quote! {
        impl #impl_generics #variant_<#base> for #ident #ty_generics #where_clause {
            #[inline]
            fn discriminator_value() -> <#base as #polymorphic_>::Discriminator {
                #value
            }

            #[inline]
            fn into_base(
                self: #macro_exports_::Box<Self>,
            ) -> #macro_exports_::Box<#base> {
                self
            }
        }

        impl #impl_generics #has_discriminator_<<#base as #polymorphic_>::Discriminator>
            for #ident #ty_generics #where_clause
        {
            #[inline]
            fn discriminator(&self) -> <#base as #polymorphic_>::Discriminator {
                <Self as #variant_<#base>>::discriminator_value()
            }
        }

        #auto_register_tokens
    })
}

#[cfg(feature = "auto_register")]
fn impl_auto_register(
    vc_json_path: &syn::Path,
    ast: &DeriveInput,
    attrs: &VariantAttributes,
) -> TokenStream {
    let Some(span) = attrs.auto_register else {
        return crate::path::empty();
    };
    // The concrete instantiations of a generic type are unknown here.
    if !ast.generics.params.is_empty() {
        return crate::path::empty();
    }

    let macro_exports_ = crate::path::macro_exports_(vc_json_path);
    let variant_ = crate::path::variant_(vc_json_path);
    let submit = syn::Ident::new(crate::path::SUBMIT_FN, span);
    let ident = &ast.ident;
    let base = &attrs.base;

    quote::quote_spanned! { span =>
        #macro_exports_::inventory::submit! {
            <#base>::#submit(<#ident as #variant_<#base>>::register)
        }
    }
}

#[cfg(not(feature = "auto_register"))]
fn impl_auto_register(_: &syn::Path, _: &DeriveInput, _: &VariantAttributes) -> TokenStream {
    crate::path::empty()
}
