use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr};

use crate::FIELD_ATTRIBUTE_NAME;
use crate::FIELD_ENUM_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// Attributes

/// `#[field_enum(...)]` on the enum.
#[derive(Default)]
struct EnumAttributes {
    flags: Option<Span>,
    serde: Option<Span>,
}

impl EnumAttributes {
    fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(FIELD_ENUM_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("flags") {
                    result.flags = Some(meta.path.span());
                    Ok(())
                } else if meta.path.is_ident("serde") {
                    result.serde = Some(meta.path.span());
                    Ok(())
                } else {
                    Err(meta.error("expected `flags` or `serde`"))
                }
            })?;
        }
        Ok(result)
    }
}

/// `#[field(...)]` on a variant.
#[derive(Default)]
struct VariantAttributes {
    value: Option<LitStr>,
    ignore: bool,
}

impl VariantAttributes {
    fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(FIELD_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("value") {
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value().is_empty() {
                        return Err(syn::Error::new(value.span(), "field token can't be empty"));
                    }
                    if result.value.is_some() {
                        return Err(meta.error("duplicate `value`"));
                    }
                    result.value = Some(value);
                    Ok(())
                } else if meta.path.is_ident("ignore") {
                    result.ignore = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `value = \"...\"` or `ignore`"))
                }
            })?;
        }
        Ok(result)
    }
}

// -----------------------------------------------------------------------------
// Derive

pub(crate) fn impl_field_enum(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &ast.data else {
        return Err(syn::Error::new(
            ast.ident.span(),
            "`FieldEnum` can only be derived for enums",
        ));
    };
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new(
            ast.generics.span(),
            "`FieldEnum` can't be derived for generic enums",
        ));
    }

    let attrs = EnumAttributes::parse_attrs(&ast.attrs)?;
    let vc_json_path = crate::path::vc_json();
    let field_enum_ = crate::path::field_enum_(&vc_json_path);
    let field_value_ = crate::path::field_value_(&vc_json_path);
    let ident = &ast.ident;

    let mut fields = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.fields.span(),
                "`FieldEnum` variants can't have fields",
            ));
        }

        let variant_attrs = VariantAttributes::parse_attrs(&variant.attrs)?;
        let name = &variant.ident;
        let name_str = LitStr::new(&name.to_string(), name.span());
        let with_token = variant_attrs
            .value
            .map(|token| quote! { .with_token(#token) });
        let ignored = variant_attrs.ignore.then(|| quote! { .ignored() });

        fields.push(quote! {
            #field_value_::new(#name_str, Self::#name) #with_token #ignored
        });
    }

    let flags = attrs.flags.is_some();
    let serde_tokens = match attrs.serde {
        Some(span) => impl_serde(&vc_json_path, ident, span),
        None => crate::path::empty(),
    };

    Ok(quote! {
        impl #field_enum_ for #ident {
            const FLAGS: bool = #flags;

            const FIELDS: &'static [#field_value_<Self>] = &[
                #(#fields,)*
            ];

            #[inline]
            fn to_bits(self) -> u64 {
                self as u64
            }
        }

        #serde_tokens
    })
}

fn impl_serde(vc_json_path: &syn::Path, ident: &Ident, span: Span) -> TokenStream {
    let macro_exports_ = crate::path::macro_exports_(vc_json_path);
    let as_token_ = crate::path::as_token_(vc_json_path);

    quote::quote_spanned! { span =>
        impl #macro_exports_::serde::Serialize for #ident {
            #[inline]
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: #macro_exports_::serde::Serializer,
            {
                #as_token_::serialize(self, serializer)
            }
        }

        impl<'de> #macro_exports_::serde::Deserialize<'de> for #ident {
            #[inline]
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: #macro_exports_::serde::Deserializer<'de>,
            {
                #as_token_::deserialize(deserializer)
            }
        }
    }
}
