use proc_macro2::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{ItemTrait, LitStr, Path, Type, parse_quote};

// -----------------------------------------------------------------------------
// Arguments

/// Arguments of `#[polymorphic(...)]`.
#[derive(Default)]
pub(crate) struct PolymorphicArgs {
    discriminator: Option<Type>,
    field: Option<LitStr>,
    variants: Vec<Path>,
}

impl PolymorphicArgs {
    pub(crate) fn parse(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("discriminator") {
            self.discriminator = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("field") {
            let field: LitStr = meta.value()?.parse()?;
            if field.value().is_empty() {
                return Err(syn::Error::new(field.span(), "discriminator name can't be empty"));
            }
            self.field = Some(field);
            Ok(())
        } else if meta.path.is_ident("variants") {
            meta.parse_nested_meta(|variant| {
                self.variants.push(variant.path);
                Ok(())
            })
        } else {
            Err(meta.error("expected `discriminator`, `field` or `variants`"))
        }
    }
}

// -----------------------------------------------------------------------------
// Attribute

pub(crate) fn impl_polymorphic(args: PolymorphicArgs, mut item: ItemTrait) -> syn::Result<TokenStream> {
    let Some(discriminator) = args.discriminator else {
        return Err(syn::Error::new(
            item.ident.span(),
            "missing `#[polymorphic(discriminator = Type)]`",
        ));
    };
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new(
            item.generics.span(),
            "a polymorphic base can't be generic",
        ));
    }

    let vc_json_path = crate::path::vc_json();
    let macro_exports_ = crate::path::macro_exports_(&vc_json_path);
    let polymorphic_ = crate::path::polymorphic_(&vc_json_path);
    let has_discriminator_ = crate::path::has_discriminator_(&vc_json_path);
    let variant_registry_ = crate::path::variant_registry_(&vc_json_path);
    let typed_converter_ = crate::path::typed_converter_(&vc_json_path);
    let serialize_polymorphic_ = crate::path::serialize_polymorphic_(&vc_json_path);

    // supertraits
    if item.colon_token.is_none() {
        item.colon_token = Some(Default::default());
    }
    item.supertraits.push(parse_quote!(#has_discriminator_<#discriminator>));
    item.supertraits.push(parse_quote!(#macro_exports_::erased_serde::Serialize));

    let ident = &item.ident;
    let field_tokens = args.field.map(|field| {
        quote! {
            const DISCRIMINATOR_FIELD: &'static str = #field;
        }
    });
    let variants = &args.variants;
    let (collector_tokens, auto_register_tokens) = impl_auto_register(&vc_json_path, &item);

    Ok(quote! {
        #item

        #collector_tokens

        impl #polymorphic_ for dyn #ident {
            type Discriminator = #discriminator;

            #field_tokens

            fn registry() -> &'static #variant_registry_<Self> {
                static REGISTRY: #macro_exports_::LazyLock<#variant_registry_<dyn #ident>> =
                    #macro_exports_::LazyLock::new(|| {
                        let mut registry = #variant_registry_::new();
                        #( registry.register::<#variants>(); )*
                        registry.auto_register();
                        registry
                    });
                &REGISTRY
            }

            #auto_register_tokens
        }

        impl #macro_exports_::serde::Serialize for dyn #ident {
            #[inline]
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: #macro_exports_::serde::Serializer,
            {
                #serialize_polymorphic_(self, serializer)
            }
        }

        impl<'de> #macro_exports_::serde::Deserialize<'de> for #macro_exports_::Box<dyn #ident> {
            #[inline]
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: #macro_exports_::serde::Deserializer<'de>,
            {
                #typed_converter_::<dyn #ident>::new().read(deserializer)
            }
        }
    })
}

/// Returns the collector items and the `auto_register` override.
#[cfg(feature = "auto_register")]
fn impl_auto_register(vc_json_path: &syn::Path, item: &ItemTrait) -> (TokenStream, TokenStream) {
    let macro_exports_ = crate::path::macro_exports_(vc_json_path);
    let variant_registry_ = crate::path::variant_registry_(vc_json_path);

    let ident = &item.ident;
    let collector = quote::format_ident!("__{}Variants", ident);
    let submit = syn::Ident::new(crate::path::SUBMIT_FN, ident.span());

    let collector_tokens = quote! {
        #[doc(hidden)]
        pub struct #collector(fn(&mut #variant_registry_<dyn #ident>));

        #macro_exports_::inventory::collect!(#collector);

        impl dyn #ident {
            #[doc(hidden)]
            #[inline]
            pub const fn #submit(register: fn(&mut #variant_registry_<dyn #ident>)) -> #collector {
                #collector(register)
            }
        }
    };

    let auto_register_tokens = quote! {
        fn auto_register(registry: &mut #variant_registry_<Self>) -> bool {
            let mut collected = false;
            for entry in #macro_exports_::inventory::iter::<#collector> {
                (entry.0)(registry);
                collected = true;
            }
            collected
        }
    };

    (collector_tokens, auto_register_tokens)
}

#[cfg(not(feature = "auto_register"))]
fn impl_auto_register(_: &syn::Path, _: &ItemTrait) -> (TokenStream, TokenStream) {
    (crate::path::empty(), crate::path::empty())
}
