//! Derive macros for strata-cache
//!
//! - `#[derive(TypeName)]` names a type for canonical cache keys
//! - `#[derive(CacheKey)]` renders a struct as a caller key
//!
//! Generated code refers to `::strata_cache`; pass
//! `#[type_name(crate = "...")]` or `#[cache_key(crate = "...")]` to use
//! another path, e.g. `strata_cache_core`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, GenericParam, LitStr, parse_macro_input, parse_quote};

fn crate_path(value: Option<String>) -> syn::Result<syn::Path> {
    match value {
        Some(path) => syn::parse_str(&path),
        None => Ok(parse_quote!(::strata_cache)),
    }
}

/// Derive `TypeName`
///
/// The rendered name is the type's identifier, followed by its type
/// parameters' names for generic types (`Page<Order>`).
#[proc_macro_derive(TypeName, attributes(type_name))]
pub fn derive_type_name(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_type_name(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_type_name(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    let mut rename = None;
    let mut krate = None;

    for attr in &input.attrs {
        if attr.path().is_ident("type_name") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let s: LitStr = meta.value()?.parse()?;
                    rename = Some(s.value());
                    Ok(())
                } else if meta.path.is_ident("crate") {
                    let s: LitStr = meta.value()?.parse()?;
                    krate = Some(s.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported attribute"))
                }
            })?;
        }
    }

    let krate = crate_path(krate)?;
    let name = &input.ident;
    let base = rename.unwrap_or_else(|| name.to_string());

    let type_params: Vec<_> = input
        .generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();

    for param in input.generics.params.iter_mut() {
        if let GenericParam::Type(param) = param {
            param.bounds.push(parse_quote!(#krate::TypeName));
        }
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = if type_params.is_empty() {
        quote! { ::std::string::String::from(#base) }
    } else {
        quote! {
            #krate::generic_type_name(
                #base,
                &[#(<#type_params as #krate::TypeName>::type_name()),*],
            )
        }
    };

    Ok(quote! {
        impl #impl_generics #krate::TypeName for #name #ty_generics #where_clause {
            fn type_name() -> ::std::string::String {
                #body
            }
        }
    })
}

/// Derive `CacheKey`
///
/// Fields are rendered with `to_string` and joined with `.`; mark a field
/// `#[cache_key(skip)]` to leave it out.
#[proc_macro_derive(CacheKey, attributes(cache_key))]
pub fn derive_cache_key(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_cache_key(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_cache_key(input: DeriveInput) -> syn::Result<TokenStream2> {
    let mut krate = None;
    for attr in &input.attrs {
        if attr.path().is_ident("cache_key") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("crate") {
                    let s: LitStr = meta.value()?.parse()?;
                    krate = Some(s.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported attribute"))
                }
            })?;
        }
    }
    let krate = crate_path(krate)?;
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "CacheKey derive only supports structs",
            ));
        }
    };

    let mut key_parts = Vec::new();
    if !matches!(fields, Fields::Unit) {
        for (i, field) in fields.iter().enumerate() {
            let mut skip = false;
            for attr in &field.attrs {
                if attr.path().is_ident("cache_key") {
                    attr.parse_nested_meta(|meta| {
                        if meta.path.is_ident("skip") {
                            skip = true;
                            Ok(())
                        } else {
                            Err(meta.error("unsupported attribute"))
                        }
                    })?;
                }
            }
            if skip {
                continue;
            }

            match &field.ident {
                Some(ident) => key_parts.push(quote! { self.#ident.to_string() }),
                None => {
                    let index = syn::Index::from(i);
                    key_parts.push(quote! { self.#index.to_string() });
                }
            }
        }
    }

    let body = if key_parts.is_empty() {
        quote! { ::std::string::String::new() }
    } else {
        quote! { #krate::compose_key([#(#key_parts),*]) }
    };
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::CacheKey for #name #ty_generics #where_clause {
            fn cache_key(&self) -> ::std::string::String {
                #body
            }
        }
    })
}
