//! Derive macros for the prefstage preference library
//!
//! This crate provides `#[derive(PreferenceKeys)]`, which declares one
//! preference key per struct field and takes each key's default from the
//! struct's `Default` implementation.
//!
//! # Usage
//!
//! ```text
//! use prefstage::DerivePreferenceKeys;
//!
//! #[derive(Default, DerivePreferenceKeys)]
//! #[preferences(prefix = "editor.occurrences")]
//! struct OccurrencePreferences {
//!     mark: bool,
//!
//!     #[preference(name = "delay_ms")]
//!     delay: i32,
//!
//!     #[preference(skip)]
//!     scratch: Vec<String>,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Lit, Meta, Type, parse_macro_input};

/// Derive macro for generating `PreferenceKeys` implementations.
///
/// # Attributes
///
/// ## Container attributes (`#[preferences(...)]`)
/// - `prefix = "editor.folding"` - Prepended to every key name with a `.`
///
/// ## Field attributes (`#[preference(...)]`)
/// - `name = "..."` - Key name override (default: the field name)
/// - `skip` - Leave this field out
///
/// Supported field types are `bool`, `String`, `i32`, `i64`, `f32` and
/// `f64`; `i8`, `i16`, `u8` and `u16` widen to int and `u32` to long. Any
/// other plain type name is treated as a nested struct that itself
/// implements `PreferenceKeys`; its keys are placed under the field's name.
#[proc_macro_derive(PreferenceKeys, attributes(preferences, preference))]
pub fn derive_preference_keys(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let container_attrs = parse_container_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "PreferenceKeys can only be derived for structs with named fields.\n\nExample:\n  #[derive(PreferenceKeys)]\n  struct MyPreferences {\n      field: bool,\n  }",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "PreferenceKeys can only be derived for structs.\n\nTry: #[derive(PreferenceKeys)] on a struct, not an enum or union.",
            ));
        }
    };

    let mut entries = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_field_attrs(&field.attrs)?;

        // Skip fields marked with #[preference(skip)]
        if attrs.skip {
            continue;
        }

        let local = attrs.name.unwrap_or_else(|| field_name.to_string());
        let key = match &container_attrs.prefix {
            Some(prefix) => format!("{prefix}.{local}"),
            None => local,
        };

        entries.push(match classify(&field.ty) {
            Some(FieldKind::Primitive { variant, convert }) => {
                let variant = syn::Ident::new(variant, Span::call_site());
                let value = convert(quote! { defaults.#field_name });
                quote! {
                    list.push((
                        ::prefstage::PreferenceKey::new(::prefstage::PreferenceType::#variant, #key),
                        ::prefstage::PreferenceValue::from(#value),
                    ));
                }
            }
            Some(FieldKind::Nested) => {
                let field_type = &field.ty;
                quote! {
                    for (nested, value) in <#field_type as ::prefstage::PreferenceKeys>::default_values() {
                        list.push((
                            ::prefstage::PreferenceKey::new(
                                nested.preference_type(),
                                format!("{}.{}", #key, nested.name()),
                            ),
                            value,
                        ));
                    }
                }
            }
            None => {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "Unsupported preference type.\n\nUse bool, String, i32, i64, f32 or f64, a struct implementing PreferenceKeys, or mark the field #[preference(skip)].",
                ));
            }
        });
    }

    Ok(quote! {
        impl ::prefstage::PreferenceKeys for #name {
            #[allow(unused_variables, unused_mut)]
            fn default_values() -> ::std::vec::Vec<(::prefstage::PreferenceKey, ::prefstage::PreferenceValue)> {
                let defaults = <#name as ::std::default::Default>::default();
                let mut list = ::std::vec::Vec::new();
                #(#entries)*
                list
            }
        }
    })
}

/// Container-level attributes from #[preferences(...)]
#[derive(Default)]
struct ContainerAttrs {
    prefix: Option<String>,
}

/// Field-level attributes from #[preference(...)]
#[derive(Default)]
struct FieldAttrs {
    name: Option<String>,
    skip: bool,
}

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut result = ContainerAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("preferences") {
            continue;
        }
        let nested = attr.parse_args_with(
            syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
        )?;
        for meta in nested {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("prefix") => {
                    result.prefix = Some(string_literal(&nv.value, "prefix")?);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "Unknown #[preferences] attribute.\n\nExample: #[preferences(prefix = \"editor\")]",
                    ));
                }
            }
        }
    }

    Ok(result)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("preference") {
            continue;
        }
        let nested = attr.parse_args_with(
            syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
        )?;
        for meta in nested {
            match meta {
                Meta::Path(path) if path.is_ident("skip") => result.skip = true,
                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    result.name = Some(string_literal(&nv.value, "name")?);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "Unknown #[preference] attribute.\n\nExample: #[preference(name = \"tab_width\")] or #[preference(skip)]",
                    ));
                }
            }
        }
    }

    Ok(result)
}

fn string_literal(value: &Expr, attribute: &str) -> syn::Result<String> {
    if let Expr::Lit(lit) = value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(
        value,
        format!("#[{attribute}] must be a string literal.\n\nExample: {attribute} = \"editor\""),
    ))
}

type Convert = fn(proc_macro2::TokenStream) -> proc_macro2::TokenStream;

enum FieldKind {
    Primitive {
        variant: &'static str,
        convert: Convert,
    },
    Nested,
}

fn primitive(variant: &'static str, convert: Convert) -> Option<FieldKind> {
    Some(FieldKind::Primitive { variant, convert })
}

/// Map a field type to its preference type
fn classify(ty: &Type) -> Option<FieldKind> {
    let Type::Path(path) = ty else {
        return None;
    };
    let ident = path.path.get_ident()?;

    match ident.to_string().as_str() {
        "bool" => primitive("Boolean", |value| value),
        "i32" => primitive("Int", |value| value),
        "i64" => primitive("Long", |value| value),
        "f32" => primitive("Float", |value| value),
        "f64" => primitive("Double", |value| value),
        "String" => primitive("String", |value| quote! { #value.clone() }),
        "i8" | "i16" | "u8" | "u16" => primitive("Int", |value| quote! { i32::from(#value) }),
        "u32" => primitive("Long", |value| quote! { i64::from(#value) }),
        "char" | "str" | "i128" | "u64" | "u128" | "isize" | "usize" => None,
        _ => Some(FieldKind::Nested),
    }
}
