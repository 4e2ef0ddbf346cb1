//! Derive macro for mapped record types.
//!
//! This crate provides `#[derive(Entity)]`, which writes the explicit property
//! descriptors and the row reader of a plain struct so it can be mapped with
//! `oxide-tables-core`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Type};

/// Derives `Entity` for a struct with named fields.
///
/// # Field Attributes
///
/// - `#[entity(name = "property_name")]` - Overrides the property name, which
///   is also the default column name (defaults to the field name)
/// - `#[entity(skip)]` - Leaves the field unmapped; it is filled with
///   `Default::default()` when a row is read
///
/// # Generated Items
///
/// For a struct `User` with fields `id: String` and `alias: Option<String>`:
///
/// - `User::ID: Property<User, String>` and
///   `User::ALIAS: Property<User, Option<String>>`, one constant per mapped
///   field, named after the field in upper case
/// - `impl Entity for User`, reading every mapped field from the row
///
/// Columns are still declared explicitly when building the `Tables`
/// registry; the derive only removes the accessor boilerplate.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_entity_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_entity_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity derive does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity derive only supports structs",
            ));
        }
    };

    let mut infos = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let attrs = parse_entity_attrs(&field.attrs)?;
        let bare = bare_name(&field_name);
        infos.push(FieldInfo {
            const_name: format_ident!("{}", bare.to_uppercase()),
            property_name: attrs.name.unwrap_or(bare),
            field_type: field.ty.clone(),
            skip: attrs.skip,
            field_name,
        });
    }

    let properties: Vec<TokenStream2> = infos
        .iter()
        .filter(|info| !info.skip)
        .map(|info| {
            let FieldInfo {
                field_name,
                field_type,
                const_name,
                property_name,
                ..
            } = info;
            let doc = format!("Property descriptor of `{struct_name}::{field_name}`.");
            quote! {
                #[doc = #doc]
                #vis const #const_name: ::oxide_tables_core::schema::Property<Self, #field_type> =
                    ::oxide_tables_core::schema::Property::new(
                        #property_name,
                        |entity: &Self| ::core::clone::Clone::clone(&entity.#field_name),
                    );
            }
        })
        .collect();

    let readers: Vec<TokenStream2> = infos
        .iter()
        .map(|info| {
            let field_name = &info.field_name;
            if info.skip {
                quote! { #field_name: ::core::default::Default::default() }
            } else {
                let const_name = &info.const_name;
                quote! { #field_name: row.get(Self::#const_name)? }
            }
        })
        .collect();

    Ok(quote! {
        impl #struct_name {
            #(#properties)*
        }

        impl ::oxide_tables_core::row::Entity for #struct_name {
            fn from_row(
                row: &::oxide_tables_core::row::ValueProvider<'_>,
            ) -> ::oxide_tables_core::error::Result<Self> {
                ::core::result::Result::Ok(Self {
                    #(#readers),*
                })
            }
        }
    })
}

struct FieldInfo {
    field_name: Ident,
    field_type: Type,
    const_name: Ident,
    property_name: String,
    skip: bool,
}

#[derive(Default)]
struct EntityAttrs {
    name: Option<String>,
    skip: bool,
}

fn parse_entity_attrs(attrs: &[Attribute]) -> syn::Result<EntityAttrs> {
    let mut result = EntityAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                let value: Expr = meta.value()?.parse()?;
                match value {
                    Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) => {
                        result.name = Some(s.value());
                        Ok(())
                    }
                    other => Err(syn::Error::new_spanned(
                        other,
                        "expected a string literal",
                    )),
                }
            } else {
                Err(meta.error("unsupported entity attribute"))
            }
        })?;
    }

    Ok(result)
}

/// Field name without the `r#` prefix of raw identifiers.
fn bare_name(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => String::from(stripped),
        None => name,
    }
}
