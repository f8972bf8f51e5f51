//! Record derive macro implementation

use crate::attrs::{field_column, named_fields, struct_attr};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::collections::HashSet;
use syn::{DeriveInput, Result};

/// A field carrying `#[orm(column = "...")]`.
struct Persisted<'a> {
    ident: &'a syn::Ident,
    ty: &'a syn::Type,
    column: syn::LitStr,
}

fn role_for(ident: &syn::Ident) -> syn::Ident {
    let role = match ident.to_string().as_str() {
        "id" => "Identity",
        "created_at" => "CreatedAt",
        "updated_at" => "UpdatedAt",
        _ => "Plain",
    };
    format_ident!("{}", role)
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let attrs = struct_attr(&input)?;
    let table = attrs.table.unwrap_or_else(|| name.to_string());
    let fields = named_fields(&input, "Record")?;

    let mut persisted = Vec::new();
    let mut seen = HashSet::new();
    let mut has_field = HashSet::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        has_field.insert(ident.to_string());
        let Some(column) = field_column(field)? else {
            continue;
        };
        if !seen.insert(column.value()) {
            return Err(syn::Error::new_spanned(
                &column,
                format!("duplicate column \"{}\"", column.value()),
            ));
        }
        persisted.push(Persisted {
            ident,
            ty: &field.ty,
            column,
        });
    }

    if persisted.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "Record requires at least one #[orm(column = \"...\")] field",
        ));
    }

    let column_defs = persisted.iter().map(|p| {
        let column = &p.column;
        let ty = p.ty;
        let role = role_for(p.ident);
        quote! {
            ::tagorm::ColumnDef::new(
                #column,
                <#ty as ::tagorm::ColumnType>::DATA_TYPE,
                ::tagorm::ColumnRole::#role,
            )
        }
    });

    let values = persisted.iter().map(|p| {
        let ident = p.ident;
        let ty = p.ty;
        quote! { <#ty as ::tagorm::ColumnType>::to_value(&self.#ident) }
    });

    let identity = has_field.contains("id").then(|| {
        quote! {
            fn id(&self) -> ::core::option::Option<::tagorm::uuid::Uuid> {
                ::core::option::Option::Some(::tagorm::record::identity(&self.id))
            }

            fn set_id(&mut self, id: ::tagorm::uuid::Uuid) {
                self.id = id;
            }
        }
    });

    let touch = |field: &str| {
        has_field.contains(field).then(|| {
            let method = format_ident!("touch_{}", field);
            let field = format_ident!("{}", field);
            quote! {
                fn #method(&mut self, now: ::tagorm::chrono::DateTime<::tagorm::chrono::Utc>) {
                    ::tagorm::Timestamp::stamp(&mut self.#field, now);
                }
            }
        })
    };
    let touch_created = touch("created_at");
    let touch_updated = touch("updated_at");

    let view = attrs.view.map(|view| {
        quote! {
            fn sql_view() -> ::core::option::Option<&'static str> {
                ::core::option::Option::Some(#view)
            }
        }
    });

    let type_name = name.to_string();

    Ok(quote! {
        impl ::tagorm::Record for #name {
            fn table_name() -> &'static str {
                #table
            }

            fn columns() -> &'static [::tagorm::ColumnDef] {
                const COLUMNS: &[::tagorm::ColumnDef] = &[#(#column_defs),*];
                COLUMNS
            }

            fn values(&self) -> ::std::vec::Vec<::tagorm::Value> {
                ::std::vec![#(#values),*]
            }

            #identity
            #touch_created
            #touch_updated
            #view
        }

        ::tagorm::inventory::submit! {
            ::tagorm::RecordRegistration {
                type_name: #type_name,
                table_name: <#name as ::tagorm::Record>::table_name,
                validate: ::tagorm::validate_record::<#name>,
            }
        }
    })
}
