//! FromRow derive macro implementation

use crate::attrs::{field_column, named_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = named_fields(&input, "FromRow")?;

    let mut field_extracts = Vec::with_capacity(fields.len());
    for field in fields {
        let field_name = &field.ident;
        let extract = match field_column(field)? {
            Some(column) => quote! { #field_name: row.try_get_column(#column)? },
            None => quote! { #field_name: ::core::default::Default::default() },
        };
        field_extracts.push(extract);
    }

    Ok(quote! {
        impl #impl_generics ::tagorm::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &::tagorm::Row) -> ::tagorm::OrmResult<Self> {
                Ok(Self {
                    #(#field_extracts),*
                })
            }
        }
    })
}
