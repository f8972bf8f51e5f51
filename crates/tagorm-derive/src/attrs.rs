//! Attribute parsing for the derive macros.
//!
//! Handles parsing of struct-level and field-level `#[orm(...)]` attributes.

use syn::{Data, DeriveInput, Fields, Result};

/// Struct-level `#[orm(table = "...", view = "...")]`.
#[derive(Default)]
pub(crate) struct StructAttr {
    pub table: Option<String>,
    pub view: Option<String>,
}

/// Field-level `#[orm(column = "...")]`.
#[derive(Default)]
pub(crate) struct FieldAttr {
    pub column: Option<syn::LitStr>,
}

/// Parse comma-separated `key = "value"` pairs, handing each to `on_pair`.
fn parse_pairs(
    input: syn::parse::ParseStream,
    mut on_pair: impl FnMut(syn::Ident, syn::LitStr) -> Result<()>,
) -> Result<()> {
    loop {
        if input.is_empty() {
            break;
        }
        let ident: syn::Ident = input.parse()?;
        let _: syn::Token![=] = input.parse()?;
        let value: syn::LitStr = input.parse()?;
        on_pair(ident, value)?;

        if input.peek(syn::Token![,]) {
            let _: syn::Token![,] = input.parse()?;
        } else {
            break;
        }
    }
    Ok(())
}

impl syn::parse::Parse for StructAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = StructAttr::default();
        parse_pairs(input, |ident, value| {
            if ident == "table" {
                attr.table = Some(value.value());
            } else if ident == "view" {
                attr.view = Some(value.value());
            } else {
                return Err(syn::Error::new_spanned(
                    ident,
                    "unknown struct attribute, expected `table` or `view`",
                ));
            }
            Ok(())
        })?;
        Ok(attr)
    }
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();
        parse_pairs(input, |ident, value| {
            if ident == "column" {
                attr.column = Some(value);
                Ok(())
            } else {
                Err(syn::Error::new_spanned(
                    ident,
                    "unknown field attribute, expected `column`",
                ))
            }
        })?;
        Ok(attr)
    }
}

/// Merge every `#[orm(...)]` on the struct.
pub(crate) fn struct_attr(input: &DeriveInput) -> Result<StructAttr> {
    let mut merged = StructAttr::default();
    for attr in &input.attrs {
        if attr.path().is_ident("orm") {
            let parsed: StructAttr = attr.parse_args()?;
            if parsed.table.is_some() {
                merged.table = parsed.table;
            }
            if parsed.view.is_some() {
                merged.view = parsed.view;
            }
        }
    }
    Ok(merged)
}

/// The column tag of a field, if it has one.
pub(crate) fn field_column(field: &syn::Field) -> Result<Option<syn::LitStr>> {
    let mut column = None;
    for attr in &field.attrs {
        if attr.path().is_ident("orm") {
            let parsed: FieldAttr = attr.parse_args()?;
            if parsed.column.is_some() {
                column = parsed.column;
            }
        }
    }
    if let Some(lit) = &column {
        if lit.value().is_empty() {
            return Err(syn::Error::new_spanned(lit, "column name cannot be empty"));
        }
    }
    Ok(column)
}

/// Named fields of a struct, or an error naming the derive.
pub(crate) fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> Result<&'a syn::punctuated::Punctuated<syn::Field, syn::Token![,]>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} can only be derived for structs"),
        )),
    }
}
