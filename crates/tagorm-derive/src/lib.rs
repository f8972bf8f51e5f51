//! Derive macros for tagorm
//!
//! Provides `#[derive(Record)]` and `#[derive(FromRow)]` macros.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod from_row;
mod record;

/// Derive `Record` metadata for a struct.
///
/// # Example
///
/// ```ignore
/// use tagorm::{FromRow, Record};
///
/// #[derive(Default, Record, FromRow)]
/// #[orm(table = "users", view = "SELECT id, name FROM users WHERE name = '{name}'")]
/// struct User {
///     #[orm(column = "id")]
///     id: uuid::Uuid,
///     #[orm(column = "name")]
///     name: String,
///     #[orm(column = "updated_at")]
///     updated_at: Option<chrono::DateTime<chrono::Utc>>,
///     session: String, // not persisted
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Table name (defaults to the struct name)
/// - `#[orm(view = "SELECT ...")]` - Template used by view selects
/// - `#[orm(column = "name")]` - Persist the field under this column
///
/// Fields named `id`, `created_at`, and `updated_at` get identity and timestamp
/// behavior. `id` must be a `Uuid`.
#[proc_macro_derive(Record, attributes(orm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `FromRow` trait for a struct.
///
/// Tagged fields are read by column name; untagged fields are filled with
/// `Default::default()`.
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Read the field from this column
#[proc_macro_derive(FromRow, attributes(orm))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
