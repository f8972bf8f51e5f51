//! SQL identifier checks.
//!
//! Table and column names are interpolated into statements verbatim, so every
//! name that reaches a statement is validated here first.
//!
//! - Each dotted part must match `[A-Za-z_][A-Za-z0-9_]*`
//! - Quoted identifiers are not supported

use crate::error::{OrmError, OrmResult};

fn is_ident_part(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a (possibly dotted) identifier such as `users` or `main.users`.
pub fn validate_ident(name: &str) -> OrmResult<()> {
    if name.is_empty() {
        return Err(OrmError::validation("Identifier cannot be empty"));
    }
    for part in name.split('.') {
        if part.is_empty() {
            return Err(OrmError::validation(format!(
                "Empty part in identifier '{name}'"
            )));
        }
        if !is_ident_part(part) {
            return Err(OrmError::validation(format!(
                "Invalid identifier '{name}'"
            )));
        }
    }
    Ok(())
}

/// Returns `true` if `name` would pass [`validate_ident`].
pub fn is_valid_ident(name: &str) -> bool {
    validate_ident(name).is_ok()
}
