//! `{name}` substitution for view templates.

use crate::error::{OrmError, OrmResult};
use std::collections::HashMap;

/// Replace every `{key}` in `template` with `values[key]`.
///
/// `{{` and `}}` produce literal braces. An unknown key or an unbalanced brace
/// is an [`OrmError::Format`].
pub fn interpolate(template: &str, values: &HashMap<String, String>) -> OrmResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut key = String::new();
                let mut closed = false;
                for (_, k) in chars.by_ref() {
                    if k == '}' {
                        closed = true;
                        break;
                    }
                    key.push(k);
                }
                if !closed {
                    return Err(OrmError::Format(format!(
                        "unclosed '{{' at offset {pos}"
                    )));
                }
                let value = values
                    .get(key.trim())
                    .ok_or_else(|| OrmError::Format(format!("unknown key '{key}'")))?;
                out.push_str(value);
            }
            '}' => {
                return Err(OrmError::Format(format!(
                    "unmatched '}}' at offset {pos}"
                )));
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}
