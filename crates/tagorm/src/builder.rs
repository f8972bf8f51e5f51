//! Query compilation.
//!
//! Turns a [`Statement`] into final SQL text plus the ordered argument list,
//! expanding `IN (?)` lists and applying the dialect's translation hook.

use crate::cache::ColumnCache;
use crate::clause::Clause;
use crate::dialect::Dialect;
use crate::error::{OrmResult, orm_warn};
use crate::query::Built;
use crate::record::Record;
use crate::value::Value;
use regex::Regex;
use std::sync::OnceLock;

/// What a query compiles from: raw text, or accumulated builder parts.
#[derive(Debug, Clone, Copy)]
pub enum Statement<'q> {
    Raw(&'q Clause),
    Built(&'q Built),
}

/// Final SQL text and its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSql {
    pub sql: String,
    pub args: Vec<Value>,
}

/// Compile `statement` for record type `R`.
pub fn compile<R, D>(
    statement: Statement<'_>,
    cache: &ColumnCache,
    dialect: &D,
) -> OrmResult<CompiledSql>
where
    R: Record,
    D: Dialect + ?Sized,
{
    let (sql, args) = match statement {
        Statement::Raw(clause) => (
            expand_in(&clause.fragment, clause.arguments.len()),
            clause.arguments.clone(),
        ),
        Statement::Built(built) => build_select::<R>(built, cache)?,
    };
    Ok(CompiledSql {
        sql: dialect.translate_sql(&sql),
        args,
    })
}

fn build_select<R: Record>(built: &Built, cache: &ColumnCache) -> OrmResult<(String, Vec<Value>)> {
    let columns = cache.columns::<R>()?;
    let mut sql = format!("SELECT {} FROM {}", columns.join(","), R::table_name());
    let mut args = Vec::new();

    for from in built.from_clauses() {
        sql.push_str(", ");
        sql.push_str(&from.fragment);
        args.extend(from.arguments.iter().cloned());
    }

    let wheres = built.where_clauses();
    if !wheres.is_empty() {
        let parts: Vec<String> = wheres
            .iter()
            .map(|c| expand_in(&c.fragment, c.arguments.len()))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&parts.join(" AND "));
        args.extend(wheres.args());
    }

    let orders = built.order_clauses();
    if !orders.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&orders.join(", "));
        args.extend(orders.args());
    }

    if built.limit() > 0 {
        sql.push_str(&format!(" LIMIT {}", built.limit()));
    }

    Ok((sql, args))
}

fn in_pattern() -> &'static Regex {
    static IN_RE: OnceLock<Regex> = OnceLock::new();
    IN_RE.get_or_init(|| Regex::new(r"(?i)\b(in)\s*\(\s*\?\s*\)").expect("invalid built-in IN regex"))
}

/// Count `?` placeholders outside single-quoted literals.
pub fn count_placeholders(sql: &str) -> usize {
    let mut in_quote = false;
    let mut count = 0;
    for c in sql.chars() {
        match c {
            '\'' => in_quote = !in_quote,
            '?' if !in_quote => count += 1,
            _ => {}
        }
    }
    count
}

/// Whether byte offset `pos` of `sql` falls inside a single-quoted literal.
fn in_literal(sql: &str, pos: usize) -> bool {
    sql[..pos].bytes().filter(|&b| b == b'\'').count() % 2 == 1
}

/// Expand the first `IN (?)` outside quoted text in `fragment` so it takes every surplus argument.
///
/// - `args == placeholders`: unchanged
/// - `args > placeholders`: the list receives `args - placeholders + 1` placeholders
/// - `args == placeholders - 1`: the list renders as `IN (NULL)`
///
/// Anything else is left unchanged and logged.
pub fn expand_in(fragment: &str, args: usize) -> String {
    let placeholders = count_placeholders(fragment);
    if args == placeholders {
        return fragment.to_string();
    }

    let Some(caps) = in_pattern()
        .captures_iter(fragment)
        .find(|caps| caps.get(0).is_some_and(|m| !in_literal(fragment, m.start())))
    else {
        orm_warn(&format!(
            "{args} arguments bound to {placeholders} placeholders in `{fragment}`"
        ));
        return fragment.to_string();
    };
    let (Some(whole), Some(keyword)) = (caps.get(0), caps.get(1)) else {
        return fragment.to_string();
    };

    let list = if args > placeholders {
        vec!["?"; args - placeholders + 1].join(",")
    } else if args + 1 == placeholders {
        "NULL".to_string()
    } else {
        orm_warn(&format!(
            "{args} arguments bound to {placeholders} placeholders in `{fragment}`"
        ));
        return fragment.to_string();
    };

    format!(
        "{}{} ({}){}",
        &fragment[..whole.start()],
        keyword.as_str(),
        list,
        &fragment[whole.end()..]
    )
}
