//! SQL fragments with positional arguments.

use crate::value::Value;

/// A SQL fragment and the arguments bound to its `?` placeholders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clause {
    pub fragment: String,
    pub arguments: Vec<Value>,
}

impl Clause {
    pub fn new(fragment: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            fragment: fragment.into(),
            arguments,
        }
    }

    /// A fragment without arguments.
    pub fn text(fragment: impl Into<String>) -> Self {
        Self::new(fragment, Vec::new())
    }
}

/// Clauses in accumulation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clauses(Vec<Clause>);

impl Clauses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, clause: Clause) {
        self.0.push(clause);
    }

    /// Fragments joined by `sep`, in accumulation order.
    pub fn join(&self, sep: &str) -> String {
        self.0
            .iter()
            .map(|c| c.fragment.as_str())
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// All arguments, flattened in accumulation order.
    pub fn args(&self) -> Vec<Value> {
        self.0
            .iter()
            .flat_map(|c| c.arguments.iter().cloned())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Clauses {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
