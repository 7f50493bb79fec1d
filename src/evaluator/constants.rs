//! The constants environment
//!
//! Every top-level key of a document is bound here once, in document order. Later keys
//! may reference earlier ones; nothing is ever rebound or removed.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use super::value::Value;

static CONSTANT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[_A-Z][_a-zA-Z0-9]*$").expect("constant name pattern is valid")
});

/// Check whether `name` has the shape of a constant name
pub fn is_constant_name(name: &str) -> bool {
    CONSTANT_NAME.is_match(name)
}

/// Ordered, append-only constant bindings for one conversion
#[derive(Debug, Clone, Default)]
pub struct Constants {
    bindings: IndexMap<String, Value>,
}

impl Constants {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a constant
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a constant by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Look up a constant holding text
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Names of all bound constants, in binding order
    pub fn names(&self) -> Vec<String> {
        self.bindings.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
