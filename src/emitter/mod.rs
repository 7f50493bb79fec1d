//! DSL emitter
//!
//! Renders [`Value`] trees as DSL text:
//! - numbers bare, floats always with a fractional part
//! - text as `[[...]]` with `]]` doubled
//! - sequences as `#( a, b )`
//! - objects as a sequence of `#([[name]], value)` pairs
//!
//! Text that is an expression marker is evaluated and only its result is rendered.

use crate::errors::ConvertResult;
use crate::evaluator::{Evaluator, Operand, Value};

/// Escape text for a `[[...]]` literal by doubling every `]]`
pub fn escape_text(s: &str) -> String {
    s.replace("]]", "]]]]")
}

/// Render an integer
pub fn format_int(n: i64) -> String {
    n.to_string()
}

/// Render a float so it always reads back as a float
pub fn format_float(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{:.1}", n)
    } else {
        n.to_string()
    }
}

/// Emitter for the bracketed configuration DSL
#[derive(Debug, Clone)]
pub struct DslEmitter {
    /// Separator placed between the pairs of a document
    pair_separator: String,
}

impl Default for DslEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl DslEmitter {
    /// Create a new emitter
    pub fn new() -> Self {
        Self {
            pair_separator: ",\n".to_string(),
        }
    }

    /// Emit a value, evaluating any expression markers it contains
    pub fn emit_value(&self, value: &Value, evaluator: &Evaluator<'_>) -> ConvertResult<String> {
        match value {
            Value::Int(n) => Ok(format_int(*n)),
            Value::Float(n) => Ok(format_float(*n)),
            Value::Text(s) => match evaluator.evaluate_str(s)? {
                Some(result) => Ok(self.emit_operand(&result)),
                None => Ok(self.emit_text(s)),
            },
            Value::Sequence(items) => {
                let items = items
                    .iter()
                    .map(|item| self.emit_value(item, evaluator))
                    .collect::<ConvertResult<Vec<_>>>()?;
                Ok(self.emit_sequence(&items))
            }
            Value::Pairs(pairs) => {
                let items = pairs
                    .iter()
                    .map(|(name, item)| {
                        let rendered = self.emit_value(item, evaluator)?;
                        Ok(self.emit_pair(name, &rendered))
                    })
                    .collect::<ConvertResult<Vec<_>>>()?;
                Ok(self.emit_sequence(&items))
            }
        }
    }

    /// Emit an expression result
    pub fn emit_operand(&self, operand: &Operand) -> String {
        match operand {
            Operand::Int(n) => format_int(*n),
            Operand::Float(n) => format_float(*n),
            Operand::Text(s) => self.emit_text(s),
        }
    }

    /// Emit text as a bracketed literal
    pub fn emit_text(&self, s: &str) -> String {
        format!("[[{}]]", escape_text(s))
    }

    /// Emit a `#([[name]], value)` pair from an already rendered value
    pub fn emit_pair(&self, name: &str, rendered: &str) -> String {
        format!("#({}, {})", self.emit_text(name), rendered)
    }

    /// Emit a sequence from already rendered items
    pub fn emit_sequence(&self, items: &[String]) -> String {
        if items.is_empty() {
            "#( )".to_string()
        } else {
            format!("#( {} )", items.join(", "))
        }
    }

    /// Wrap rendered top-level pairs into a document
    pub fn emit_document(&self, pairs: &[String]) -> String {
        if pairs.is_empty() {
            return "#(\n)".to_string();
        }
        format!("#(\n{}\n)", pairs.join(self.pair_separator.as_str()))
    }
}
