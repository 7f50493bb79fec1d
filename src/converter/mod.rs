//! Document converter
//!
//! Walks the entries of the root object in order. Each entry is serialized against
//! the constants bound so far and then bound itself:
//! 1. Convert the JSON entry to a [`Value`]
//! 2. Serialize it, evaluating expression markers against the current constants
//! 3. Bind the key: the evaluated result for a top-level marker, the raw value otherwise
//! 4. Emit `#([[key]], value)`
//!
//! Conversion stops at the first error; no partial document is produced.

use tracing::debug;

use crate::emitter::DslEmitter;
use crate::errors::{ConvertError, ConvertResult, Warning};
use crate::evaluator::{is_constant_name, Constants, Evaluator, OperatorTable, Value};
use crate::lexer::ExpressionMarker;

/// Options for the conversion process
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Reject top-level keys that are not valid constant names instead of warning
    pub strict_names: bool,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict_names(mut self, strict: bool) -> Self {
        self.strict_names = strict;
        self
    }
}

/// Converter from JSON documents to DSL text
pub struct Converter {
    options: ConvertOptions,
    operators: OperatorTable,
    emitter: DslEmitter,
    /// Warnings collected during the last conversion
    warnings: Vec<Warning>,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl Converter {
    /// Create a converter with the given options
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            operators: OperatorTable::standard(),
            emitter: DslEmitter::new(),
            warnings: Vec::new(),
        }
    }

    /// Get warnings collected during the last conversion
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Parse JSON text and convert it
    pub fn convert_str(&mut self, json: &str) -> ConvertResult<String> {
        let document = crate::loader::parse_json(json)?;
        self.convert(&document)
    }

    /// Convert a parsed document. Every call starts from an empty constants
    /// environment.
    pub fn convert(&mut self, document: &serde_json::Value) -> ConvertResult<String> {
        self.warnings.clear();

        let entries = document
            .as_object()
            .ok_or_else(|| ConvertError::RootTypeError {
                found: json_type_name(document).to_string(),
            })?;

        let mut constants = Constants::new();
        let mut pairs = Vec::with_capacity(entries.len());

        for (key, raw) in entries {
            self.check_constant_name(key)?;

            let value = Value::from_json(raw, key)?;
            let (rendered, bound) = {
                let evaluator = Evaluator::new(&self.operators, &constants, key);
                self.convert_entry(value, &evaluator)?
            };

            debug!(key = %key, kind = bound.type_name(), "binding constant");
            constants.define(key.as_str(), bound);
            pairs.push(self.emitter.emit_pair(key, &rendered));
        }

        debug!(
            constants = constants.len(),
            warnings = self.warnings.len(),
            "conversion finished"
        );
        Ok(self.emitter.emit_document(&pairs))
    }

    /// Render one top-level entry and decide what gets bound under its key.
    ///
    /// A top-level marker is evaluated once; the result is both rendered and bound.
    fn convert_entry(
        &self,
        value: Value,
        evaluator: &Evaluator<'_>,
    ) -> ConvertResult<(String, Value)> {
        if let Some(marker) = value.as_text().and_then(ExpressionMarker::parse) {
            let result = evaluator.evaluate(&marker)?;
            let rendered = self.emitter.emit_operand(&result);
            return Ok((rendered, Value::from(result)));
        }

        let rendered = self.emitter.emit_value(&value, evaluator)?;
        Ok((rendered, value))
    }

    fn check_constant_name(&mut self, key: &str) -> ConvertResult<()> {
        if is_constant_name(key) {
            return Ok(());
        }
        if self.options.strict_names {
            return Err(ConvertError::InvalidConstantName {
                key: key.to_string(),
            });
        }

        debug!(key = %key, "key is not a valid constant name");
        self.warnings.push(Warning {
            message: format!(
                "'{}' is not a valid constant name; expressions can only use it as [[{}]] text",
                key, key
            ),
            key: key.to_string(),
        });
        Ok(())
    }
}

/// Convert a document with default options
pub fn convert(document: &serde_json::Value) -> ConvertResult<String> {
    Converter::default().convert(document)
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_entries() {
        let out = convert(&json!({"Demo": 42, "Name": "app"})).unwrap();
        assert_eq!(out, "#(\n#([[Demo]], 42),\n#([[Name]], [[app]])\n)");
    }

    #[test]
    fn test_expression_result_is_bound() {
        let out = convert(&json!({
            "A": 2,
            "B": "${* A 3}",
            "C": "${+ B 1}"
        }))
        .unwrap();
        assert_eq!(out, "#(\n#([[A]], 2),\n#([[B]], 6),\n#([[C]], 7)\n)");
    }

    #[test]
    fn test_raw_composite_is_bound_unflattened() {
        let mut converter = Converter::default();
        // A composite constant exists, but is not an operand
        let err = converter
            .convert(&json!({"List": [1, 2], "Use": "${+ List 1}"}))
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidOperand { ref key, .. } if key == "Use"));
    }

    #[test]
    fn test_key_is_not_visible_to_its_own_value() {
        let err = convert(&json!({"Self_": "${+ Self_ 1}"})).unwrap_err();
        assert!(matches!(err, ConvertError::UndefinedConstant { .. }));
    }

    #[test]
    fn test_nested_markers_are_not_bound() {
        let err = convert(&json!({
            "Outer": {"Inner": "${+ 1 1}"},
            "Use": "${+ Inner 1}"
        }))
        .unwrap_err();
        assert!(matches!(err, ConvertError::UndefinedConstant { ref name, .. } if name == "Inner"));
    }

    #[test]
    fn test_root_must_be_object() {
        for doc in [json!([1, 2]), json!(42), json!("text"), json!(null)] {
            assert!(matches!(
                convert(&doc),
                Err(ConvertError::RootTypeError { .. })
            ));
        }
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(convert(&json!({})).unwrap(), "#(\n)");
    }

    #[test]
    fn test_invalid_names_warn_by_default() {
        let mut converter = Converter::default();
        let out = converter
            .convert(&json!({"location": "Main Street", "Copy": "${concat [[location]]}"}))
            .unwrap();
        assert!(out.contains("#([[Copy]], [[Main Street]])"));
        assert_eq!(converter.warnings().len(), 1);
        assert_eq!(converter.warnings()[0].key, "location");
    }

    #[test]
    fn test_invalid_names_fail_when_strict() {
        let mut converter = Converter::new(ConvertOptions::new().with_strict_names(true));
        let err = converter.convert(&json!({"Ok": 1, "bad-name": 2})).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConstantName { ref key } if key == "bad-name"));
    }

    #[test]
    fn test_warnings_reset_between_conversions() {
        let mut converter = Converter::default();
        converter.convert(&json!({"lower": 1})).unwrap();
        assert_eq!(converter.warnings().len(), 1);
        converter.convert(&json!({"Upper": 1})).unwrap();
        assert!(converter.warnings().is_empty());
    }

    #[test]
    fn test_constants_do_not_leak_between_conversions() {
        let mut converter = Converter::default();
        converter.convert(&json!({"Shared": 1})).unwrap();
        let err = converter.convert(&json!({"Use": "${+ Shared 1}"})).unwrap_err();
        assert!(matches!(err, ConvertError::UndefinedConstant { .. }));
    }
}
