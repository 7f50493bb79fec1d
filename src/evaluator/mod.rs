//! Evaluator for expression markers
//!
//! An [`Evaluator`] is scoped to one top-level key: it reads the constants bound by
//! earlier keys and never writes to them. Evaluating a marker runs the whole
//! pipeline:
//! - tokenize the body
//! - look up the leading token in the operator table
//! - resolve every other token to an [`Operand`]
//! - apply the operator

pub mod constants;
pub mod operators;
pub mod value;

use std::num::IntErrorKind;

use tracing::trace;

use crate::errors::{undefined_constant_help, unknown_operator_help, ConvertError, ConvertResult};
use crate::lexer::token::Token;
use crate::lexer::{ExpressionMarker, Lexer};

pub use constants::{is_constant_name, Constants};
pub use operators::{Arity, Operator, OperatorFailure, OperatorTable};
pub use value::{Operand, Value};

/// Evaluates expression markers against a read-only constants snapshot
pub struct Evaluator<'a> {
    operators: &'a OperatorTable,
    constants: &'a Constants,
    /// Top-level key being converted (for error messages)
    key: &'a str,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator for the entry bound to `key`
    pub fn new(operators: &'a OperatorTable, constants: &'a Constants, key: &'a str) -> Self {
        Self {
            operators,
            constants,
            key,
        }
    }

    /// Evaluate a string value if it is an expression marker.
    ///
    /// Returns `Ok(None)` for ordinary strings.
    pub fn evaluate_str(&self, value: &str) -> ConvertResult<Option<Operand>> {
        match ExpressionMarker::parse(value) {
            Some(marker) => self.evaluate(&marker).map(Some),
            None => Ok(None),
        }
    }

    /// Evaluate a marker to a scalar result
    pub fn evaluate(&self, marker: &ExpressionMarker<'_>) -> ConvertResult<Operand> {
        let (op_token, operand_tokens) = Lexer::new(*marker, self.key).tokenize()?;

        let operator = self.operators.get(&op_token.text).ok_or_else(|| {
            ConvertError::UnknownOperator {
                src: marker.source.to_string(),
                span: op_token.span(),
                key: self.key.to_string(),
                name: op_token.text.clone(),
                help: unknown_operator_help(&op_token.text, &self.operators.names()),
            }
        })?;

        let operands = operand_tokens
            .iter()
            .map(|token| self.resolve_operand(marker, token))
            .collect::<ConvertResult<Vec<_>>>()?;

        trace!(
            key = self.key,
            operator = operator.name,
            operands = operands.len(),
            "evaluating expression"
        );

        operator
            .apply(&operands)
            .map_err(|failure| self.operator_error(marker, &op_token, &operand_tokens, failure))
    }

    /// Resolve one token to a typed operand.
    ///
    /// Constant-shaped tokens must name a bound scalar constant. `[[...]]` yields the
    /// value of the named text constant if there is one, the inner text otherwise.
    /// Anything else must parse as a number.
    pub fn resolve_operand(
        &self,
        marker: &ExpressionMarker<'_>,
        token: &Token,
    ) -> ConvertResult<Operand> {
        let text = token.text.as_str();

        if is_constant_name(text) {
            let value = self
                .constants
                .get(text)
                .ok_or_else(|| ConvertError::UndefinedConstant {
                    src: marker.source.to_string(),
                    span: token.span(),
                    key: self.key.to_string(),
                    name: text.to_string(),
                    help: undefined_constant_help(text, &self.constants.names()),
                })?;
            return Operand::from_value(value).ok_or_else(|| ConvertError::InvalidOperand {
                src: marker.source.to_string(),
                span: token.span(),
                key: self.key.to_string(),
                detail: format!(
                    "constant '{}' is not a number or text (found {})",
                    text,
                    value.type_name()
                ),
                help: "expressions operate on numbers and text only".to_string(),
            });
        }

        if let Some(inner) = token.bracket_inner() {
            let resolved = self.constants.get_text(inner).unwrap_or(inner);
            return Ok(Operand::Text(resolved.to_string()));
        }

        parse_number(text).ok_or_else(|| ConvertError::InvalidOperand {
            src: marker.source.to_string(),
            span: token.span(),
            key: self.key.to_string(),
            detail: format!("'{}' is not a constant, number, or [[text]]", text),
            help: "constants start with '_' or an uppercase letter; \
                   text literals are written [[like this]]"
                .to_string(),
        })
    }

    fn operator_error(
        &self,
        marker: &ExpressionMarker<'_>,
        op_token: &Token,
        operand_tokens: &[Token],
        failure: OperatorFailure,
    ) -> ConvertError {
        match failure {
            OperatorFailure::InvalidOperand {
                index,
                detail,
                help,
            } => {
                let span = index
                    .and_then(|i| operand_tokens.get(i))
                    .unwrap_or(op_token)
                    .span();
                ConvertError::InvalidOperand {
                    src: marker.source.to_string(),
                    span,
                    key: self.key.to_string(),
                    detail,
                    help,
                }
            }
            OperatorFailure::Evaluation { operation, help } => ConvertError::EvaluationError {
                src: marker.source.to_string(),
                span: marker.full_span().into(),
                key: self.key.to_string(),
                operation,
                help,
            },
        }
    }
}

/// Parse a numeric literal. A token with a `.` is a float; an integer too large for
/// an i64 becomes a float, as oversized JSON integers do.
fn parse_number(text: &str) -> Option<Operand> {
    if text.contains('.') {
        return text.parse::<f64>().ok().map(Operand::Float);
    }
    match text.parse::<i64>() {
        Ok(n) => Some(Operand::Int(n)),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            text.parse::<f64>().ok().map(Operand::Float)
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constants() -> Constants {
        let mut constants = Constants::new();
        constants.define("Demo", Value::Int(42));
        constants.define("Rate", Value::Float(0.5));
        constants.define("Greeting", Value::Text("Hello".into()));
        constants.define("Target", Value::Text("World".into()));
        constants.define("Values", Value::Sequence(vec![Value::Int(1)]));
        constants
    }

    fn eval(source: &str) -> ConvertResult<Operand> {
        let operators = OperatorTable::standard();
        let constants = constants();
        let evaluator = Evaluator::new(&operators, &constants, "Key");
        evaluator
            .evaluate_str(source)
            .map(|result| result.expect("not an expression"))
    }

    #[test]
    fn test_plain_string_is_not_evaluated() {
        let operators = OperatorTable::standard();
        let constants = constants();
        let evaluator = Evaluator::new(&operators, &constants, "Key");
        assert_eq!(evaluator.evaluate_str("Demo + 1").unwrap(), None);
    }

    #[test]
    fn test_constant_reference() {
        assert_eq!(eval("${+ Demo 1}").unwrap(), Operand::Int(43));
        assert_eq!(eval("${* Demo Rate}").unwrap(), Operand::Float(21.0));
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(eval("${+ 1.5 2}").unwrap(), Operand::Float(3.5));
        assert_eq!(eval("${- -3 4}").unwrap(), Operand::Int(-7));
        assert_eq!(eval("${/ 10 5}").unwrap(), Operand::Float(2.0));
    }

    #[test]
    fn test_bracketed_text_substitutes_text_constants() {
        assert_eq!(
            eval("${concat [[Greeting]] [[ ]] [[Target]]}").unwrap(),
            Operand::Text("Hello World".into())
        );
    }

    #[test]
    fn test_bracketed_text_keeps_non_text_constant_names() {
        // Demo is numeric, so [[Demo]] stays literal text
        assert_eq!(
            eval("${concat [[Demo]] [[!]]}").unwrap(),
            Operand::Text("Demo!".into())
        );
    }

    #[test]
    fn test_bare_text_constant_is_text_operand() {
        assert_eq!(
            eval("${concat Greeting [[, ]] Target}").unwrap(),
            Operand::Text("Hello, World".into())
        );
        assert_eq!(eval("${ord [[A]]}").unwrap(), Operand::Int(65));
    }

    #[test]
    fn test_unknown_operator() {
        let err = eval("${conca [[a]]}").unwrap_err();
        match err {
            ConvertError::UnknownOperator { name, help, key, .. } => {
                assert_eq!(name, "conca");
                assert_eq!(key, "Key");
                assert!(help.contains("concat"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_undefined_constant() {
        let err = eval("${+ Missing 1}").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UndefinedConstant { ref name, .. } if name == "Missing"
        ));
    }

    #[test]
    fn test_lowercase_word_is_not_a_constant() {
        let err = eval("${+ demo 1}").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidOperand { .. }));
    }

    #[test]
    fn test_composite_constant_is_invalid_operand() {
        let err = eval("${+ Values 1}").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidOperand { ref detail, .. } if detail.contains("array")
        ));
    }

    #[test]
    fn test_oversized_integer_literal_is_float() {
        assert_eq!(
            eval("${+ 99999999999999999999 1}").unwrap(),
            Operand::Float(1e20)
        );
        assert_eq!(
            eval("${* -99999999999999999999 1}").unwrap(),
            Operand::Float(-1e20)
        );
        assert_eq!(
            eval("${+ 9223372036854775807 0}").unwrap(),
            Operand::Int(i64::MAX)
        );
    }

    #[test]
    fn test_invalid_numeric_literal() {
        assert!(matches!(
            eval("${+ 1e5 1}"),
            Err(ConvertError::InvalidOperand { .. })
        ));
        assert!(matches!(
            eval("${+ 1.2.3 1}"),
            Err(ConvertError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_operand_type_error_points_at_operand() {
        let err = eval("${+ 1 [[two]]}").unwrap_err();
        match err {
            ConvertError::InvalidOperand { span, src, .. } => {
                assert_eq!(&src[span.offset()..span.offset() + span.len()], "[[two]]");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_evaluation_error() {
        assert!(matches!(
            eval("${/ Demo 0}"),
            Err(ConvertError::EvaluationError { .. })
        ));
    }

    #[test]
    fn test_arity_error() {
        assert!(matches!(
            eval("${ord [[a]] [[b]]}"),
            Err(ConvertError::InvalidOperand { .. })
        ));
    }
}
