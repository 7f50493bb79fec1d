//! Operator table for expression markers
//!
//! Every expression is prefix form: an operator name followed by its operands. The
//! table is fixed; there is no way to register user-defined operators.

use indexmap::IndexMap;

use super::value::Operand;

/// How many operands an operator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == *n,
            Arity::AtLeast(n) => count >= *n,
        }
    }

    fn describe(&self) -> String {
        match self {
            Arity::Exactly(1) => "exactly 1 operand".to_string(),
            Arity::Exactly(n) => format!("exactly {} operands", n),
            Arity::AtLeast(1) => "at least 1 operand".to_string(),
            Arity::AtLeast(n) => format!("at least {} operands", n),
        }
    }
}

/// Why an operator could not produce a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorFailure {
    /// Wrong operand count or type. `index` names the offending operand, if one is
    /// to blame.
    InvalidOperand {
        index: Option<usize>,
        detail: String,
        help: String,
    },
    /// The operands were acceptable but the operation itself failed
    Evaluation { operation: String, help: String },
}

type OperatorFn = fn(&[Operand]) -> Result<Operand, OperatorFailure>;

/// A named operation with its arity
#[derive(Debug, Clone)]
pub struct Operator {
    pub name: &'static str,
    pub arity: Arity,
    /// Human-readable operand signature, used in help text
    pub signature: &'static str,
    apply: OperatorFn,
}

impl Operator {
    /// Check arity, then apply the operation
    pub fn apply(&self, operands: &[Operand]) -> Result<Operand, OperatorFailure> {
        if !self.arity.accepts(operands.len()) {
            return Err(OperatorFailure::InvalidOperand {
                index: None,
                detail: format!(
                    "'{}' takes {}, got {}",
                    self.name,
                    self.arity.describe(),
                    operands.len()
                ),
                help: format!("usage: ${{{} {}}}", self.name, self.signature),
            });
        }
        (self.apply)(operands)
    }
}

/// Immutable registry of the available operators
#[derive(Debug, Clone)]
pub struct OperatorTable {
    operators: IndexMap<&'static str, Operator>,
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl OperatorTable {
    /// The standard operator set: `+ - * / concat ord`
    pub fn standard() -> Self {
        let operators = [
            Operator {
                name: "+",
                arity: Arity::Exactly(2),
                signature: "NUMBER NUMBER",
                apply: op_add,
            },
            Operator {
                name: "-",
                arity: Arity::Exactly(2),
                signature: "NUMBER NUMBER",
                apply: op_sub,
            },
            Operator {
                name: "*",
                arity: Arity::Exactly(2),
                signature: "NUMBER NUMBER",
                apply: op_mul,
            },
            Operator {
                name: "/",
                arity: Arity::Exactly(2),
                signature: "NUMBER NUMBER",
                apply: op_div,
            },
            Operator {
                name: "concat",
                arity: Arity::AtLeast(1),
                signature: "TEXT...",
                apply: op_concat,
            },
            Operator {
                name: "ord",
                arity: Arity::Exactly(1),
                signature: "CHAR",
                apply: op_ord,
            },
        ];

        Self {
            operators: operators.into_iter().map(|op| (op.name, op)).collect(),
        }
    }

    /// Look up an operator by name
    pub fn get(&self, name: &str) -> Option<&Operator> {
        self.operators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Operator names, in table order
    pub fn names(&self) -> Vec<String> {
        self.operators.keys().map(|name| name.to_string()).collect()
    }
}

fn type_error(index: usize, operator: &str, expected: &str, found: &Operand) -> OperatorFailure {
    OperatorFailure::InvalidOperand {
        index: Some(index),
        detail: format!("expected {}, found {}", expected, found.type_name()),
        help: format!("'{}' requires {} operands", operator, expected),
    }
}

fn non_finite(operation: String) -> OperatorFailure {
    OperatorFailure::Evaluation {
        operation,
        help: "the result is not a finite number".to_string(),
    }
}

/// Shared numeric arithmetic: Int op Int is checked and stays Int, anything involving
/// a Float is computed in f64.
fn eval_numeric(
    operands: &[Operand],
    op_sym: &str,
    checked_int: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Operand, OperatorFailure> {
    let (left, right) = (&operands[0], &operands[1]);
    match (left, right) {
        (Operand::Int(a), Operand::Int(b)) => checked_int(*a, *b)
            .map(Operand::Int)
            .ok_or_else(|| OperatorFailure::Evaluation {
                operation: format!("{} {} {}", a, op_sym, b),
                help: "integer overflow: result exceeds i64 range".to_string(),
            }),
        _ => {
            let a = left
                .as_float()
                .ok_or_else(|| type_error(0, op_sym, "number", left))?;
            let b = right
                .as_float()
                .ok_or_else(|| type_error(1, op_sym, "number", right))?;
            let result = float_op(a, b);
            if result.is_finite() {
                Ok(Operand::Float(result))
            } else {
                Err(non_finite(format!("{} {} {}", a, op_sym, b)))
            }
        }
    }
}

fn op_add(operands: &[Operand]) -> Result<Operand, OperatorFailure> {
    eval_numeric(operands, "+", i64::checked_add, |a, b| a + b)
}

fn op_sub(operands: &[Operand]) -> Result<Operand, OperatorFailure> {
    eval_numeric(operands, "-", i64::checked_sub, |a, b| a - b)
}

fn op_mul(operands: &[Operand]) -> Result<Operand, OperatorFailure> {
    eval_numeric(operands, "*", i64::checked_mul, |a, b| a * b)
}

/// Division always produces a float, even for evenly divisible integers
fn op_div(operands: &[Operand]) -> Result<Operand, OperatorFailure> {
    let (left, right) = (&operands[0], &operands[1]);
    let a = left
        .as_float()
        .ok_or_else(|| type_error(0, "/", "number", left))?;
    let b = right
        .as_float()
        .ok_or_else(|| type_error(1, "/", "number", right))?;

    if b == 0.0 {
        return Err(OperatorFailure::Evaluation {
            operation: format!("{} / {}", left, right),
            help: "division by zero: divisor must be non-zero".to_string(),
        });
    }

    let result = a / b;
    if result.is_finite() {
        Ok(Operand::Float(result))
    } else {
        Err(non_finite(format!("{} / {}", a, b)))
    }
}

fn op_concat(operands: &[Operand]) -> Result<Operand, OperatorFailure> {
    let mut result = String::new();
    for (i, operand) in operands.iter().enumerate() {
        match operand {
            Operand::Text(s) => result.push_str(s),
            other => return Err(type_error(i, "concat", "text", other)),
        }
    }
    Ok(Operand::Text(result))
}

fn op_ord(operands: &[Operand]) -> Result<Operand, OperatorFailure> {
    let operand = &operands[0];
    let text = operand
        .as_text()
        .ok_or_else(|| type_error(0, "ord", "single-character text", operand))?;

    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(Operand::Int(i64::from(u32::from(ch)))),
        _ => Err(OperatorFailure::InvalidOperand {
            index: Some(0),
            detail: format!(
                "expected a single character, found {} characters",
                text.chars().count()
            ),
            help: "'ord' returns the code of exactly one character".to_string(),
        }),
    }
}
