//! Values flowing through the converter
//!
//! [`Value`] is the typed form of one JSON entry, ready to be serialized and bound as a
//! constant. [`Operand`] is the scalar subset that expressions compute with.

use std::fmt;

use indexmap::IndexMap;

use crate::errors::{ConvertError, ConvertResult};

/// A configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer (64-bit signed)
    Int(i64),
    /// Floating point (64-bit)
    Float(f64),
    /// Text, possibly an expression marker
    Text(String),
    /// Ordered sequence of values
    Sequence(Vec<Value>),
    /// Ordered name/value pairs
    Pairs(IndexMap<String, Value>),
}

impl Value {
    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::Sequence(_) => "array",
            Value::Pairs(_) => "object",
        }
    }

    /// Try to get as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON entry bound to the top-level `key`.
    ///
    /// Null and boolean values have no DSL form and fail with the JSON path of the
    /// offending value.
    pub fn from_json(json: &serde_json::Value, key: &str) -> ConvertResult<Self> {
        Self::from_json_at(json, key, key)
    }

    fn from_json_at(json: &serde_json::Value, key: &str, path: &str) -> ConvertResult<Self> {
        match json {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(unsupported(key, path, "number"))
                }
            }
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Array(arr) => arr
                .iter()
                .enumerate()
                .map(|(i, item)| Self::from_json_at(item, key, &format!("{}[{}]", path, i)))
                .collect::<ConvertResult<Vec<_>>>()
                .map(Value::Sequence),
            serde_json::Value::Object(obj) => {
                let mut pairs = IndexMap::with_capacity(obj.len());
                for (name, item) in obj {
                    let value = Self::from_json_at(item, key, &format!("{}.{}", path, name))?;
                    pairs.insert(name.clone(), value);
                }
                Ok(Value::Pairs(pairs))
            }
            serde_json::Value::Null => Err(unsupported(key, path, "null")),
            serde_json::Value::Bool(_) => Err(unsupported(key, path, "bool")),
        }
    }
}

fn unsupported(key: &str, path: &str, found: &str) -> ConvertError {
    ConvertError::UnsupportedValueType {
        key: key.to_string(),
        path: path.to_string(),
        found: found.to_string(),
    }
}

impl From<Operand> for Value {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Int(n) => Value::Int(n),
            Operand::Float(n) => Value::Float(n),
            Operand::Text(s) => Value::Text(s),
        }
    }
}

/// A resolved expression operand, also the result of evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Operand {
    /// Get the type name of this operand
    pub fn type_name(&self) -> &'static str {
        match self {
            Operand::Int(_) => "int",
            Operand::Float(_) => "float",
            Operand::Text(_) => "string",
        }
    }

    /// Try to get as a number (converts int to float)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Operand::Int(n) => Some(*n as f64),
            Operand::Float(n) => Some(*n),
            Operand::Text(_) => None,
        }
    }

    /// Try to get as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Operand::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Scalar view of a bound constant; composites are not operands
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(Operand::Int(*n)),
            Value::Float(n) => Some(Operand::Float(*n)),
            Value::Text(s) => Some(Operand::Text(s.clone())),
            Value::Sequence(_) | Value::Pairs(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(n) => write!(f, "{}", n),
            Operand::Float(n) => write!(f, "{}", n),
            Operand::Text(s) => write!(f, "{:?}", s),
        }
    }
}
