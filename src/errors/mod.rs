//! Error types, diagnostics, and result aliases for the converter.
//!
//! All user-facing errors are variants of [`ConvertError`], rendered via `miette` diagnostics.
//! Expression errors carry the marker text as source code so the offending token is labelled.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Warning from conversion (non-fatal)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    /// Top-level key the warning was raised for
    pub key: String,
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_ch) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Find the best "did you mean?" suggestion from a list of candidates
pub fn find_similar(name: &str, candidates: &[String], max_distance: usize) -> Option<String> {
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let distance = levenshtein_distance(name, candidate);
        if distance <= max_distance && distance < best_distance {
            best_distance = distance;
            best_match = Some(candidate.clone());
        }
    }

    best_match
}

/// Help text for a reference to a constant that is not (yet) defined
pub fn undefined_constant_help(name: &str, defined: &[String]) -> String {
    // Longer names tolerate more typos
    let max_distance = (name.len() / 3).clamp(1, 3);

    if let Some(suggestion) = find_similar(name, defined, max_distance) {
        format!("did you mean '{}'?", suggestion)
    } else if defined.is_empty() {
        "no constants are defined before this key".to_string()
    } else if defined.len() <= 5 {
        format!(
            "constants defined so far: {}; a constant must be defined before it is used",
            defined.join(", ")
        )
    } else {
        "a constant must be defined by an earlier top-level key".to_string()
    }
}

/// Help text for an unknown operator
pub fn unknown_operator_help(name: &str, operators: &[String]) -> String {
    match find_similar(name, operators, 2) {
        Some(suggestion) => format!("did you mean '{}'?", suggestion),
        None => format!("available operators: {}", operators.join(", ")),
    }
}

/// Main error type for the converter
#[derive(Error, Debug, Diagnostic)]
pub enum ConvertError {
    #[error("document root must be an object")]
    #[diagnostic(
        code(E0101),
        help("wrap the configuration in a JSON object: {{\"Key\": value, ...}}")
    )]
    RootTypeError { found: String },

    #[error("empty expression in '{key}'")]
    #[diagnostic(code(E0201), help("write an operator and its operands: ${{+ A 1}}"))]
    EmptyExpression {
        #[source_code]
        src: String,
        #[label("no operator here")]
        span: SourceSpan,
        key: String,
    },

    #[error("unknown operator '{name}' in '{key}'")]
    #[diagnostic(code(E0202), help("{help}"))]
    UnknownOperator {
        #[source_code]
        src: String,
        #[label("not an operator")]
        span: SourceSpan,
        key: String,
        name: String,
        help: String,
    },

    #[error("undefined constant '{name}' in '{key}'")]
    #[diagnostic(code(E0203), help("{help}"))]
    UndefinedConstant {
        #[source_code]
        src: String,
        #[label("'{name}' is not defined yet")]
        span: SourceSpan,
        key: String,
        name: String,
        help: String,
    },

    #[error("invalid operand in '{key}': {detail}")]
    #[diagnostic(code(E0204), help("{help}"))]
    InvalidOperand {
        #[source_code]
        src: String,
        #[label("{detail}")]
        span: SourceSpan,
        key: String,
        detail: String,
        help: String,
    },

    #[error("evaluation failed in '{key}': {operation}")]
    #[diagnostic(code(E0205), help("{help}"))]
    EvaluationError {
        #[source_code]
        src: String,
        #[label("{operation}")]
        span: SourceSpan,
        key: String,
        operation: String,
        help: String,
    },

    #[error("unsupported value type {found} at {path}")]
    #[diagnostic(
        code(E0301),
        help("only numbers, strings, arrays, and objects can be converted")
    )]
    UnsupportedValueType {
        key: String,
        path: String,
        found: String,
    },

    #[error("'{key}' is not a valid constant name")]
    #[diagnostic(
        code(E0302),
        help("names start with '_' or an uppercase letter, then letters, digits, or '_'")
    )]
    InvalidConstantName { key: String },

    #[error("{format} parse error: {message}")]
    #[diagnostic(code(E0401))]
    ParseError { format: String, message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

impl ConvertError {
    /// Create an IoError
    pub fn io_error(message: impl Into<String>) -> Self {
        ConvertError::IoError {
            message: message.into(),
        }
    }

    /// Create a ParseError for the named input format
    pub fn parse_error(format: impl Into<String>, message: impl Into<String>) -> Self {
        ConvertError::ParseError {
            format: format.into(),
            message: message.into(),
        }
    }

    /// The top-level key being converted when the error occurred, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            ConvertError::EmptyExpression { key, .. }
            | ConvertError::UnknownOperator { key, .. }
            | ConvertError::UndefinedConstant { key, .. }
            | ConvertError::InvalidOperand { key, .. }
            | ConvertError::EvaluationError { key, .. }
            | ConvertError::UnsupportedValueType { key, .. }
            | ConvertError::InvalidConstantName { key } => Some(key.as_str()),
            ConvertError::RootTypeError { .. }
            | ConvertError::ParseError { .. }
            | ConvertError::IoError { .. } => None,
        }
    }

    /// The expression marker text the error points into, if any
    pub fn expression(&self) -> Option<&str> {
        match self {
            ConvertError::EmptyExpression { src, .. }
            | ConvertError::UnknownOperator { src, .. }
            | ConvertError::UndefinedConstant { src, .. }
            | ConvertError::InvalidOperand { src, .. }
            | ConvertError::EvaluationError { src, .. } => Some(src.as_str()),
            _ => None,
        }
    }

    /// Get a simple error message (without source context)
    pub fn message(&self) -> String {
        match self {
            ConvertError::RootTypeError { found } => {
                format!("document root must be an object, found {}", found)
            }
            ConvertError::EmptyExpression { key, src, .. } => {
                format!("empty expression {} in '{}'", src, key)
            }
            ConvertError::UnknownOperator { key, src, name, .. } => {
                format!("unknown operator '{}' in {} at '{}'", name, src, key)
            }
            ConvertError::UndefinedConstant { key, src, name, .. } => {
                format!("undefined constant '{}' in {} at '{}'", name, src, key)
            }
            ConvertError::InvalidOperand {
                key, src, detail, ..
            } => {
                format!("invalid operand in {} at '{}': {}", src, key, detail)
            }
            ConvertError::EvaluationError {
                key, src, operation, ..
            } => {
                format!("evaluation of {} failed at '{}': {}", src, key, operation)
            }
            ConvertError::UnsupportedValueType { path, found, .. } => {
                format!("unsupported value type {} at {}", found, path)
            }
            ConvertError::InvalidConstantName { key } => {
                format!("'{}' is not a valid constant name", key)
            }
            ConvertError::ParseError { format, message } => {
                format!("{} parse error: {}", format, message)
            }
            ConvertError::IoError { message } => format!("I/O error: {}", message),
        }
    }
}

/// Result type for converter operations
pub type ConvertResult<T> = Result<T, ConvertError>;
