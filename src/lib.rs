// Rust 1.93+ triggers false positives on thiserror/miette derive macro fields
#![allow(unused_assignments)]

//! JSON to bracketed configuration DSL converter
//!
//! Every top-level key of a JSON object becomes a constant that later keys can use in
//! inline `${...}` expressions.
//!
//! # Example
//!
//! ```
//! let doc = serde_json::json!({"Demo": 42, "ComputedProperty": "${+ Demo 1}"});
//! let out = confdsl::convert(&doc).unwrap();
//! assert_eq!(out, "#(\n#([[Demo]], 42),\n#([[ComputedProperty]], 43)\n)");
//! ```

pub mod converter;
pub mod emitter;
pub mod errors;
pub mod evaluator;
pub mod lexer;
pub mod loader;

pub use converter::{convert, ConvertOptions, Converter};
pub use emitter::DslEmitter;
pub use errors::{ConvertError, ConvertResult, Warning};
pub use evaluator::{Constants, Evaluator, Operand, OperatorTable, Value};
pub use lexer::token::Token;
pub use lexer::{ExpressionMarker, Lexer};
pub use loader::{load_file, load_reader, parse_json, parse_yaml, InputFormat};
