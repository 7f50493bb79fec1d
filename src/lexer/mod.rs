//! Tokenizer for expression markers.
//!
//! An expression marker is a string whose trimmed form is `${...}`. The body is split
//! on whitespace, except that a `[[...]]` run is kept whole so bracketed literals may
//! contain spaces.

pub mod token;

use crate::errors::{ConvertError, ConvertResult};
use token::Token;

/// A string value recognized as an expression marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpressionMarker<'a> {
    /// The trimmed marker text, `${` and `}` included
    pub source: &'a str,
    /// Text between `${` and the closing `}`
    pub body: &'a str,
}

impl<'a> ExpressionMarker<'a> {
    /// Recognize `value` as a marker; only a value that is entirely `${...}` after
    /// trimming qualifies.
    pub fn parse(value: &'a str) -> Option<Self> {
        let source = value.trim();
        let body = source.strip_prefix("${")?.strip_suffix('}')?;
        Some(Self { source, body })
    }

    /// Byte offset of the body within `source`
    pub fn body_offset(&self) -> usize {
        2
    }

    /// Span covering the whole marker
    pub fn full_span(&self) -> (usize, usize) {
        (0, self.source.len())
    }
}

/// Check whether a string value is an expression marker
pub fn is_expression(value: &str) -> bool {
    ExpressionMarker::parse(value).is_some()
}

/// Bracket-aware scanner over a marker body
pub struct Lexer<'a> {
    /// Marker being tokenized
    marker: ExpressionMarker<'a>,
    /// Top-level key, for error reporting
    key: &'a str,
    /// Current position in the body, in bytes
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given marker
    pub fn new(marker: ExpressionMarker<'a>, key: &'a str) -> Self {
        Self {
            marker,
            key,
            position: 0,
        }
    }

    /// Tokenize the whole body into the operator token and its operand tokens.
    /// Fails when the body holds no tokens.
    pub fn tokenize(&mut self) -> ConvertResult<(Token, Vec<Token>)> {
        let operator = self
            .next_token()
            .ok_or_else(|| ConvertError::EmptyExpression {
                src: self.marker.source.to_string(),
                span: self.marker.full_span().into(),
                key: self.key.to_string(),
            })?;

        let mut operands = Vec::new();
        while let Some(token) = self.next_token() {
            operands.push(token);
        }

        Ok((operator, operands))
    }

    /// Get the next token, or `None` at the end of the body
    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();

        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }

        let start = self.position;
        let length = bracketed_len(rest).unwrap_or_else(|| word_len(rest));
        self.position += length;

        Some(Token::new(
            &rest[..length],
            self.marker.body_offset() + start,
        ))
    }

    fn rest(&self) -> &'a str {
        let body = self.marker.body;
        &body[self.position..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.position += rest.len() - trimmed.len();
    }
}

/// Length of a `[[...]]` run at the start of `text`. The run ends at the first `]`,
/// which must begin the closing `]]`.
fn bracketed_len(text: &str) -> Option<usize> {
    let inner = text.strip_prefix("[[")?;
    let close = inner.find(']')?;
    if inner[close..].starts_with("]]") {
        Some(2 + close + 2)
    } else {
        None
    }
}

/// Length of the whitespace-delimited run at the start of `text`
fn word_len(text: &str) -> usize {
    text.find(char::is_whitespace).unwrap_or(text.len())
}
