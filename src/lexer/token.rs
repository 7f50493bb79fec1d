use std::fmt;

use miette::SourceSpan;

/// A raw token from an expression body.
///
/// Tokens are untyped: whether a token names an operator, a constant, a bracketed
/// literal, or a number is decided when operands are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text exactly as written
    pub text: String,
    /// Byte offset from the start of the marker text (`${` included)
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        let text = text.into();
        let length = text.len();
        Self {
            text,
            offset,
            length,
        }
    }

    /// Span of this token within the marker text, for diagnostics
    pub fn span(&self) -> SourceSpan {
        (self.offset, self.length).into()
    }

    /// Whether the token is wrapped in `[[` and `]]`
    pub fn is_bracketed(&self) -> bool {
        self.text.len() >= 4 && self.text.starts_with("[[") && self.text.ends_with("]]")
    }

    /// Inner text of a bracketed token
    pub fn bracket_inner(&self) -> Option<&str> {
        if self.is_bracketed() {
            Some(&self.text[2..self.text.len() - 2])
        } else {
            None
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
