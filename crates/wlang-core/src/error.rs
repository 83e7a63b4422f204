//! Error types for lexing and parsing the While surface syntax.
//!
//! Uses `thiserror` for structured, matchable error variants, following the
//! same one-variant-per-failure-mode convention as the rest of this project.

use thiserror::Error;

use crate::span::Span;

/// Errors produced while tokenizing source text.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    #[error("unterminated numeral at {span}")]
    MalformedNumber { span: Span },
}

/// Errors produced while parsing a token stream into an AST.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected token at {span}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
}
