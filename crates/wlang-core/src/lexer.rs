//! Hand-written tokenizer for the While surface syntax.
//!
//! The grammar has six keywords and eight punctuation tokens, so a
//! lexer-generator crate would be overkill; this is a single pass over the
//! source bytes that produces a flat `Vec<Token>`.

use crate::error::LexError;
use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Num(i64),
    Ident(String),
    True,
    False,
    Skip,
    If,
    Then,
    Else,
    Fi,
    While,
    Do,
    Done,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Eq,
    Leq,
    Bang,
    Amp,
    Semi,
    LParen,
    RParen,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Num(n) => write!(f, "{n}"),
            TokenKind::Ident(s) => write!(f, "{s}"),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::Skip => write!(f, "skip"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Then => write!(f, "then"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::Fi => write!(f, "fi"),
            TokenKind::While => write!(f, "while"),
            TokenKind::Do => write!(f, "do"),
            TokenKind::Done => write!(f, "done"),
            TokenKind::Assign => write!(f, ":="),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Eq => write!(f, "="),
            TokenKind::Leq => write!(f, "<="),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::Amp => write!(f, "&"),
            TokenKind::Semi => write!(f, ";"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Eof => write!(f, "<eof>"),
        }
    }
}

/// Tokenizes `source`, returning every token including a trailing `Eof`.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0usize;
    let mut line = 1u32;
    let mut col = 1u32;

    let advance = |pos: &mut usize, line: &mut u32, col: &mut u32, n: usize| {
        for _ in 0..n {
            if bytes[*pos] == b'\n' {
                *line += 1;
                *col = 1;
            } else {
                *col += 1;
            }
            *pos += 1;
        }
    };

    while pos < bytes.len() {
        let c = bytes[pos] as char;

        if c.is_whitespace() {
            advance(&mut pos, &mut line, &mut col, 1);
            continue;
        }

        let start = pos;
        let start_line = line;
        let start_col = col;

        let kind = match c {
            '+' => {
                advance(&mut pos, &mut line, &mut col, 1);
                TokenKind::Plus
            }
            '-' => {
                advance(&mut pos, &mut line, &mut col, 1);
                TokenKind::Minus
            }
            '*' => {
                advance(&mut pos, &mut line, &mut col, 1);
                TokenKind::Star
            }
            '/' => {
                advance(&mut pos, &mut line, &mut col, 1);
                TokenKind::Slash
            }
            '=' => {
                advance(&mut pos, &mut line, &mut col, 1);
                TokenKind::Eq
            }
            '!' => {
                advance(&mut pos, &mut line, &mut col, 1);
                TokenKind::Bang
            }
            '&' => {
                advance(&mut pos, &mut line, &mut col, 1);
                TokenKind::Amp
            }
            ';' => {
                advance(&mut pos, &mut line, &mut col, 1);
                TokenKind::Semi
            }
            '(' => {
                advance(&mut pos, &mut line, &mut col, 1);
                TokenKind::LParen
            }
            ')' => {
                advance(&mut pos, &mut line, &mut col, 1);
                TokenKind::RParen
            }
            '<' => {
                if bytes.get(pos + 1) == Some(&b'=') {
                    advance(&mut pos, &mut line, &mut col, 2);
                    TokenKind::Leq
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch: c,
                        span: Span::new(start, start + 1, start_line, start_col),
                    });
                }
            }
            ':' => {
                if bytes.get(pos + 1) == Some(&b'=') {
                    advance(&mut pos, &mut line, &mut col, 2);
                    TokenKind::Assign
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch: c,
                        span: Span::new(start, start + 1, start_line, start_col),
                    });
                }
            }
            c if c.is_ascii_digit() => {
                let mut end = pos;
                while end < bytes.len() && (bytes[end] as char).is_ascii_digit() {
                    end += 1;
                }
                let text = &source[pos..end];
                let value: i64 = text.parse().map_err(|_| LexError::MalformedNumber {
                    span: Span::new(start, end, start_line, start_col),
                })?;
                let count = end - pos;
                advance(&mut pos, &mut line, &mut col, count);
                TokenKind::Num(value)
            }
            c if c.is_ascii_alphabetic() => {
                let mut end = pos;
                while end < bytes.len() && (bytes[end] as char).is_ascii_alphanumeric() {
                    end += 1;
                }
                let text = &source[pos..end];
                let kind = match text {
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    "skip" => TokenKind::Skip,
                    "if" => TokenKind::If,
                    "then" => TokenKind::Then,
                    "else" => TokenKind::Else,
                    "fi" => TokenKind::Fi,
                    "while" => TokenKind::While,
                    "do" => TokenKind::Do,
                    "done" => TokenKind::Done,
                    _ => TokenKind::Ident(text.to_string()),
                };
                let count = end - pos;
                advance(&mut pos, &mut line, &mut col, count);
                kind
            }
            other => {
                return Err(LexError::UnexpectedChar {
                    ch: other,
                    span: Span::new(start, start + 1, start_line, start_col),
                });
            }
        };

        tokens.push(Token {
            kind,
            span: Span::new(start, pos, start_line, start_col),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(pos, pos, line, col),
    });

    Ok(tokens)
}
