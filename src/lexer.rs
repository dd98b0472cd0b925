//! Tokenize schema source using the PEST token grammar.
//!
//! Block comments nest to any depth, so they are blanked out by an iterative scan
//! first (newlines kept, so lines do not move). The grammar (`grammar.pest`) then
//! splits the rest into trivia and tokens; this module classifies the token pairs
//! and attaches line numbers. An unterminated block comment is the only lexical
//! failure and stops tokenization outright.

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::token::{Token, TokenKind};
use pest::Parser;
use pest_derive::Parser as PestParser;
use thiserror::Error;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct SchemaLexer;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("EOF in comment")]
    EofInComment { line: usize },
    /// The token grammar rejected the input. The catch-all `unknown` rule accepts any
    /// character, so this only carries failures from pest itself.
    #[error("{message}")]
    Grammar { line: usize, message: String },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            LexError::EofInComment { line } | LexError::Grammar { line, .. } => *line,
        }
    }

    /// Lexical errors are anchored at end of input, so the token text is empty.
    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Lexical, &Token::eof(self.line()), self.to_string())
    }
}

/// Line reached at end of input: one plus the number of newlines.
fn eof_line(source: &str) -> usize {
    source.bytes().filter(|&b| b == b'\n').count() + 1
}

/// Replace block comments with spaces, keeping newlines. Line comments outside a
/// block are copied through for the grammar, so a `/*` inside one opens nothing.
fn mask_block_comments(source: &str) -> Result<String, LexError> {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut depth = 0usize;
    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        if depth == 0 {
            match (c, next) {
                ('/', Some('/')) => {
                    out.push(c);
                    while let Some(&rest) = chars.peek() {
                        if rest == '\n' {
                            break;
                        }
                        out.push(rest);
                        chars.next();
                    }
                }
                ('/', Some('*')) => {
                    chars.next();
                    depth = 1;
                    out.push_str("  ");
                }
                _ => out.push(c),
            }
        } else {
            match (c, next) {
                ('/', Some('*')) => {
                    chars.next();
                    depth += 1;
                    out.push_str("  ");
                }
                ('*', Some('/')) => {
                    chars.next();
                    depth -= 1;
                    out.push_str("  ");
                }
                ('\n', _) => out.push('\n'),
                _ => out.push(' '),
            }
        }
    }
    if depth > 0 {
        return Err(LexError::EofInComment {
            line: eof_line(source),
        });
    }
    Ok(out)
}

/// Split `source` into tokens, always terminated by a [`TokenKind::Eof`] token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let masked = mask_block_comments(source)?;
    let pairs = SchemaLexer::parse(Rule::tokens, &masked).map_err(|e| {
        let line = match e.line_col {
            pest::error::LineColLocation::Pos((line, _))
            | pest::error::LineColLocation::Span((line, _), _) => line,
        };
        LexError::Grammar {
            line,
            message: e.variant.message().into_owned(),
        }
    })?;

    let mut tokens = Vec::new();
    for pair in pairs {
        let text = pair.as_str();
        let line = pair.line_col().0;
        let kind = match pair.as_rule() {
            Rule::EOI => continue,
            Rule::ident => TokenKind::Ident,
            Rule::number => TokenKind::Number,
            Rule::power => TokenKind::Power,
            Rule::keyword => TokenKind::keyword(text).unwrap_or(TokenKind::Ident),
            Rule::dotdot => TokenKind::DotDot,
            Rule::punct => TokenKind::punct(text).unwrap_or(TokenKind::Unknown),
            _ => TokenKind::Unknown,
        };
        tokens.push(Token::new(kind, text, line));
    }
    tokens.push(Token::eof(eof_line(source)));
    tracing::debug!(count = tokens.len(), "tokenized");
    Ok(tokens)
}
