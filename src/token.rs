//! Tokens produced by the lexer and consumed by the parser.

use crate::ast::ScalarType;
use std::fmt;

/// Token classification.
///
/// Each kind has a canonical grammar name (see [`TokenKind::grammar_name`]) used in
/// `unexpected X, expecting Y` syntax errors; those names are part of the
/// diagnostic output contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Number,
    /// `2^16-1` style size literal.
    Power,

    // Keywords
    Struct,
    Enum,
    Select,
    Case,
    Extern,
    DigitallySigned,
    Opaque,
    Uint8,
    Uint16,
    Uint24,
    Uint32,
    Uint64,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Semi,
    Comma,
    Caret,
    Minus,
    Dot,
    DotDot,
    Colon,

    /// A character no token starts with.
    Unknown,
    Eof,
}

impl TokenKind {
    pub fn keyword(text: &str) -> Option<TokenKind> {
        Some(match text {
            "struct" => TokenKind::Struct,
            "enum" => TokenKind::Enum,
            "select" => TokenKind::Select,
            "case" => TokenKind::Case,
            "extern" => TokenKind::Extern,
            "digitally-signed" => TokenKind::DigitallySigned,
            "opaque" => TokenKind::Opaque,
            "uint8" => TokenKind::Uint8,
            "uint16" => TokenKind::Uint16,
            "uint24" => TokenKind::Uint24,
            "uint32" => TokenKind::Uint32,
            "uint64" => TokenKind::Uint64,
            _ => return None,
        })
    }

    pub fn punct(text: &str) -> Option<TokenKind> {
        Some(match text {
            "{" => TokenKind::LBrace,
            "}" => TokenKind::RBrace,
            "(" => TokenKind::LParen,
            ")" => TokenKind::RParen,
            "[" => TokenKind::LBracket,
            "]" => TokenKind::RBracket,
            "<" => TokenKind::Lt,
            ">" => TokenKind::Gt,
            ";" => TokenKind::Semi,
            "," => TokenKind::Comma,
            "^" => TokenKind::Caret,
            "-" => TokenKind::Minus,
            "." => TokenKind::Dot,
            ".." => TokenKind::DotDot,
            ":" => TokenKind::Colon,
            _ => return None,
        })
    }

    /// The scalar type this keyword names, if it is one of the width keywords or `opaque`.
    pub fn scalar(self) -> Option<ScalarType> {
        match self {
            TokenKind::Opaque => Some(ScalarType::Opaque),
            TokenKind::Uint8 => Some(ScalarType::Uint8),
            TokenKind::Uint16 => Some(ScalarType::Uint16),
            TokenKind::Uint24 => Some(ScalarType::Uint24),
            TokenKind::Uint32 => Some(ScalarType::Uint32),
            TokenKind::Uint64 => Some(ScalarType::Uint64),
            _ => None,
        }
    }

    pub fn grammar_name(self) -> &'static str {
        match self {
            TokenKind::Ident => "tIDENT",
            TokenKind::Number => "tNUMBER",
            TokenKind::Power => "tPOWER",
            TokenKind::Struct => "tSTRUCT",
            TokenKind::Enum => "tENUM",
            TokenKind::Select => "tSELECT",
            TokenKind::Case => "tCASE",
            TokenKind::Extern => "tEXTERN",
            TokenKind::DigitallySigned => "tDIGITALLY_SIGNED",
            TokenKind::Opaque => "tOPAQUE",
            TokenKind::Uint8 => "tUINT8",
            TokenKind::Uint16 => "tUINT16",
            TokenKind::Uint24 => "tUINT24",
            TokenKind::Uint32 => "tUINT32",
            TokenKind::Uint64 => "tUINT64",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Semi => "';'",
            TokenKind::Comma => "','",
            TokenKind::Caret => "'^'",
            TokenKind::Minus => "'-'",
            TokenKind::Dot => "'.'",
            TokenKind::DotDot => "tDOTDOT",
            TokenKind::Colon => "':'",
            TokenKind::Unknown => "$undefined",
            TokenKind::Eof => "$end",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.grammar_name())
    }
}

/// A classified lexeme with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Verbatim source text; empty for [`TokenKind::Eof`].
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
        }
    }

    pub fn eof(line: usize) -> Self {
        Token::new(TokenKind::Eof, "", line)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
