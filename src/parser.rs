//! Parse a token stream into the schema AST.
//!
//! Recursive descent over the tokens from [`crate::lexer`]. The first grammar
//! violation stops the parse; declarations completed before it are kept so the
//! analyzer can still report on them.

use crate::ast::*;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::expr::{evaluate_literal, evaluate_power};
use crate::token::{Token, TokenKind};
use thiserror::Error;

use TokenKind as K;

/// Above this many alternatives the "expecting" list is left out.
const MAX_LISTED: usize = 4;

/// Deepest allowed `struct`/`select` nesting.
pub const MAX_NESTING: usize = 256;

const DECL_START: &[TokenKind] = &[
    K::Extern,
    K::Uint8,
    K::Uint16,
    K::Uint24,
    K::Uint32,
    K::Uint64,
    K::Opaque,
    K::Ident,
    K::Enum,
    K::Struct,
    K::Select,
];

const MEMBER_START: &[TokenKind] = &[
    K::RBrace,
    K::Uint8,
    K::Uint16,
    K::Uint24,
    K::Uint32,
    K::Uint64,
    K::Opaque,
    K::Ident,
    K::Struct,
    K::Select,
];

const BODY_START: &[TokenKind] = &[
    K::Case,
    K::Semi,
    K::DigitallySigned,
    K::Uint8,
    K::Uint16,
    K::Uint24,
    K::Uint32,
    K::Uint64,
    K::Opaque,
    K::Ident,
];

const SIZE_START: &[TokenKind] = &[K::Number, K::Power, K::Ident];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("syntax error, unexpected {found}{}", expecting(.expected))]
    Unexpected {
        found: TokenKind,
        lexeme: String,
        line: usize,
        expected: Vec<TokenKind>,
    },
    #[error("syntax error, nesting deeper than {limit}")]
    TooDeep {
        found: TokenKind,
        lexeme: String,
        line: usize,
        limit: usize,
    },
}

fn expecting(expected: &[TokenKind]) -> String {
    if expected.is_empty() || expected.len() > MAX_LISTED {
        return String::new();
    }
    let names: Vec<&str> = expected.iter().map(|k| k.grammar_name()).collect();
    format!(", expecting {}", names.join(" or "))
}

impl SyntaxError {
    pub fn line(&self) -> usize {
        match self {
            SyntaxError::Unexpected { line, .. } | SyntaxError::TooDeep { line, .. } => *line,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        let message = self.to_string();
        let (SyntaxError::Unexpected { found, lexeme, line, .. }
        | SyntaxError::TooDeep { found, lexeme, line, .. }) = self;
        Diagnostic::new(DiagnosticKind::Syntax, &Token::new(found, lexeme, line), message)
    }
}

type PResult<T> = Result<T, SyntaxError>;

/// Parser output: the declarations recognized before end of input or the first
/// syntax error, and that error if there was one.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub schema: Schema,
    pub error: Option<SyntaxError>,
}

/// Parse `tokens` (which must end with an EOF token) into a schema.
pub fn parse(tokens: &[Token]) -> Parsed {
    let mut parser = Parser::new(tokens);
    let mut decls = Vec::new();
    let error = loop {
        match parser.decl() {
            Ok(decl) => decls.push(decl),
            Err(e) => break Some(e),
        }
        if parser.at(K::Eof) {
            break None;
        }
    };
    tracing::debug!(decls = decls.len(), failed = error.is_some(), "parsed");
    Parsed {
        schema: Schema { decls },
        error,
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    eof: Token,
    /// Enclosing `struct`/`select` bodies.
    depth: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        let eof = tokens.last().filter(|t| t.is(K::Eof)).cloned().unwrap_or_else(|| Token::eof(1));
        Parser {
            tokens,
            pos: 0,
            eof,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().is(kind)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn unexpected(&self, expected: &[TokenKind]) -> SyntaxError {
        let found = self.peek();
        SyntaxError::Unexpected {
            found: found.kind,
            lexeme: found.text.clone(),
            line: found.line,
            expected: expected.to_vec(),
        }
    }

    /// Consume `kind`, reporting `expected` as the alternatives on failure.
    fn expect_in(&mut self, kind: TokenKind, expected: &[TokenKind]) -> PResult<Token> {
        self.eat(kind).ok_or_else(|| self.unexpected(expected))
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        self.expect_in(kind, &[kind])
    }

    /// Run `body` one nesting level deeper, refusing past [`MAX_NESTING`].
    fn nested<T>(&mut self, body: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING {
            let found = self.peek();
            return Err(SyntaxError::TooDeep {
                found: found.kind,
                lexeme: found.text.clone(),
                line: found.line,
                limit: MAX_NESTING,
            });
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    fn decl(&mut self) -> PResult<Decl> {
        let kind = self.peek().kind;
        match kind {
            K::Extern => self.extern_decl().map(Decl::Extern),
            K::Enum => self.enum_decl().map(Decl::Enum),
            K::Struct => self.struct_decl().map(Decl::Struct),
            K::Select => self.select_decl().map(Decl::Select),
            K::Ident => self.field().map(Decl::Scalar),
            _ if kind.scalar().is_some() => self.field().map(Decl::Scalar),
            _ => Err(self.unexpected(DECL_START)),
        }
    }

    fn extern_decl(&mut self) -> PResult<ExternDecl> {
        self.expect(K::Extern)?;
        let name = self.expect(K::Ident)?;
        let end = self.expect(K::Semi)?;
        Ok(ExternDecl { name, end })
    }

    /// `IDENT ('.' IDENT)*`
    fn name(&mut self) -> PResult<Name> {
        let first = self.expect(K::Ident)?;
        let mut name = Name::simple(first);
        while self.eat(K::Dot).is_some() {
            let next = self.expect(K::Ident)?;
            name.segments.push(next.text);
        }
        Ok(name)
    }

    fn type_ref(&mut self) -> PResult<TypeRef> {
        if let Some(scalar) = self.peek().kind.scalar() {
            self.bump();
            return Ok(TypeRef::Scalar(scalar));
        }
        self.name().map(TypeRef::Named)
    }

    fn field(&mut self) -> PResult<Field> {
        let ty = self.type_ref()?;
        let name = self.expect(K::Ident)?;
        let bounds = self.bounds()?;
        let end = if bounds.is_some() {
            self.expect(K::Semi)?
        } else {
            self.expect_in(K::Semi, &[K::Semi, K::LBracket, K::Lt])?
        };
        Ok(Field { ty, name, bounds, end })
    }

    fn bounds(&mut self) -> PResult<Option<Bounds>> {
        if self.eat(K::LBracket).is_some() {
            let size = self.size()?;
            self.expect(K::RBracket)?;
            return Ok(Some(Bounds::Fixed(size)));
        }
        if self.eat(K::Lt).is_some() {
            let lo = self.size()?;
            self.expect(K::DotDot)?;
            let hi = self.size()?;
            self.expect(K::Gt)?;
            return Ok(Some(Bounds::Range { lo, hi }));
        }
        Ok(None)
    }

    fn size(&mut self) -> PResult<SizeExpr> {
        match self.peek().kind {
            K::Number => Ok(SizeExpr::Literal(self.number()?)),
            K::Power => {
                let token = self.bump();
                let evaluated = evaluate_power(&token.text);
                Ok(SizeExpr::Power(Number { evaluated, token }))
            }
            K::Ident => self.name().map(SizeExpr::Reference),
            _ => Err(self.unexpected(SIZE_START)),
        }
    }

    fn enum_decl(&mut self) -> PResult<EnumDecl> {
        self.expect(K::Enum)?;
        self.expect(K::LBrace)?;

        let first = self.expect(K::Ident)?;
        // The first entry decides whether every entry carries a value.
        let valued = self.at(K::LParen);
        let mut entries = vec![self.enum_entry(first, valued)?];
        let mut max = None;
        loop {
            if self.eat(K::Comma).is_some() {
                if self.at(K::LParen) {
                    max = Some(self.paren_number()?);
                    self.expect(K::RBrace)?;
                    break;
                }
                let name = self.expect_in(K::Ident, &[K::Ident, K::LParen])?;
                entries.push(self.enum_entry(name, valued)?);
            } else {
                self.expect_in(K::RBrace, &[K::Comma, K::RBrace])?;
                break;
            }
        }

        let name = self.expect(K::Ident)?;
        let end = self.expect(K::Semi)?;
        Ok(EnumDecl {
            entries,
            max,
            name,
            end,
        })
    }

    fn enum_entry(&mut self, name: Token, valued: bool) -> PResult<EnumEntry> {
        let value = if valued {
            Some(self.paren_number()?)
        } else {
            None
        };
        Ok(EnumEntry { name, value })
    }

    fn number(&mut self) -> PResult<Number> {
        let token = self.expect(K::Number)?;
        let evaluated = evaluate_literal(&token.text);
        Ok(Number { evaluated, token })
    }

    /// `'(' NUMBER ')'`
    fn paren_number(&mut self) -> PResult<Number> {
        self.expect(K::LParen)?;
        let number = self.number()?;
        self.expect(K::RParen)?;
        Ok(number)
    }

    fn struct_decl(&mut self) -> PResult<StructDecl> {
        self.nested(Self::struct_body)
    }

    fn struct_body(&mut self) -> PResult<StructDecl> {
        self.expect(K::Struct)?;
        self.expect(K::LBrace)?;
        let mut members = Vec::new();
        while !self.at(K::RBrace) {
            members.push(self.member()?);
        }
        self.expect(K::RBrace)?;
        let name = self.expect(K::Ident)?;
        let end = self.expect(K::Semi)?;
        Ok(StructDecl { members, name, end })
    }

    fn member(&mut self) -> PResult<Member> {
        let kind = self.peek().kind;
        match kind {
            K::Struct => self.struct_decl().map(Member::Struct),
            K::Select => self.select_decl().map(Member::Select),
            K::Ident => self.field().map(Member::Field),
            _ if kind.scalar().is_some() => self.field().map(Member::Field),
            _ => Err(self.unexpected(MEMBER_START)),
        }
    }

    fn select_decl(&mut self) -> PResult<SelectDecl> {
        self.nested(Self::select_body)
    }

    fn select_body(&mut self) -> PResult<SelectDecl> {
        self.expect(K::Select)?;
        self.expect(K::LParen)?;
        let selector = self.name()?;
        self.expect(K::RParen)?;
        let open = self.expect(K::LBrace)?;

        let mut cases = Vec::new();
        loop {
            cases.push(self.case()?);
            if self.at(K::Case) {
                continue;
            }
            if self.at(K::RBrace) {
                break;
            }
            return Err(self.unexpected(&[K::Case, K::RBrace]));
        }
        self.expect(K::RBrace)?;

        let name = self.eat(K::Ident);
        let end = if name.is_some() {
            self.expect(K::Semi)?
        } else {
            self.expect_in(K::Semi, &[K::Ident, K::Semi])?
        };
        Ok(SelectDecl {
            selector,
            open,
            cases,
            name,
            end,
        })
    }

    /// `('case' IDENT ':')+ body`
    fn case(&mut self) -> PResult<Case> {
        let mut labels = Vec::new();
        loop {
            self.expect(K::Case)?;
            let name = self.expect(K::Ident)?;
            let colon = self.expect(K::Colon)?;
            labels.push(CaseLabel { name, colon });
            if !self.at(K::Case) {
                break;
            }
        }

        let mut body = Vec::new();
        let kind = self.peek().kind;
        match kind {
            K::Semi => {
                self.bump();
            }
            K::DigitallySigned => {
                self.bump();
                let name = self.name()?;
                let end = self.expect(K::Semi)?;
                body.push(CaseItem {
                    signed: true,
                    ty: TypeRef::Named(name),
                    name: None,
                    bounds: None,
                    end,
                });
                // Only a named type may follow the signed clause.
                if self.at(K::Ident) {
                    body.push(self.case_item()?);
                }
            }
            K::Ident => body.push(self.case_item()?),
            _ if kind.scalar().is_some() => body.push(self.case_item()?),
            _ => return Err(self.unexpected(BODY_START)),
        }

        let follow = self.peek().clone();
        Ok(Case {
            labels,
            body,
            follow,
        })
    }

    fn case_item(&mut self) -> PResult<CaseItem> {
        let ty = self.type_ref()?;
        let name = self.eat(K::Ident);
        let bounds = if name.is_some() { self.bounds()? } else { None };
        let end = match (&name, &bounds) {
            (None, _) => self.expect_in(K::Semi, &[K::Ident, K::Semi])?,
            (Some(_), None) => self.expect_in(K::Semi, &[K::Semi, K::LBracket, K::Lt])?,
            (Some(_), Some(_)) => self.expect(K::Semi)?,
        };
        Ok(CaseItem {
            signed: false,
            ty,
            name,
            bounds,
            end,
        })
    }
}
