//! Abstract Syntax Tree for the schema language.
//!
//! Nodes keep the tokens diagnostics are anchored on (names, terminating `;`,
//! opening `{` of a select, the colon of a case label) so semantic analysis can
//! report at the same places the grammar recognized them.

use crate::expr::Evaluated;
use crate::token::Token;
use std::fmt;

/// Root: top-level declarations in source order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone)]
pub enum Decl {
    /// `uint16 f[2];`, `opaque r<0..2^8-1>;` or `Alias name;`.
    Scalar(Field),
    Extern(ExternDecl),
    Enum(EnumDecl),
    Struct(StructDecl),
    Select(SelectDecl),
}

impl Decl {
    /// Declared name, if the declaration has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Decl::Scalar(f) => Some(&f.name.text),
            Decl::Extern(e) => Some(&e.name.text),
            Decl::Enum(e) => Some(&e.name.text),
            Decl::Struct(s) => Some(&s.name.text),
            Decl::Select(s) => s.name.as_ref().map(|t| t.text.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Uint8,
    Uint16,
    Uint24,
    Uint32,
    Uint64,
    Opaque,
}

impl ScalarType {
    pub fn keyword(self) -> &'static str {
        match self {
            ScalarType::Uint8 => "uint8",
            ScalarType::Uint16 => "uint16",
            ScalarType::Uint24 => "uint24",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Opaque => "opaque",
        }
    }
}

/// A possibly dotted name such as `ProtocolVersion` or `s.size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub segments: Vec<String>,
    /// First token of the name.
    pub token: Token,
}

impl Name {
    pub fn simple(token: Token) -> Self {
        Name {
            segments: vec![token.text.clone()],
            token,
        }
    }

    pub fn is_dotted(&self) -> bool {
        self.segments.len() > 1
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

#[derive(Debug, Clone)]
pub enum TypeRef {
    Scalar(ScalarType),
    Named(Name),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(s) => f.write_str(s.keyword()),
            TypeRef::Named(n) => n.fmt(f),
        }
    }
}

/// A numeric literal and its value, evaluated at parse time.
#[derive(Debug, Clone)]
pub struct Number {
    pub evaluated: Evaluated,
    pub token: Token,
}

impl Number {
    pub fn value(&self) -> u64 {
        self.evaluated.value
    }
}

#[derive(Debug, Clone)]
pub enum SizeExpr {
    Literal(Number),
    /// `2^N[-1]`
    Power(Number),
    Reference(Name),
}

impl fmt::Display for SizeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeExpr::Literal(n) | SizeExpr::Power(n) => f.write_str(&n.token.text),
            SizeExpr::Reference(name) => name.fmt(f),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Bounds {
    /// `[n]`
    Fixed(SizeExpr),
    /// `<lo..hi>`
    Range { lo: SizeExpr, hi: SizeExpr },
}

/// A typed, named declaration: top-level scalar or struct member.
#[derive(Debug, Clone)]
pub struct Field {
    pub ty: TypeRef,
    pub name: Token,
    pub bounds: Option<Bounds>,
    /// Terminating `;`.
    pub end: Token,
}

#[derive(Debug, Clone)]
pub struct ExternDecl {
    pub name: Token,
    pub end: Token,
}

#[derive(Debug, Clone)]
pub struct EnumEntry {
    pub name: Token,
    pub value: Option<Number>,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub entries: Vec<EnumEntry>,
    /// Upper bound from a trailing `(n)` marker.
    pub max: Option<Number>,
    pub name: Token,
    pub end: Token,
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub members: Vec<Member>,
    pub name: Token,
    pub end: Token,
}

#[derive(Debug, Clone)]
pub enum Member {
    Field(Field),
    Struct(StructDecl),
    Select(SelectDecl),
}

#[derive(Debug, Clone)]
pub struct SelectDecl {
    pub selector: Name,
    /// The `{` opening the case list.
    pub open: Token,
    pub cases: Vec<Case>,
    pub name: Option<Token>,
    pub end: Token,
}

#[derive(Debug, Clone)]
pub struct CaseLabel {
    pub name: Token,
    pub colon: Token,
}

/// One case group: labels sharing a body. An empty body is the `;` statement.
#[derive(Debug, Clone)]
pub struct Case {
    pub labels: Vec<CaseLabel>,
    pub body: Vec<CaseItem>,
    /// First token after the body (`case` or `}`).
    pub follow: Token,
}

#[derive(Debug, Clone)]
pub struct CaseItem {
    /// Introduced by `digitally-signed`.
    pub signed: bool,
    pub ty: TypeRef,
    pub name: Option<Token>,
    pub bounds: Option<Bounds>,
    pub end: Token,
}
