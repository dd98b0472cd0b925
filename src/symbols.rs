//! Symbol table: scopes of declared names and the arena of type definitions.
//!
//! Named declarations live in [`TypeArena`] and are referenced through [`TypeId`]
//! handles, so structs that mention earlier structs never own each other.

use crate::ast::ScalarType;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Top-level declaration with a scalar type (`uint8 f;`).
    Scalar,
    /// Top-level declaration with a named type (`ProtocolVersion v;`).
    Alias,
    Enum,
    Struct,
    Select,
    /// Opaque forward declaration.
    Extern,
    /// Struct member.
    Member,
    EnumValue,
    CaseLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Extern,
    Struct,
    Enum,
    Select,
    Case,
}

/// Evaluated size of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeState {
    /// No bounds declared.
    Unsized,
    /// `[n]`, or the value of an enum entry.
    Fixed(u64),
    /// `<lo..hi>`
    Range { lo: u64, hi: u64 },
    /// Depends on a reference or on a failed lookup.
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

/// What a resolved type reference points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeHandle {
    Scalar(ScalarType),
    Declared(TypeId),
    Extern(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub line: usize,
    pub size: SizeState,
    pub ty: Option<TypeHandle>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, line: usize) -> Self {
        Symbol {
            name: name.into(),
            kind,
            line,
            size: SizeState::Unsized,
            ty: None,
        }
    }

    pub fn with_size(mut self, size: SizeState) -> Self {
        self.size = size;
        self
    }

    pub fn with_type(mut self, ty: Option<TypeHandle>) -> Self {
        self.ty = ty;
        self
    }
}

/// Ordered name → symbol mapping. A name may be declared once per scope.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Name of the declaration that opened the scope; empty for global and anonymous scopes.
    pub owner: String,
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl Scope {
    pub fn new(kind: ScopeKind, owner: impl Into<String>) -> Self {
        Scope {
            kind,
            owner: owner.into(),
            symbols: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add `symbol`; returns `false` (and keeps the first declaration) when the
    /// name is already declared in this scope.
    pub fn declare(&mut self, symbol: Symbol) -> bool {
        if self.index.contains_key(&symbol.name) {
            return false;
        }
        self.index.insert(symbol.name.clone(), self.symbols.len());
        self.symbols.push(symbol);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Symbols in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Stack of nested local scopes (struct bodies); lookups search innermost first.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    pub fn current_mut(&mut self) -> Option<&mut Scope> {
        self.scopes.last_mut()
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|s| s.lookup(name))
    }
}

/// A member of a compound definition after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMember {
    pub name: Option<String>,
    /// `None` when the member's type could not be resolved.
    pub ty: Option<TypeHandle>,
    pub size: SizeState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    /// Empty for anonymous selects.
    pub name: String,
    pub kind: SymbolKind,
    pub line: usize,
    pub size: SizeState,
    /// Struct members, enum entries (with their values as `size`) or case bodies.
    pub members: Vec<ResolvedMember>,
}

/// Every type definition of a compilation, addressable by [`TypeId`]; top-level
/// names are additionally indexed by name.
#[derive(Debug, Clone, Default)]
pub struct TypeArena {
    defs: Vec<TypeDef>,
    by_name: HashMap<String, TypeId>,
}

impl TypeArena {
    /// Store `def` without making it visible by name (nested or anonymous types).
    pub fn push(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId(self.defs.len());
        self.defs.push(def);
        id
    }

    /// Make `id` visible as `name`; the first binding of a name wins.
    pub fn bind(&mut self, name: &str, id: TypeId) -> bool {
        if self.by_name.contains_key(name) {
            return false;
        }
        self.by_name.insert(name.to_string(), id);
        true
    }

    pub fn get(&self, id: TypeId) -> &TypeDef {
        &self.defs[id.0]
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
