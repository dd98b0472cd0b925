//! Semantic analysis: symbol registration, reference resolution and value checks.
//!
//! Runs in two phases. The first registers every `extern` name so externs are
//! visible to all declarations regardless of order. The second walks declarations
//! in source order, reporting each problem at the token where the declaration
//! that exposes it ends, and never stops at the first error.
//!
//! Externs have their own namespace: an extern never clashes with a declaration
//! of the same name, but a repeated extern is a duplicate.

use crate::ast::*;
use crate::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics, DOTTED_NOTE};
use crate::symbols::*;
use crate::token::Token;
use crate::CompileOptions;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Where a name is used as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueUse {
    /// Array or range bound: needs a scalar value.
    Size,
    /// `select (..)`: a scalar value or an enum.
    Selector,
}

/// Symbol tables produced by analysis.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub types: TypeArena,
    pub globals: Scope,
    pub externs: Scope,
}

impl Resolution {
    /// Definition of a top-level named type.
    pub fn lookup(&self, name: &str) -> Option<&TypeDef> {
        self.types.lookup(name).map(|id| self.types.get(id))
    }

    pub fn is_extern(&self, name: &str) -> bool {
        self.externs.contains(name)
    }
}

/// Analyze `schema`, appending findings to `diags`.
pub fn analyze(schema: &Schema, options: &CompileOptions, diags: &mut Diagnostics) -> Resolution {
    let before = diags.len();
    let mut analyzer = Analyzer::new(options, diags);
    analyzer.register_externs(schema);
    for decl in &schema.decls {
        analyzer.decl(decl);
    }
    let resolution = analyzer.finish();
    debug!(
        types = resolution.types.len(),
        externs = resolution.externs.len(),
        errors = diags.len() - before,
        "analyzed"
    );
    resolution
}

struct Analyzer<'a> {
    diags: &'a mut Diagnostics,
    dotted_note_once: bool,
    dotted_noted: bool,
    externs: Scope,
    /// Externs reached by the ordered walk.
    externs_seen: HashSet<String>,
    globals: Scope,
    locals: ScopeStack,
    types: TypeArena,
}

impl<'a> Analyzer<'a> {
    fn new(options: &CompileOptions, diags: &'a mut Diagnostics) -> Self {
        Analyzer {
            diags,
            dotted_note_once: options.dotted_note_once,
            dotted_noted: false,
            externs: Scope::new(ScopeKind::Extern, ""),
            externs_seen: HashSet::new(),
            globals: Scope::new(ScopeKind::Global, ""),
            locals: ScopeStack::default(),
            types: TypeArena::default(),
        }
    }

    fn finish(self) -> Resolution {
        Resolution {
            types: self.types,
            globals: self.globals,
            externs: self.externs,
        }
    }

    fn register_externs(&mut self, schema: &Schema) {
        for decl in &schema.decls {
            if let Decl::Extern(e) = decl {
                let symbol = Symbol::new(&e.name.text, SymbolKind::Extern, e.name.line)
                    .with_size(SizeState::Unresolved)
                    .with_type(Some(TypeHandle::Extern(e.name.text.clone())));
                // Repeats are reported by the ordered walk.
                self.externs.declare(symbol);
            }
        }
    }

    /// Report a failed lookup of `name`, adding the dotted-name note when it applies.
    fn unresolved(&mut self, at: &Token, message: String, name: &Name) {
        let mut diagnostic = Diagnostic::new(DiagnosticKind::Semantic, at, message);
        if name.is_dotted() && !(self.dotted_note_once && self.dotted_noted) {
            self.dotted_noted = true;
            diagnostic = diagnostic.with_note(DOTTED_NOTE);
        }
        self.diags.push(diagnostic);
    }

    fn resolve_type(&self, ty: &TypeRef) -> Option<TypeHandle> {
        match ty {
            TypeRef::Scalar(s) => Some(TypeHandle::Scalar(*s)),
            TypeRef::Named(name) if name.is_dotted() => None,
            TypeRef::Named(name) => {
                let simple = &name.segments[0];
                if let Some(id) = self.types.lookup(simple) {
                    Some(TypeHandle::Declared(id))
                } else if self.externs.contains(simple) {
                    Some(TypeHandle::Extern(simple.clone()))
                } else {
                    None
                }
            }
        }
    }

    /// Whether `name` denotes a value usable as `usage`. Struct members shadow globals.
    fn resolves_to_value(&self, name: &Name, usage: ValueUse) -> bool {
        if name.is_dotted() {
            return false;
        }
        let simple = &name.segments[0];
        if self.externs.contains(simple) {
            return true;
        }
        let Some(symbol) = self
            .locals
            .lookup(simple)
            .or_else(|| self.globals.lookup(simple))
        else {
            return false;
        };
        match symbol.kind {
            SymbolKind::Enum => usage == ValueUse::Selector,
            SymbolKind::Scalar | SymbolKind::Alias | SymbolKind::Member => {
                self.is_value_type(symbol.ty.as_ref())
            }
            _ => false,
        }
    }

    /// Whether values of type `ty` are numbers. Unresolved types count, since
    /// their failure is already reported.
    fn is_value_type(&self, ty: Option<&TypeHandle>) -> bool {
        match ty {
            None | Some(TypeHandle::Scalar(_)) | Some(TypeHandle::Extern(_)) => true,
            Some(TypeHandle::Declared(id)) => {
                let def = self.types.get(*id);
                match def.kind {
                    SymbolKind::Scalar | SymbolKind::Enum => true,
                    SymbolKind::Alias => {
                        self.is_value_type(def.members.first().and_then(|m| m.ty.as_ref()))
                    }
                    _ => false,
                }
            }
        }
    }

    /// Value of a literal, reporting it at its token when it failed to evaluate.
    fn number(&mut self, number: &Number) -> u64 {
        if let Some(error) = number.evaluated.error {
            self.diags.push(Diagnostic::new(
                DiagnosticKind::Expression,
                &number.token,
                error.to_string(),
            ));
        }
        number.value()
    }

    fn declare_global(&mut self, name: &Token, kind: SymbolKind, size: SizeState, id: TypeId, end: &Token) {
        let symbol = Symbol::new(&name.text, kind, name.line)
            .with_size(size)
            .with_type(Some(TypeHandle::Declared(id)));
        if self.globals.declare(symbol) {
            self.types.bind(&name.text, id);
        } else {
            self.diags
                .error(end, format!("Duplicate symbol ``{}'' found", name.text));
        }
    }

    fn decl(&mut self, decl: &Decl) {
        trace!(name = decl.name().unwrap_or(""), "declaration");
        match decl {
            // Registered by the pre-pass; only repeats are reported here.
            Decl::Extern(e) => {
                if !self.externs_seen.insert(e.name.text.clone()) {
                    self.diags
                        .error(&e.end, format!("Duplicate symbol ``{}'' found", e.name.text));
                }
            }
            Decl::Scalar(field) => {
                let size = self.bounds(&field.name.text, field.bounds.as_ref(), &field.end);
                let ty = self.resolve_type(&field.ty);
                let kind = match &field.ty {
                    TypeRef::Scalar(_) => SymbolKind::Scalar,
                    TypeRef::Named(name) => {
                        if ty.is_none() {
                            self.unresolved(&field.end, format!("Unknown member type ``{}''", name), name);
                        }
                        SymbolKind::Alias
                    }
                };
                let id = self.types.push(TypeDef {
                    name: field.name.text.clone(),
                    kind,
                    line: field.name.line,
                    size,
                    members: vec![ResolvedMember { name: None, ty, size }],
                });
                self.declare_global(&field.name, kind, size, id, &field.end);
            }
            Decl::Enum(e) => {
                let id = self.enum_decl(e);
                let size = self.types.get(id).size;
                self.declare_global(&e.name, SymbolKind::Enum, size, id, &e.end);
            }
            Decl::Struct(s) => {
                let id = self.struct_decl(s);
                self.declare_global(&s.name, SymbolKind::Struct, SizeState::Unsized, id, &s.end);
            }
            Decl::Select(s) => {
                let id = self.select_decl(s);
                if let Some(name) = &s.name {
                    self.declare_global(name, SymbolKind::Select, SizeState::Unsized, id, &s.end);
                }
            }
        }
    }

    /// Evaluate and check the bounds of declaration `owner`, reporting at `end`.
    fn bounds(&mut self, owner: &str, bounds: Option<&Bounds>, end: &Token) -> SizeState {
        match bounds {
            None => SizeState::Unsized,
            Some(Bounds::Fixed(size)) => match self.size(size, end) {
                Some(0) => {
                    self.diags
                        .error(end, format!("``{}'' size (0) is not positive", owner));
                    SizeState::Fixed(0)
                }
                Some(n) => SizeState::Fixed(n),
                None => SizeState::Unresolved,
            },
            Some(Bounds::Range { lo, hi }) => {
                let lo = self.size(lo, end);
                let hi = self.size(hi, end);
                match (lo, hi) {
                    (Some(lo), Some(hi)) => {
                        if hi < lo {
                            self.diags
                                .error(end, format!("``{}'' range {} less than {}", owner, lo, hi));
                        }
                        SizeState::Range { lo, hi }
                    }
                    _ => SizeState::Unresolved,
                }
            }
        }
    }

    /// Constant value of a size expression; `None` for references.
    fn size(&mut self, size: &SizeExpr, end: &Token) -> Option<u64> {
        match size {
            SizeExpr::Literal(n) | SizeExpr::Power(n) => Some(self.number(n)),
            SizeExpr::Reference(name) => {
                if !self.resolves_to_value(name, ValueUse::Size) {
                    self.unresolved(end, format!("Unknown size reference ``{}''", name), name);
                }
                None
            }
        }
    }

    fn enum_decl(&mut self, decl: &EnumDecl) -> TypeId {
        let mut scope = Scope::new(ScopeKind::Enum, &decl.name.text);
        let mut values = Vec::with_capacity(decl.entries.len());
        let mut next = 0u64;
        for entry in &decl.entries {
            let value = match &entry.value {
                Some(number) => self.number(number),
                None => next,
            };
            next = value.saturating_add(1);
            let symbol = Symbol::new(&entry.name.text, SymbolKind::EnumValue, entry.name.line)
                .with_size(SizeState::Fixed(value));
            if !scope.declare(symbol) {
                self.diags
                    .error(&entry.name, format!("Duplicate ``{}'' in enum", entry.name.text));
            }
            values.push((&entry.name.text, value));
        }
        let max = decl.max.as_ref().map(|number| self.number(number));

        let mut assigned = HashSet::new();
        for &(name, value) in &values {
            if !assigned.insert(value) {
                self.diags
                    .error(&decl.end, format!("Enum ``{}'' duplicates value {}", name, value));
            }
            if let Some(max) = max {
                if value > max {
                    self.diags.error(
                        &decl.end,
                        format!("Value for ``{}'' is too big ({} > {})", name, value, max),
                    );
                }
            }
        }

        let size = match max {
            Some(max) => SizeState::Range { lo: 0, hi: max },
            None => SizeState::Unsized,
        };
        let members = scope
            .iter()
            .map(|s| ResolvedMember {
                name: Some(s.name.clone()),
                ty: None,
                size: s.size,
            })
            .collect();
        self.types.push(TypeDef {
            name: decl.name.text.clone(),
            kind: SymbolKind::Enum,
            line: decl.name.line,
            size,
            members,
        })
    }

    fn struct_decl(&mut self, decl: &StructDecl) -> TypeId {
        self.locals.push(Scope::new(ScopeKind::Struct, &decl.name.text));
        let mut duplicates = Vec::new();
        let mut unknown_types = Vec::new();
        let mut members = Vec::with_capacity(decl.members.len());

        for member in &decl.members {
            let (name, line, kind_ty, size) = match member {
                Member::Field(field) => {
                    let size = self.bounds(&field.name.text, field.bounds.as_ref(), &field.end);
                    let ty = self.resolve_type(&field.ty);
                    if ty.is_none() {
                        if let TypeRef::Named(name) = &field.ty {
                            unknown_types.push(name);
                        }
                    }
                    (Some(&field.name.text), field.name.line, ty, size)
                }
                Member::Struct(inner) => {
                    let id = self.struct_decl(inner);
                    (
                        Some(&inner.name.text),
                        inner.name.line,
                        Some(TypeHandle::Declared(id)),
                        SizeState::Unsized,
                    )
                }
                Member::Select(select) => {
                    let id = self.select_decl(select);
                    (
                        select.name.as_ref().map(|t| &t.text),
                        select.end.line,
                        Some(TypeHandle::Declared(id)),
                        SizeState::Unsized,
                    )
                }
            };

            if let Some(name) = name {
                let symbol = Symbol::new(name, SymbolKind::Member, line)
                    .with_size(size)
                    .with_type(kind_ty.clone());
                let declared = self
                    .locals
                    .current_mut()
                    .map(|scope| scope.declare(symbol))
                    .unwrap_or(true);
                if !declared {
                    duplicates.push(name);
                }
            }
            members.push(ResolvedMember {
                name: name.cloned(),
                ty: kind_ty,
                size,
            });
        }

        let owner = match self.locals.pop() {
            Some(scope) => {
                trace!(kind = ?scope.kind, owner = %scope.owner, members = scope.len(), "closed scope");
                scope.owner
            }
            None => decl.name.text.clone(),
        };
        for name in duplicates {
            self.diags
                .error(&decl.end, format!("Duplicate item ``{}'' in ``{}''", name, owner));
        }
        for name in unknown_types {
            self.unresolved(&decl.end, format!("Unknown member type ``{}''", name), name);
        }

        self.types.push(TypeDef {
            name: decl.name.text.clone(),
            kind: SymbolKind::Struct,
            line: decl.name.line,
            size: SizeState::Unsized,
            members,
        })
    }

    fn select_decl(&mut self, decl: &SelectDecl) -> TypeId {
        if !self.resolves_to_value(&decl.selector, ValueUse::Selector) {
            self.unresolved(
                &decl.open,
                format!("Unknown variant selector ``{}''", decl.selector),
                &decl.selector,
            );
        }

        let owner = decl.name.as_ref().map(|t| t.text.as_str()).unwrap_or("");
        let mut seen = Scope::new(ScopeKind::Select, owner);
        let mut repeated = Vec::new();
        let mut members = Vec::new();

        for case in &decl.cases {
            let mut group = Scope::new(ScopeKind::Case, owner);
            for label in &case.labels {
                let symbol = Symbol::new(&label.name.text, SymbolKind::CaseLabel, label.name.line);
                if !group.declare(symbol) {
                    self.diags
                        .error(&label.colon, format!("Duplicate case ``{}''", label.name.text));
                }
            }
            for label in group.iter() {
                if !seen.declare(label.clone()) {
                    repeated.push(label.name.clone());
                }
            }

            let mut unknown_types = Vec::new();
            for item in &case.body {
                let item_name = match &item.name {
                    Some(name) => name.text.clone(),
                    None => item.ty.to_string(),
                };
                let size = self.bounds(&item_name, item.bounds.as_ref(), &item.end);
                let ty = self.resolve_type(&item.ty);
                if ty.is_none() {
                    if let TypeRef::Named(name) = &item.ty {
                        unknown_types.push(name);
                    }
                }
                members.push(ResolvedMember {
                    name: item.name.as_ref().map(|t| t.text.clone()),
                    ty,
                    size,
                });
            }
            for name in unknown_types {
                self.unresolved(&case.follow, format!("Unknown member type ``{}''", name), name);
            }
        }

        for label in repeated {
            self.diags
                .error(&decl.end, format!("Duplicate case ``{}'' in ``{}''", label, seen.owner));
        }
        trace!(kind = ?seen.kind, owner = %seen.owner, labels = seen.len(), "closed scope");

        self.types.push(TypeDef {
            name: owner.to_string(),
            kind: SymbolKind::Select,
            line: decl.end.line,
            size: SizeState::Unsized,
            members,
        })
    }
}
