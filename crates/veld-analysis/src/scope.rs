//! Scope wrappers.
//!
//! A `Scope` is a queryable collection of the symbols reachable at some
//! point. Non-composite variants wrap exactly one underlying semantic scope
//! (held as an id; the semantic database owns the data). The composite
//! variant is an ordered union with first-match-wins lookup — order is
//! significant and encodes shadowing.
//!
//! The variant set is closed on purpose: classifying an underlying scope
//! happens in one exhaustive match (see `provider`), so a new underlying
//! scope shape is a compile error here, not a silent mis-wrap.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use veld_common::Atom;
use veld_semantic::SemScopeId;

use crate::error::AnalysisResult;
use crate::symbol::Symbol;
use crate::symbol_builder::SymbolBuilder;
use crate::token::ValidityToken;

/// Discriminant of a scope wrapper, for callers that branch on shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Member,
    DeclaredMember,
    Package,
    Import { star: bool },
    Local,
    Delegating,
    Composite,
}

/// Shared state of every non-composite wrapper: the symbol factory (which
/// carries the session) and the underlying scope id.
pub(crate) struct ScopeInner {
    builder: Rc<SymbolBuilder>,
    sem: SemScopeId,
}

pub enum Scope {
    /// All members of a class, inherited included.
    Member(ScopeInner),
    /// Members declared directly on a class.
    DeclaredMember(ScopeInner),
    /// Top-level declarations of a package.
    Package(ScopeInner),
    /// Imports of a file; star imports resolve through package scopes.
    Import { inner: ScopeInner, star: bool },
    /// Locals of one block.
    Local(ScopeInner),
    /// Generic wrapper over any other name-enumerable scope.
    Delegating(ScopeInner),
    /// Ordered union; lookup scans parts in order and stops at the first
    /// match.
    Composite {
        token: ValidityToken,
        parts: Vec<Rc<Scope>>,
    },
}

impl Scope {
    pub(crate) fn member(builder: Rc<SymbolBuilder>, sem: SemScopeId) -> Self {
        Scope::Member(ScopeInner { builder, sem })
    }

    pub(crate) fn declared_member(builder: Rc<SymbolBuilder>, sem: SemScopeId) -> Self {
        Scope::DeclaredMember(ScopeInner { builder, sem })
    }

    pub(crate) fn package(builder: Rc<SymbolBuilder>, sem: SemScopeId) -> Self {
        Scope::Package(ScopeInner { builder, sem })
    }

    pub(crate) fn import(builder: Rc<SymbolBuilder>, sem: SemScopeId, star: bool) -> Self {
        Scope::Import {
            inner: ScopeInner { builder, sem },
            star,
        }
    }

    pub(crate) fn local(builder: Rc<SymbolBuilder>, sem: SemScopeId) -> Self {
        Scope::Local(ScopeInner { builder, sem })
    }

    pub(crate) fn delegating(builder: Rc<SymbolBuilder>, sem: SemScopeId) -> Self {
        Scope::Delegating(ScopeInner { builder, sem })
    }

    pub(crate) fn composite(token: ValidityToken, parts: Vec<Rc<Scope>>) -> Self {
        Scope::Composite { token, parts }
    }

    pub fn kind(&self) -> AnalysisResult<ScopeKind> {
        self.token().ensure_current()?;
        Ok(self.raw_kind())
    }

    /// The wrapped underlying scope id; `None` for composites.
    pub fn underlying(&self) -> AnalysisResult<Option<SemScopeId>> {
        self.token().ensure_current()?;
        Ok(self.inner().map(|inner| inner.sem))
    }

    /// Ordered parts of a composite scope; `None` otherwise.
    pub fn parts(&self) -> AnalysisResult<Option<&[Rc<Scope>]>> {
        self.token().ensure_current()?;
        Ok(match self {
            Scope::Composite { parts, .. } => Some(parts.as_slice()),
            _ => None,
        })
    }

    // Token-free variant for `Debug`; never exposed.
    fn raw_kind(&self) -> ScopeKind {
        match self {
            Scope::Member(_) => ScopeKind::Member,
            Scope::DeclaredMember(_) => ScopeKind::DeclaredMember,
            Scope::Package(_) => ScopeKind::Package,
            Scope::Import { star, .. } => ScopeKind::Import { star: *star },
            Scope::Local(_) => ScopeKind::Local,
            Scope::Delegating(_) => ScopeKind::Delegating,
            Scope::Composite { .. } => ScopeKind::Composite,
        }
    }

    fn inner(&self) -> Option<&ScopeInner> {
        match self {
            Scope::Member(inner)
            | Scope::DeclaredMember(inner)
            | Scope::Package(inner)
            | Scope::Import { inner, .. }
            | Scope::Local(inner)
            | Scope::Delegating(inner) => Some(inner),
            Scope::Composite { .. } => None,
        }
    }

    fn token(&self) -> &ValidityToken {
        match self {
            Scope::Composite { token, .. } => token,
            Scope::Member(inner)
            | Scope::DeclaredMember(inner)
            | Scope::Package(inner)
            | Scope::Import { inner, .. }
            | Scope::Local(inner)
            | Scope::Delegating(inner) => &inner.builder.core().token,
        }
    }

    /// First symbol bound to `name`, scanning composite parts in order.
    pub fn lookup(&self, name: &str) -> AnalysisResult<Option<Rc<Symbol>>> {
        self.token().ensure_current()?;
        match self {
            Scope::Composite { parts, .. } => {
                for part in parts {
                    if let Some(symbol) = part.lookup(name)? {
                        return Ok(Some(symbol));
                    }
                }
                Ok(None)
            }
            Scope::Import { inner, star: true } => inner.star_lookup(name),
            Scope::Member(inner)
            | Scope::DeclaredMember(inner)
            | Scope::Package(inner)
            | Scope::Import { inner, star: false }
            | Scope::Local(inner)
            | Scope::Delegating(inner) => inner.flat_lookup(name),
        }
    }

    /// All names visible through this scope, shadowed duplicates removed
    /// (first occurrence wins).
    pub fn names(&self) -> AnalysisResult<Vec<Atom>> {
        self.token().ensure_current()?;
        match self {
            Scope::Composite { parts, .. } => {
                let mut seen = FxHashSet::default();
                let mut names = Vec::new();
                for part in parts {
                    for name in part.names()? {
                        if seen.insert(name) {
                            names.push(name);
                        }
                    }
                }
                Ok(names)
            }
            Scope::Import { inner, star: true } => inner.star_names(),
            Scope::Member(inner)
            | Scope::DeclaredMember(inner)
            | Scope::Package(inner)
            | Scope::Import { inner, star: false }
            | Scope::Local(inner)
            | Scope::Delegating(inner) => Ok(inner.flat_names()),
        }
    }

    /// All symbols visible through this scope. Shadowing applies to
    /// enumeration the same way it applies to `lookup` and `names`: a name
    /// bound by an earlier part hides every later binding of it.
    pub fn symbols(&self) -> AnalysisResult<Vec<Rc<Symbol>>> {
        self.token().ensure_current()?;
        match self {
            Scope::Composite { parts, .. } => {
                let mut seen: FxHashSet<Atom> = FxHashSet::default();
                let mut symbols = Vec::new();
                for part in parts {
                    for symbol in part.symbols()? {
                        match symbol.name()? {
                            Some(name) => {
                                if seen.insert(name) {
                                    symbols.push(symbol);
                                }
                            }
                            None => symbols.push(symbol),
                        }
                    }
                }
                Ok(symbols)
            }
            Scope::Import { inner, star: true } => inner.star_symbols(),
            Scope::Member(inner)
            | Scope::DeclaredMember(inner)
            | Scope::Package(inner)
            | Scope::Import { inner, star: false }
            | Scope::Local(inner)
            | Scope::Delegating(inner) => inner.flat_symbols(),
        }
    }
}

impl ScopeInner {
    fn flat_lookup(&self, name: &str) -> AnalysisResult<Option<Rc<Symbol>>> {
        let db = &self.builder.core().db;
        // A name never interned cannot be bound anywhere.
        let Some(atom) = db.lookup_atom(name) else {
            return Ok(None);
        };
        match db.scope_lookup(self.sem, atom) {
            Some(node) => Ok(Some(self.builder.symbol(node)?)),
            None => Ok(None),
        }
    }

    fn flat_names(&self) -> Vec<Atom> {
        self.builder.core().db.scope_names(self.sem)
    }

    fn flat_symbols(&self) -> AnalysisResult<Vec<Rc<Symbol>>> {
        let db = &self.builder.core().db;
        db.scope_members(self.sem)
            .into_iter()
            .map(|node| self.builder.symbol(node))
            .collect()
    }

    /// Star-import resolution walks the imported packages in import order,
    /// consulting each package's member scope.
    fn star_lookup(&self, name: &str) -> AnalysisResult<Option<Rc<Symbol>>> {
        let db = &self.builder.core().db;
        let Some(atom) = db.lookup_atom(name) else {
            return Ok(None);
        };
        for package in db.scope_members(self.sem) {
            if let Some(scope) = db.package_member_scope(package)
                && let Some(node) = db.scope_lookup(scope, atom)
            {
                return Ok(Some(self.builder.symbol(node)?));
            }
        }
        Ok(None)
    }

    fn star_names(&self) -> AnalysisResult<Vec<Atom>> {
        let db = &self.builder.core().db;
        let mut seen = FxHashSet::default();
        let mut names = Vec::new();
        for package in db.scope_members(self.sem) {
            if let Some(scope) = db.package_member_scope(package) {
                for name in db.scope_names(scope) {
                    if seen.insert(name) {
                        names.push(name);
                    }
                }
            }
        }
        Ok(names)
    }

    fn star_symbols(&self) -> AnalysisResult<Vec<Rc<Symbol>>> {
        let db = &self.builder.core().db;
        let mut symbols = Vec::new();
        for package in db.scope_members(self.sem) {
            if let Some(scope) = db.package_member_scope(package) {
                for node in db.scope_members(scope) {
                    symbols.push(self.builder.symbol(node)?);
                }
            }
        }
        Ok(symbols)
    }
}

// No token check here; it must be safe to format a stale scope in logs.
impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Scope");
        s.field("kind", &self.raw_kind());
        if let Some(inner) = self.inner() {
            s.field("underlying", &inner.sem.0);
        }
        if let Scope::Composite { parts, .. } = self {
            s.field("parts", &parts.len());
        }
        s.finish()
    }
}
