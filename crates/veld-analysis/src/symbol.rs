//! Lazily-resolved symbol wrappers.
//!
//! A `Symbol` is a handle to one resolved program entity. Construction does
//! no resolution; each attribute is pulled from the semantic tree on first
//! access and cached in place. Every accessor checks the validity token
//! first, including pure reads of already-cached fields.

use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use veld_common::{Atom, Span};
use veld_semantic::{NodeId, NodeKind, TypeId};

use crate::error::AnalysisResult;
use crate::session::SessionCore;

/// The closed set of symbol kinds this layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Local,
    Param,
    Member,
    Function,
    Class,
    Package,
}

/// Map a semantic node kind to the symbol kind wrapping it, if any.
pub(crate) fn symbol_kind_of(kind: NodeKind) -> Option<SymbolKind> {
    match kind {
        NodeKind::Local => Some(SymbolKind::Local),
        NodeKind::Param => Some(SymbolKind::Param),
        NodeKind::Field | NodeKind::Method => Some(SymbolKind::Member),
        NodeKind::Function => Some(SymbolKind::Function),
        NodeKind::Class => Some(SymbolKind::Class),
        NodeKind::Package => Some(SymbolKind::Package),
        _ => None,
    }
}

pub struct Symbol {
    core: Rc<SessionCore>,
    node: NodeId,
    kind: SymbolKind,
    name: OnceCell<Option<Atom>>,
    ty: OnceCell<TypeId>,
    mutability: OnceCell<bool>,
    origin: OnceCell<Option<Span>>,
}

impl Symbol {
    pub(crate) fn new(core: Rc<SessionCore>, node: NodeId, kind: SymbolKind) -> Self {
        Self {
            core,
            node,
            kind,
            name: OnceCell::new(),
            ty: OnceCell::new(),
            mutability: OnceCell::new(),
            origin: OnceCell::new(),
        }
    }

    /// The underlying semantic node handle. Identity of a symbol within a
    /// session.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> AnalysisResult<SymbolKind> {
        self.core.token.ensure_current()?;
        Ok(self.kind)
    }

    /// Display name; `None` for unnamed entities.
    pub fn name(&self) -> AnalysisResult<Option<Atom>> {
        self.core.token.ensure_current()?;
        Ok(*self
            .name
            .get_or_init(|| self.core.db.node(self.node).and_then(|n| n.name)))
    }

    pub fn name_text(&self) -> AnalysisResult<Option<String>> {
        Ok(self.name()?.map(|atom| self.core.db.text(atom)))
    }

    /// Declared or inferred type. Classes resolve to their instance type;
    /// declarations with no recorded type resolve to the error type.
    pub fn ty(&self) -> AnalysisResult<TypeId> {
        self.core.token.ensure_current()?;
        Ok(*self.ty.get_or_init(|| {
            let db = &self.core.db;
            if self.kind == SymbolKind::Class {
                return db
                    .class_instance_type(self.node)
                    .unwrap_or_else(|| db.error_type());
            }
            db.node(self.node)
                .and_then(|n| n.ty)
                .unwrap_or_else(|| db.error_type())
        }))
    }

    pub fn is_mutable(&self) -> AnalysisResult<bool> {
        self.core.token.ensure_current()?;
        Ok(*self.mutability.get_or_init(|| {
            self.core
                .db
                .node(self.node)
                .is_some_and(|n| n.is_mutable())
        }))
    }

    /// Originating source location; `None` for synthetic symbols.
    pub fn origin(&self) -> AnalysisResult<Option<Span>> {
        self.core.token.ensure_current()?;
        Ok(*self
            .origin
            .get_or_init(|| self.core.db.node(self.node).and_then(|n| n.span)))
    }
}

// No token check and no lazy resolution here; it must be safe to format a
// stale symbol in logs.
impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Symbol")
            .field("node", &self.node.0)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
