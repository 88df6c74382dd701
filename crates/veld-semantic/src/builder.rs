//! Programmatic construction of semantic trees.
//!
//! A front end (or a test) builds the resolved tree directly: packages hold
//! files, files hold declarations and imports, functions hold params and
//! blocks, blocks hold locals. `finish` hands the tree to a `SemanticDb`.
//!
//! Container nodes take explicit spans so position-based queries
//! (`enclosing_function`, block nesting) see realistic nesting; spans of
//! siblings are expected to be disjoint and spans of children contained in
//! their parent's.

use veld_common::{Interner, Span};

use crate::db::SemanticDb;
use crate::node::{Node, NodeArena, NodeId, NodeKind, node_flags};
use crate::types::{TypeId, TypeTable};

pub struct TreeBuilder {
    arena: NodeArena,
    interner: Interner,
    types: TypeTable,
    packages: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            interner: Interner::new(),
            types: TypeTable::new(),
            packages: Vec::new(),
        }
    }

    fn alloc(
        &mut self,
        kind: NodeKind,
        name: Option<&str>,
        parent: NodeId,
        span: Option<Span>,
        flags: u32,
        target: NodeId,
        ty: Option<TypeId>,
    ) -> NodeId {
        let name = name.map(|n| self.interner.intern(n));
        let id = self.arena.alloc(Node {
            kind,
            name,
            parent,
            span,
            flags,
            target,
            ty,
            children: Vec::new(),
        });
        if let Some(parent_node) = self.arena.get_mut(parent) {
            parent_node.children.push(id);
        }
        id
    }

    pub fn package(&mut self, name: &str) -> NodeId {
        let id = self.alloc(NodeKind::Package, Some(name), NodeId::NONE, None, 0, NodeId::NONE, None);
        self.packages.push(id);
        id
    }

    pub fn file(&mut self, package: NodeId, name: &str, span: Span) -> NodeId {
        debug_assert_eq!(self.kind_of(package), Some(NodeKind::Package));
        self.alloc(NodeKind::File, Some(name), package, Some(span), 0, NodeId::NONE, None)
    }

    pub fn class(
        &mut self,
        parent: NodeId,
        name: &str,
        superclass: Option<NodeId>,
        span: Span,
    ) -> NodeId {
        let target = superclass.unwrap_or(NodeId::NONE);
        debug_assert!(target.is_none() || self.kind_of(target) == Some(NodeKind::Class));
        self.alloc(NodeKind::Class, Some(name), parent, Some(span), 0, target, None)
    }

    pub fn field(
        &mut self,
        class: NodeId,
        name: &str,
        ty: Option<TypeId>,
        mutable: bool,
        span: Span,
    ) -> NodeId {
        debug_assert_eq!(self.kind_of(class), Some(NodeKind::Class));
        let flags = if mutable { node_flags::MUTABLE } else { 0 };
        self.alloc(NodeKind::Field, Some(name), class, Some(span), flags, NodeId::NONE, ty)
    }

    pub fn method(&mut self, class: NodeId, name: &str, span: Span) -> NodeId {
        debug_assert_eq!(self.kind_of(class), Some(NodeKind::Class));
        self.alloc(NodeKind::Method, Some(name), class, Some(span), 0, NodeId::NONE, None)
    }

    pub fn function(&mut self, parent: NodeId, name: &str, span: Span) -> NodeId {
        self.alloc(NodeKind::Function, Some(name), parent, Some(span), 0, NodeId::NONE, None)
    }

    pub fn type_param(&mut self, owner: NodeId, name: &str, span: Span) -> NodeId {
        debug_assert!(matches!(
            self.kind_of(owner),
            Some(NodeKind::Function | NodeKind::Method | NodeKind::Class)
        ));
        self.alloc(NodeKind::TypeParam, Some(name), owner, Some(span), 0, NodeId::NONE, None)
    }

    pub fn param(
        &mut self,
        function: NodeId,
        name: &str,
        ty: Option<TypeId>,
        span: Span,
    ) -> NodeId {
        debug_assert!(matches!(
            self.kind_of(function),
            Some(NodeKind::Function | NodeKind::Method)
        ));
        self.alloc(NodeKind::Param, Some(name), function, Some(span), 0, NodeId::NONE, ty)
    }

    pub fn block(&mut self, parent: NodeId, span: Span) -> NodeId {
        self.alloc(NodeKind::Block, None, parent, Some(span), 0, NodeId::NONE, None)
    }

    pub fn local(
        &mut self,
        block: NodeId,
        name: &str,
        ty: Option<TypeId>,
        mutable: bool,
        span: Span,
    ) -> NodeId {
        debug_assert_eq!(self.kind_of(block), Some(NodeKind::Block));
        let flags = if mutable { node_flags::MUTABLE } else { 0 };
        self.alloc(NodeKind::Local, Some(name), block, Some(span), flags, NodeId::NONE, ty)
    }

    /// A compiler-generated local: no source span.
    pub fn synthetic_local(&mut self, block: NodeId, name: &str, ty: Option<TypeId>) -> NodeId {
        debug_assert_eq!(self.kind_of(block), Some(NodeKind::Block));
        self.alloc(
            NodeKind::Local,
            Some(name),
            block,
            None,
            node_flags::SYNTHETIC,
            NodeId::NONE,
            ty,
        )
    }

    /// An explicit-name import of `target`, optionally under an alias.
    pub fn import(
        &mut self,
        file: NodeId,
        target: NodeId,
        alias: Option<&str>,
        span: Span,
    ) -> NodeId {
        debug_assert_eq!(self.kind_of(file), Some(NodeKind::File));
        let name = match alias {
            Some(alias) => Some(alias.to_string()),
            None => self
                .arena
                .get(target)
                .and_then(|n| n.name)
                .map(|a| self.interner.resolve(a).to_string()),
        };
        self.alloc(
            NodeKind::ImportExplicit,
            name.as_deref(),
            file,
            Some(span),
            0,
            target,
            None,
        )
    }

    /// A star (wildcard) import of every top-level declaration in `package`.
    pub fn import_star(&mut self, file: NodeId, package: NodeId, span: Span) -> NodeId {
        debug_assert_eq!(self.kind_of(file), Some(NodeKind::File));
        debug_assert_eq!(self.kind_of(package), Some(NodeKind::Package));
        self.alloc(NodeKind::ImportStar, None, file, Some(span), 0, package, None)
    }

    pub fn primitive(&mut self, name: &str) -> TypeId {
        let atom = self.interner.intern(name);
        self.types.primitive(atom)
    }

    fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.arena.get(id).map(|n| n.kind)
    }

    pub fn finish(self) -> SemanticDb {
        SemanticDb::new(self.arena, self.interner, self.types, self.packages)
    }
}
