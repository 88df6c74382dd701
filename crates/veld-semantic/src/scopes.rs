//! Underlying semantic scopes.
//!
//! A semantic scope is an ordered name table computed from the tree: the
//! members of a class, the top-level declarations of a package, the imports
//! of a file, the locals of a block. Scopes live in a `ScopeStore` owned by
//! the `SemanticDb`; computed scopes are memoized there and may be reclaimed
//! by `sweep` unless pinned by a client that still references them.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use veld_common::Atom;

use crate::node::NodeId;

/// Index of a semantic scope in a `ScopeStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemScopeId(pub u32);

/// The closed set of semantic scope shapes.
///
/// Adding a variant here is intentionally a compile error in every consumer
/// that classifies scopes; name resolution must never mis-wrap an unknown
/// shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemScopeKind {
    /// Explicit-name (non-star) imports of a file.
    ExplicitImports,
    /// Wildcard imports of a file; entries point at packages.
    StarImports,
    /// Top-level declarations of a package.
    PackageMembers,
    /// Any other name-enumerable declaration list (members, params, locals).
    Declarations,
    /// Type parameters of a generic declaration.
    TypeParams,
}

/// One semantic scope: an insertion-ordered map from name to the
/// declarations bound to it, innermost declaration first.
#[derive(Debug, Clone)]
pub struct SemScopeData {
    pub kind: SemScopeKind,
    pub owner: NodeId,
    entries: IndexMap<Atom, SmallVec<[NodeId; 2]>>,
}

impl SemScopeData {
    pub fn new(kind: SemScopeKind, owner: NodeId) -> Self {
        Self {
            kind,
            owner,
            entries: IndexMap::new(),
        }
    }

    pub fn add(&mut self, name: Atom, node: NodeId) {
        self.entries.entry(name).or_default().push(node);
    }

    /// Whether `name` is already bound (used for override shadowing).
    pub fn binds(&self, name: Atom) -> bool {
        self.entries.contains_key(&name)
    }

    /// First declaration bound to `name`, if any.
    pub fn lookup(&self, name: Atom) -> Option<NodeId> {
        self.entries.get(&name).and_then(|nodes| nodes.first().copied())
    }

    pub fn names(&self) -> impl Iterator<Item = Atom> + '_ {
        self.entries.keys().copied()
    }

    /// All declarations, in insertion order.
    pub fn members(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.values().flat_map(|nodes| nodes.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owning store of semantic scopes plus the memo tables for computed ones.
///
/// `sweep` models reclamation of computed resolution state: every scope not
/// pinned by a client is dropped, and memo entries pointing at dropped
/// scopes are forgotten so a later query recomputes them.
#[derive(Debug, Default)]
pub struct ScopeStore {
    scopes: Vec<Option<SemScopeData>>,
    pinned: FxHashSet<SemScopeId>,
    member_scopes: FxHashMap<NodeId, SemScopeId>,
    declared_scopes: FxHashMap<NodeId, SemScopeId>,
    package_scopes: FxHashMap<NodeId, SemScopeId>,
}

impl ScopeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, data: SemScopeData) -> SemScopeId {
        let id = SemScopeId(self.scopes.len() as u32);
        self.scopes.push(Some(data));
        id
    }

    pub fn get(&self, id: SemScopeId) -> Option<&SemScopeData> {
        self.scopes.get(id.0 as usize).and_then(|slot| slot.as_ref())
    }

    /// Exempt a scope from `sweep`. Idempotent.
    pub fn pin(&mut self, id: SemScopeId) {
        self.pinned.insert(id);
    }

    pub fn is_pinned(&self, id: SemScopeId) -> bool {
        self.pinned.contains(&id)
    }

    pub fn member_scope_memo(&self, class: NodeId) -> Option<SemScopeId> {
        self.member_scopes.get(&class).copied()
    }

    pub fn memoize_member_scope(&mut self, class: NodeId, id: SemScopeId) {
        self.member_scopes.insert(class, id);
    }

    pub fn declared_scope_memo(&self, class: NodeId) -> Option<SemScopeId> {
        self.declared_scopes.get(&class).copied()
    }

    pub fn memoize_declared_scope(&mut self, class: NodeId, id: SemScopeId) {
        self.declared_scopes.insert(class, id);
    }

    pub fn package_scope_memo(&self, package: NodeId) -> Option<SemScopeId> {
        self.package_scopes.get(&package).copied()
    }

    pub fn memoize_package_scope(&mut self, package: NodeId, id: SemScopeId) {
        self.package_scopes.insert(package, id);
    }

    /// Drop every unpinned scope and forget memo entries that pointed at one.
    pub fn sweep(&mut self) {
        for (i, slot) in self.scopes.iter_mut().enumerate() {
            if slot.is_some() && !self.pinned.contains(&SemScopeId(i as u32)) {
                *slot = None;
            }
        }
        let pinned = &self.pinned;
        self.member_scopes.retain(|_, id| pinned.contains(id));
        self.declared_scopes.retain(|_, id| pinned.contains(id));
        self.package_scopes.retain(|_, id| pinned.contains(id));
    }
}
