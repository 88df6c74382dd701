//! The `SemanticDb` resolution facade.
//!
//! Owns the node arena, the scope store, and the type table for one resolved
//! program state. Answers the structural questions the analysis layer asks:
//! member scopes of classes, package scopes, member scopes of types, and the
//! lexical "tower" visible at a source position.
//!
//! Computed scopes are memoized in the `ScopeStore` and may be reclaimed by
//! `sweep_memos` unless a client pinned them via `pin_scope`.

use std::cell::RefCell;

use tracing::{debug, trace};
use veld_common::{Atom, Interner};

use crate::node::{Node, NodeArena, NodeId, NodeKind};
use crate::scopes::{ScopeStore, SemScopeData, SemScopeId, SemScopeKind};
use crate::types::{TypeData, TypeId, TypeTable};

/// Cap on upward tree walks, guarding against malformed parent links.
pub(crate) const MAX_TREE_WALK_ITERATIONS: usize = 4096;

/// One layer of the lexical tower at a position, innermost layers first.
#[derive(Debug, Clone, Copy)]
pub struct TowerElement {
    /// Implicit receiver contributed by this layer, if any.
    pub receiver: Option<TypeId>,
    /// Lookup scope contributed by this layer, if any.
    pub scope: Option<SemScopeId>,
}

/// Transient result of position-based resolution: the tower of lexical
/// layers plus the block-level scopes containing the position, both ordered
/// innermost-first. Built per query, never cached.
#[derive(Debug)]
pub struct ResolutionContext {
    pub tower: Vec<TowerElement>,
    pub local_scopes: Vec<SemScopeId>,
}

pub struct SemanticDb {
    arena: NodeArena,
    interner: RefCell<Interner>,
    scopes: RefCell<ScopeStore>,
    types: RefCell<TypeTable>,
    packages: Vec<NodeId>,
}

impl SemanticDb {
    pub fn new(
        arena: NodeArena,
        interner: Interner,
        types: TypeTable,
        packages: Vec<NodeId>,
    ) -> Self {
        Self {
            arena,
            interner: RefCell::new(interner),
            scopes: RefCell::new(ScopeStore::new()),
            types: RefCell::new(types),
            packages,
        }
    }

    // Nodes and names

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn packages(&self) -> &[NodeId] {
        &self.packages
    }

    pub fn intern(&self, text: &str) -> Atom {
        self.interner.borrow_mut().intern(text)
    }

    /// Look up an atom without inserting; names never seen cannot resolve.
    pub fn lookup_atom(&self, text: &str) -> Option<Atom> {
        self.interner.borrow().get(text)
    }

    pub fn text(&self, atom: Atom) -> String {
        self.interner.borrow().resolve(atom).to_string()
    }

    // Types

    /// The instance type of a class node.
    pub fn class_instance_type(&self, class: NodeId) -> Option<TypeId> {
        let node = self.arena.get(class)?;
        if node.kind != NodeKind::Class {
            return None;
        }
        Some(self.types.borrow_mut().class_type(class))
    }

    pub fn error_type(&self) -> TypeId {
        self.types.borrow_mut().error_type()
    }

    pub fn type_data(&self, ty: TypeId) -> Option<TypeData> {
        self.types.borrow().get(ty)
    }

    // Scope access

    pub fn scope_kind(&self, id: SemScopeId) -> Option<SemScopeKind> {
        self.scopes.borrow().get(id).map(|data| data.kind)
    }

    pub fn scope_owner(&self, id: SemScopeId) -> Option<NodeId> {
        self.scopes.borrow().get(id).map(|data| data.owner)
    }

    /// First declaration bound to `name` in the scope, if the scope is live.
    pub fn scope_lookup(&self, id: SemScopeId, name: Atom) -> Option<NodeId> {
        self.scopes.borrow().get(id).and_then(|data| data.lookup(name))
    }

    pub fn scope_names(&self, id: SemScopeId) -> Vec<Atom> {
        self.scopes
            .borrow()
            .get(id)
            .map(|data| data.names().collect())
            .unwrap_or_default()
    }

    /// All declarations of the scope, in insertion order.
    pub fn scope_members(&self, id: SemScopeId) -> Vec<NodeId> {
        self.scopes
            .borrow()
            .get(id)
            .map(|data| data.members().collect())
            .unwrap_or_default()
    }

    /// Exempt a scope from `sweep_memos`.
    pub fn pin_scope(&self, id: SemScopeId) {
        self.scopes.borrow_mut().pin(id);
    }

    pub fn is_scope_pinned(&self, id: SemScopeId) -> bool {
        self.scopes.borrow().is_pinned(id)
    }

    /// Reclaim every computed scope no client has pinned.
    pub fn sweep_memos(&self) {
        self.scopes.borrow_mut().sweep();
    }

    // Computed scopes

    /// Member scope of a class: declared members first, then inherited
    /// members walking the superclass chain, with overrides shadowing by
    /// name. Memoized per class.
    pub fn member_scope_of_class(&self, class: NodeId) -> Option<SemScopeId> {
        let node = self.arena.get(class)?;
        if node.kind != NodeKind::Class {
            return None;
        }
        if let Some(id) = self.scopes.borrow().member_scope_memo(class) {
            return Some(id);
        }
        debug!(class = class.0, "computing member scope");

        let mut data = SemScopeData::new(SemScopeKind::Declarations, class);
        let mut current = class;
        let mut iterations = 0;
        while !current.is_none() {
            iterations += 1;
            if iterations > MAX_TREE_WALK_ITERATIONS {
                break;
            }
            let Some(class_node) = self.arena.get(current) else {
                break;
            };
            // Names bound by a more-derived class shadow inherited ones,
            // but overloads within one class all enter.
            let mut added_here: Vec<Atom> = Vec::new();
            for &child in &class_node.children {
                let Some(member) = self.arena.get(child) else {
                    continue;
                };
                if !matches!(member.kind, NodeKind::Field | NodeKind::Method) {
                    continue;
                }
                let Some(name) = member.name else { continue };
                if data.binds(name) && !added_here.contains(&name) {
                    continue;
                }
                data.add(name, child);
                added_here.push(name);
            }
            current = class_node.target;
        }

        let id = self.scopes.borrow_mut().alloc(data);
        self.scopes.borrow_mut().memoize_member_scope(class, id);
        Some(id)
    }

    /// Members declared directly on the class, no inherited entries.
    /// Memoized per class.
    pub fn declared_member_scope_of_class(&self, class: NodeId) -> Option<SemScopeId> {
        let node = self.arena.get(class)?;
        if node.kind != NodeKind::Class {
            return None;
        }
        if let Some(id) = self.scopes.borrow().declared_scope_memo(class) {
            return Some(id);
        }
        debug!(class = class.0, "computing declared member scope");

        let mut data = SemScopeData::new(SemScopeKind::Declarations, class);
        for &child in &node.children {
            if let Some(member) = self.arena.get(child)
                && matches!(member.kind, NodeKind::Field | NodeKind::Method)
                && let Some(name) = member.name
            {
                data.add(name, child);
            }
        }

        let id = self.scopes.borrow_mut().alloc(data);
        self.scopes.borrow_mut().memoize_declared_scope(class, id);
        Some(id)
    }

    /// Top-level declarations of every file in the package. Memoized.
    pub fn package_member_scope(&self, package: NodeId) -> Option<SemScopeId> {
        let node = self.arena.get(package)?;
        if node.kind != NodeKind::Package {
            return None;
        }
        if let Some(id) = self.scopes.borrow().package_scope_memo(package) {
            return Some(id);
        }
        debug!(package = package.0, "computing package member scope");

        let mut data = SemScopeData::new(SemScopeKind::PackageMembers, package);
        for &file in &node.children {
            let Some(file_node) = self.arena.get(file) else {
                continue;
            };
            if file_node.kind != NodeKind::File {
                continue;
            }
            for &decl in &file_node.children {
                if let Some(decl_node) = self.arena.get(decl)
                    && matches!(decl_node.kind, NodeKind::Class | NodeKind::Function)
                    && let Some(name) = decl_node.name
                {
                    data.add(name, decl);
                }
            }
        }

        let id = self.scopes.borrow_mut().alloc(data);
        self.scopes.borrow_mut().memoize_package_scope(package, id);
        Some(id)
    }

    // Position-based resolution

    /// Innermost function-like node of `file` whose span contains `offset`.
    pub fn enclosing_function(&self, file: NodeId, offset: u32) -> Option<NodeId> {
        let mut best: Option<(NodeId, u32)> = None;
        for (id, node) in self.arena.iter() {
            if !node.kind.is_function_like() {
                continue;
            }
            let Some(span) = node.span else { continue };
            if !span.contains(offset) {
                continue;
            }
            if self.file_of(id) != Some(file) {
                continue;
            }
            if best.is_none_or(|(_, len)| span.len() < len) {
                best = Some((id, span.len()));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Build the transient resolution context for `offset` inside `function`,
    /// as if completion were invoked there. Expensive and never cached.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn resolution_context_at(&self, function: NodeId, offset: u32) -> ResolutionContext {
        let local_scopes = self.local_scopes_at(function, offset);

        let mut tower = Vec::new();
        let mut current = function;
        let mut iterations = 0;
        while !current.is_none() {
            iterations += 1;
            if iterations > MAX_TREE_WALK_ITERATIONS {
                break;
            }
            let Some(node) = self.arena.get(current) else {
                break;
            };
            match node.kind {
                NodeKind::Function | NodeKind::Method => {
                    self.push_function_elements(current, node, &mut tower);
                }
                NodeKind::Class => {
                    let receiver = self.class_instance_type(current);
                    let scope = self.member_scope_of_class(current);
                    tower.push(TowerElement { receiver, scope });
                }
                NodeKind::File => {
                    self.push_file_elements(node, &mut tower);
                }
                NodeKind::Package => {
                    let scope = self.package_member_scope(current);
                    tower.push(TowerElement {
                        receiver: None,
                        scope,
                    });
                }
                _ => {}
            }
            current = node.parent;
        }

        trace!(
            layers = tower.len(),
            locals = local_scopes.len(),
            "resolution context built"
        );
        ResolutionContext {
            tower,
            local_scopes,
        }
    }

    /// Parameter scope (and type-parameter scope, if generic) of one
    /// function-like layer. Methods contribute their class instance type as
    /// an implicit receiver.
    fn push_function_elements(&self, id: NodeId, node: &Node, tower: &mut Vec<TowerElement>) {
        let mut params = SemScopeData::new(SemScopeKind::Declarations, id);
        let mut type_params = SemScopeData::new(SemScopeKind::TypeParams, id);
        for &child in &node.children {
            let Some(child_node) = self.arena.get(child) else {
                continue;
            };
            let Some(name) = child_node.name else { continue };
            match child_node.kind {
                NodeKind::Param => params.add(name, child),
                NodeKind::TypeParam => type_params.add(name, child),
                _ => {}
            }
        }

        let receiver = if node.kind == NodeKind::Method {
            self.owning_class(id).and_then(|c| self.class_instance_type(c))
        } else {
            None
        };

        let params_id = self.scopes.borrow_mut().alloc(params);
        tower.push(TowerElement {
            receiver,
            scope: Some(params_id),
        });
        if !type_params.is_empty() {
            let id = self.scopes.borrow_mut().alloc(type_params);
            tower.push(TowerElement {
                receiver: None,
                scope: Some(id),
            });
        }
    }

    /// Explicit-import and star-import scopes of a file, explicit first.
    fn push_file_elements(&self, file_node: &Node, tower: &mut Vec<TowerElement>) {
        let mut explicit = SemScopeData::new(SemScopeKind::ExplicitImports, file_node.parent);
        let mut star = SemScopeData::new(SemScopeKind::StarImports, file_node.parent);
        for &child in &file_node.children {
            let Some(import) = self.arena.get(child) else {
                continue;
            };
            match import.kind {
                NodeKind::ImportExplicit => {
                    if let Some(name) = import.name
                        && !import.target.is_none()
                    {
                        explicit.add(name, import.target);
                    }
                }
                NodeKind::ImportStar => {
                    if let Some(pkg) = self.arena.get(import.target)
                        && let Some(name) = pkg.name
                    {
                        star.add(name, import.target);
                    }
                }
                _ => {}
            }
        }
        if !explicit.is_empty() {
            let id = self.scopes.borrow_mut().alloc(explicit);
            tower.push(TowerElement {
                receiver: None,
                scope: Some(id),
            });
        }
        if !star.is_empty() {
            let id = self.scopes.borrow_mut().alloc(star);
            tower.push(TowerElement {
                receiver: None,
                scope: Some(id),
            });
        }
    }

    /// Block scopes of `function` containing `offset`, innermost-first.
    fn local_scopes_at(&self, function: NodeId, offset: u32) -> Vec<SemScopeId> {
        let mut blocks: Vec<(NodeId, u32)> = Vec::new();
        for (id, node) in self.arena.iter() {
            if node.kind != NodeKind::Block {
                continue;
            }
            let Some(span) = node.span else { continue };
            if !span.contains(offset) {
                continue;
            }
            if self.enclosing_function_like(id) != Some(function) {
                continue;
            }
            blocks.push((id, span.len()));
        }
        blocks.sort_by_key(|&(_, len)| len);

        blocks
            .into_iter()
            .filter_map(|(block, _)| {
                let node = self.arena.get(block)?;
                let mut data = SemScopeData::new(SemScopeKind::Declarations, block);
                for &child in &node.children {
                    if let Some(local) = self.arena.get(child)
                        && local.kind == NodeKind::Local
                        && let Some(name) = local.name
                    {
                        data.add(name, child);
                    }
                }
                Some(self.scopes.borrow_mut().alloc(data))
            })
            .collect()
    }

    // Upward walks

    fn file_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        let mut iterations = 0;
        while !current.is_none() {
            iterations += 1;
            if iterations > MAX_TREE_WALK_ITERATIONS {
                return None;
            }
            let node = self.arena.get(current)?;
            if node.kind == NodeKind::File {
                return Some(current);
            }
            current = node.parent;
        }
        None
    }

    /// Nearest function-like strict ancestor.
    fn enclosing_function_like(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.arena.get(id)?.parent;
        let mut iterations = 0;
        while !current.is_none() {
            iterations += 1;
            if iterations > MAX_TREE_WALK_ITERATIONS {
                return None;
            }
            let node = self.arena.get(current)?;
            if node.kind.is_function_like() {
                return Some(current);
            }
            current = node.parent;
        }
        None
    }

    /// Nearest `Class` ancestor (the declaring class of a member).
    fn owning_class(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.arena.get(id)?.parent;
        let mut iterations = 0;
        while !current.is_none() {
            iterations += 1;
            if iterations > MAX_TREE_WALK_ITERATIONS {
                return None;
            }
            let node = self.arena.get(current)?;
            if node.kind == NodeKind::Class {
                return Some(current);
            }
            current = node.parent;
        }
        None
    }
}
