//! The `ScopeProvider` facade.
//!
//! The only entry point external features (completion, navigation) use.
//! Builds, caches, and composes scope wrappers; every operation checks the
//! session's validity token before touching any cache, and every underlying
//! scope is registered for lifetime pinning before it is wrapped.
//!
//! Caches are identity-keyed by the owning symbol's node id, so repeated
//! requests return the identical wrapper object and callers may compare
//! scopes by identity (`Rc::ptr_eq`).

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use veld_semantic::{NodeId, NodeKind, SemScopeId, SemScopeKind, TypeData, TypeId};

use crate::error::{AnalysisError, AnalysisResult};
use crate::registry::ScopeRegistry;
use crate::scope::Scope;
use crate::session::SessionCore;
use crate::symbol::{Symbol, SymbolKind};
use crate::symbol_builder::SymbolBuilder;

/// Everything visible at one source position: a composite scope ordered by
/// shadowing precedence (innermost first) plus the implicit receiver types
/// usable for unqualified member resolution there.
pub struct ScopeContext {
    pub scope: Rc<Scope>,
    pub receivers: Vec<TypeId>,
}

pub struct ScopeProvider {
    core: Rc<SessionCore>,
    builder: Rc<SymbolBuilder>,
    registry: ScopeRegistry,
    member_scopes: RefCell<FxHashMap<NodeId, Rc<Scope>>>,
    declared_member_scopes: RefCell<FxHashMap<NodeId, Rc<Scope>>>,
    package_scopes: RefCell<FxHashMap<NodeId, Rc<Scope>>>,
}

impl ScopeProvider {
    pub(crate) fn new(core: Rc<SessionCore>) -> Self {
        Self {
            builder: Rc::new(SymbolBuilder::new(core.clone())),
            registry: ScopeRegistry::new(core.clone()),
            core,
            member_scopes: RefCell::new(FxHashMap::default()),
            declared_member_scopes: RefCell::new(FxHashMap::default()),
            package_scopes: RefCell::new(FxHashMap::default()),
        }
    }

    /// The symbol factory shared by this provider and its scopes.
    pub fn symbol_builder(&self) -> &Rc<SymbolBuilder> {
        &self.builder
    }

    pub fn registry(&self) -> &ScopeRegistry {
        &self.registry
    }

    /// Member scope of a class symbol, inherited members included.
    /// Reference-stable per class symbol.
    pub fn member_scope(&self, class: &Rc<Symbol>) -> AnalysisResult<Rc<Scope>> {
        self.core.token.ensure_current()?;
        self.require_kind(class, SymbolKind::Class)?;
        if let Some(scope) = self.member_scopes.borrow().get(&class.node()) {
            return Ok(scope.clone());
        }

        debug!(class = class.node().0, "member scope cache miss");
        let sem = self.class_scope_of(class, veld_semantic::SemanticDb::member_scope_of_class)?;
        self.registry.register(sem);
        let scope = Rc::new(Scope::member(self.builder.clone(), sem));
        self.member_scopes
            .borrow_mut()
            .insert(class.node(), scope.clone());
        Ok(scope)
    }

    /// Members declared directly on the class, no inherited entries.
    /// Reference-stable per class symbol.
    pub fn declared_member_scope(&self, class: &Rc<Symbol>) -> AnalysisResult<Rc<Scope>> {
        self.core.token.ensure_current()?;
        self.require_kind(class, SymbolKind::Class)?;
        if let Some(scope) = self.declared_member_scopes.borrow().get(&class.node()) {
            return Ok(scope.clone());
        }

        debug!(class = class.node().0, "declared member scope cache miss");
        let sem =
            self.class_scope_of(class, veld_semantic::SemanticDb::declared_member_scope_of_class)?;
        self.registry.register(sem);
        let scope = Rc::new(Scope::declared_member(self.builder.clone(), sem));
        self.declared_member_scopes
            .borrow_mut()
            .insert(class.node(), scope.clone());
        Ok(scope)
    }

    /// Scope enumerating the top-level declarations of a package.
    /// Reference-stable per package symbol.
    pub fn package_scope(&self, package: &Rc<Symbol>) -> AnalysisResult<Rc<Scope>> {
        self.core.token.ensure_current()?;
        self.require_kind(package, SymbolKind::Package)?;
        if let Some(scope) = self.package_scopes.borrow().get(&package.node()) {
            return Ok(scope.clone());
        }

        debug!(package = package.node().0, "package scope cache miss");
        // Package members are enumerated through this provider's own
        // session rather than a session derived from the symbol; package
        // member sets are invariant within a session, which is the only
        // reason this holds up.
        let sem = self
            .core
            .db
            .package_member_scope(package.node())
            .ok_or_else(|| unsupported(SymbolKind::Package))?;
        self.registry.register(sem);
        let scope = Rc::new(Scope::package(self.builder.clone(), sem));
        self.package_scopes
            .borrow_mut()
            .insert(package.node(), scope.clone());
        Ok(scope)
    }

    /// Ordered union of `parts`; lookup tries parts in order and stops at
    /// the first match. Pure construction, never cached.
    pub fn composite_scope(&self, parts: Vec<Rc<Scope>>) -> AnalysisResult<Rc<Scope>> {
        self.core.token.ensure_current()?;
        Ok(Rc::new(Scope::composite(self.core.token.clone(), parts)))
    }

    /// Member scope of a type, or `None` for types without members (error
    /// type, primitives). Not cached: type handles are not identity-stable
    /// across queries the way symbols are.
    pub fn scope_for_type(&self, ty: TypeId) -> AnalysisResult<Option<Rc<Scope>>> {
        self.core.token.ensure_current()?;
        let Some(data) = self.core.db.type_data(ty) else {
            return Err(AnalysisError::UnsupportedTypeKind { ty });
        };
        match data {
            TypeData::Class(class) => match self.core.db.member_scope_of_class(class) {
                Some(sem) => Ok(Some(self.convert_scope(sem)?)),
                None => Ok(None),
            },
            TypeData::Primitive(_) | TypeData::Error => Ok(None),
        }
    }

    /// Everything visible at `offset` inside `file`: one composite scope,
    /// ordered innermost-first (block locals, then the lexical tower), plus
    /// the implicit receiver types at that position.
    ///
    /// Triggers speculative resolution of the enclosing function up to the
    /// offset; that work is one-shot and never cached across calls.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn scope_context_at(&self, file: NodeId, offset: u32) -> AnalysisResult<ScopeContext> {
        self.core.token.ensure_current()?;
        let db = &self.core.db;

        let file_kind = db.node(file).map(|n| n.kind);
        if file_kind != Some(NodeKind::File) {
            return Err(AnalysisError::UnsupportedSymbolKind {
                found: format!("{file_kind:?}"),
            });
        }
        let function = db
            .enclosing_function(file, offset)
            .ok_or(AnalysisError::NoEnclosingScope { offset })?;
        let context = db.resolution_context_at(function, offset);

        // Implicit receivers, deduplicated by identity, innermost first.
        let mut seen = FxHashSet::default();
        let mut receivers = Vec::new();
        for element in &context.tower {
            if let Some(receiver) = element.receiver
                && seen.insert(receiver)
            {
                receivers.push(receiver);
            }
        }

        // Block scopes shadow everything in the tower.
        let mut scopes = Vec::with_capacity(context.local_scopes.len() + context.tower.len());
        for &local in &context.local_scopes {
            self.registry.register(local);
            scopes.push(Rc::new(Scope::local(self.builder.clone(), local)));
        }
        for element in &context.tower {
            if let Some(sem) = element.scope {
                scopes.push(self.convert_scope(sem)?);
            }
        }

        debug!(
            function = function.0,
            scopes = scopes.len(),
            receivers = receivers.len(),
            "scope context assembled"
        );
        Ok(ScopeContext {
            scope: Rc::new(Scope::composite(self.core.token.clone(), scopes)),
            receivers,
        })
    }

    /// Classify one underlying scope into its wrapper variant. Closed,
    /// exhaustive dispatch: an unhandled shape is a hard error, never a
    /// default wrapper. The scope is registered whatever the outcome.
    pub(crate) fn convert_scope(&self, sem: SemScopeId) -> AnalysisResult<Rc<Scope>> {
        self.registry.register(sem);
        let Some(kind) = self.core.db.scope_kind(sem) else {
            // The underlying scope was reclaimed before registration could
            // pin it; the resolution state backing it is gone.
            return Err(AnalysisError::StaleState);
        };
        let scope = match kind {
            SemScopeKind::ExplicitImports => Scope::import(self.builder.clone(), sem, false),
            SemScopeKind::StarImports => Scope::import(self.builder.clone(), sem, true),
            SemScopeKind::PackageMembers => Scope::package(self.builder.clone(), sem),
            SemScopeKind::Declarations => Scope::delegating(self.builder.clone(), sem),
            SemScopeKind::TypeParams => {
                return Err(AnalysisError::UnimplementedScopeKind(kind));
            }
        };
        Ok(Rc::new(scope))
    }

    fn require_kind(&self, symbol: &Rc<Symbol>, expected: SymbolKind) -> AnalysisResult<()> {
        let kind = symbol.kind()?;
        if kind == expected {
            Ok(())
        } else {
            Err(unsupported(kind))
        }
    }

    fn class_scope_of(
        &self,
        class: &Rc<Symbol>,
        compute: impl Fn(&veld_semantic::SemanticDb, NodeId) -> Option<SemScopeId>,
    ) -> AnalysisResult<SemScopeId> {
        compute(&self.core.db, class.node()).ok_or_else(|| unsupported(SymbolKind::Class))
    }
}

fn unsupported(kind: SymbolKind) -> AnalysisError {
    AnalysisError::UnsupportedSymbolKind {
        found: format!("{kind:?}"),
    }
}
