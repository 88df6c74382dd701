//! Lifetime pinning for underlying scopes.
//!
//! Every underlying scope a provider wraps is registered here before the
//! wrapper is handed out; registration pins the scope in the semantic
//! database so reclamation (`SemanticDb::sweep_memos`) never drops a scope a
//! wrapper still references. The registry is append-only and torn down with
//! its provider, never entry by entry.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexSet;
use tracing::trace;
use veld_semantic::SemScopeId;

use crate::session::SessionCore;

pub struct ScopeRegistry {
    core: Rc<SessionCore>,
    scopes: RefCell<IndexSet<SemScopeId>>,
}

impl ScopeRegistry {
    pub(crate) fn new(core: Rc<SessionCore>) -> Self {
        Self {
            core,
            scopes: RefCell::new(IndexSet::new()),
        }
    }

    pub(crate) fn register(&self, id: SemScopeId) {
        if self.scopes.borrow_mut().insert(id) {
            self.core.db.pin_scope(id);
            trace!(scope = id.0, "registered underlying scope");
        }
    }

    pub fn contains(&self, id: SemScopeId) -> bool {
        self.scopes.borrow().contains(&id)
    }

    pub fn len(&self) -> usize {
        self.scopes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.borrow().is_empty()
    }
}
