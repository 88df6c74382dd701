//! Identity-deduplicating symbol factory.
//!
//! Within one session the same semantic node always yields the same
//! reference-identical `Rc<Symbol>`. Deduplication is by node identity, not
//! by value: two same-named locals in different blocks are distinct nodes
//! and stay distinct symbols.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::trace;
use veld_semantic::NodeId;

use crate::error::{AnalysisError, AnalysisResult};
use crate::session::SessionCore;
use crate::symbol::{Symbol, symbol_kind_of};

pub struct SymbolBuilder {
    core: Rc<SessionCore>,
    cache: RefCell<FxHashMap<NodeId, Rc<Symbol>>>,
}

impl SymbolBuilder {
    pub(crate) fn new(core: Rc<SessionCore>) -> Self {
        Self {
            core,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    pub(crate) fn core(&self) -> &Rc<SessionCore> {
        &self.core
    }

    /// The canonical symbol wrapper for `node`. Building performs no
    /// resolution of the symbol's attributes.
    pub fn symbol(&self, node: NodeId) -> AnalysisResult<Rc<Symbol>> {
        self.core.token.ensure_current()?;
        if let Some(symbol) = self.cache.borrow().get(&node) {
            return Ok(symbol.clone());
        }

        let Some(data) = self.core.db.node(node) else {
            return Err(AnalysisError::UnsupportedSymbolKind {
                found: format!("unknown node {}", node.0),
            });
        };
        let Some(kind) = symbol_kind_of(data.kind) else {
            return Err(AnalysisError::UnsupportedSymbolKind {
                found: format!("{:?}", data.kind),
            });
        };

        trace!(node = node.0, ?kind, "built symbol wrapper");
        let symbol = Rc::new(Symbol::new(self.core.clone(), node, kind));
        self.cache.borrow_mut().insert(node, symbol.clone());
        Ok(symbol)
    }

    /// Number of distinct symbols built so far.
    pub fn built_count(&self) -> usize {
        self.cache.borrow().len()
    }
}
