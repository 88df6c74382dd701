//! Semantic tree, scope, and type model for the veld compiler.
//!
//! This crate owns the resolved program representation that the analysis
//! layer (`veld-analysis`) queries:
//! - `node` - arena-allocated semantic nodes (`NodeId`, `Node`, `NodeArena`)
//! - `scopes` - underlying semantic scopes (`SemScopeId`, `ScopeStore`)
//! - `types` - the resolved type table (`TypeId`, `TypeTable`)
//! - `builder` - programmatic construction of semantic trees (`TreeBuilder`)
//! - `db` - the `SemanticDb` resolution facade
//!
//! Nothing here parses source text or runs inference; trees are built
//! directly (by a front end, or by `TreeBuilder` in tests) and this crate
//! answers structural questions about them.

pub mod builder;
pub mod db;
pub mod node;
pub mod scopes;
pub mod types;

pub use builder::TreeBuilder;
pub use db::{ResolutionContext, SemanticDb, TowerElement};
pub use node::{Node, NodeArena, NodeId, NodeKind, node_flags};
pub use scopes::{SemScopeData, SemScopeId, SemScopeKind};
pub use types::{TypeData, TypeId};
