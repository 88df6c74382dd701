//! Symbol and scope resolution layer for the veld compiler.
//!
//! Sits on top of `veld-semantic` and exposes a stable, validity-checked
//! view of program symbols and the scopes that resolve names to them:
//! - `token` - session validity token (`ValidityToken`)
//! - `session` - session ownership (`AnalysisHost`, `AnalysisSession`)
//! - `symbol` - lazily-resolved symbol wrappers (`Symbol`, `SymbolKind`)
//! - `symbol_builder` - identity-deduplicating symbol factory
//! - `scope` - scope wrappers with first-match composite lookup (`Scope`)
//! - `registry` - lifetime pinning for underlying scopes (`ScopeRegistry`)
//! - `provider` - the `ScopeProvider` facade and `ScopeContext`
//!
//! Every public operation checks the session's validity token before
//! touching cached data; results from a superseded session fail with
//! `AnalysisError::StaleState` instead of going stale silently.

pub mod error;
pub mod provider;
pub mod registry;
pub mod scope;
pub mod session;
pub mod symbol;
pub mod symbol_builder;
pub mod token;

pub use error::{AnalysisError, AnalysisResult};
pub use provider::{ScopeContext, ScopeProvider};
pub use registry::ScopeRegistry;
pub use scope::{Scope, ScopeKind};
pub use session::{AnalysisHost, AnalysisSession};
pub use symbol::{Symbol, SymbolKind};
pub use symbol_builder::SymbolBuilder;
pub use token::ValidityToken;
