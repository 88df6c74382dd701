//! The closed set of analysis-layer failures.
//!
//! None of these are retried or recovered internally; every failure
//! propagates synchronously to the direct caller.

use std::fmt;

use veld_semantic::{SemScopeKind, TypeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The session's validity token was superseded; callers must re-fetch
    /// wrappers from a fresh session.
    StaleState,
    /// A symbol of a kind this layer does not handle was passed in.
    UnsupportedSymbolKind { found: String },
    /// A type handle foreign to this session was passed in.
    UnsupportedTypeKind { ty: TypeId },
    /// A position query had no enclosing function-like construct.
    NoEnclosingScope { offset: u32 },
    /// Scope conversion hit an underlying scope shape this layer does not
    /// wrap. Always fatal: silently mis-wrapping would corrupt name
    /// resolution.
    UnimplementedScopeKind(SemScopeKind),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::StaleState => {
                write!(f, "analysis session is no longer current")
            }
            AnalysisError::UnsupportedSymbolKind { found } => {
                write!(f, "unsupported symbol kind: {found}")
            }
            AnalysisError::UnsupportedTypeKind { ty } => {
                write!(f, "type {} is not known to this session", ty.0)
            }
            AnalysisError::NoEnclosingScope { offset } => {
                write!(f, "no enclosing function-like scope at offset {offset}")
            }
            AnalysisError::UnimplementedScopeKind(kind) => {
                write!(f, "no wrapper for underlying scope kind {kind:?}")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failure() {
        let err = AnalysisError::NoEnclosingScope { offset: 42 };
        assert!(err.to_string().contains("42"));
        let err = AnalysisError::UnimplementedScopeKind(SemScopeKind::TypeParams);
        assert!(err.to_string().contains("TypeParams"));
    }
}
