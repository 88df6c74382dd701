//! Session ownership.
//!
//! An `AnalysisSession` exclusively owns one resolved program state (the
//! `SemanticDb`) together with the validity token bounding its lifetime.
//! Wrappers handed out by the session hold ids plus the token, never
//! references into state they do not own.
//!
//! One session is not expected to be queried from multiple threads; callers
//! serialize access per session.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use veld_semantic::SemanticDb;

use crate::provider::ScopeProvider;
use crate::token::ValidityToken;

pub(crate) struct SessionCore {
    pub(crate) db: SemanticDb,
    pub(crate) token: ValidityToken,
}

/// One analysis session over one resolved program state.
pub struct AnalysisSession {
    core: Rc<SessionCore>,
}

impl AnalysisSession {
    pub fn db(&self) -> &SemanticDb {
        &self.core.db
    }

    pub fn token(&self) -> &ValidityToken {
        &self.core.token
    }

    /// A fresh scope provider with its own caches and scope registry.
    /// Providers never share state; wrapper identity is stable per provider.
    pub fn scope_provider(&self) -> ScopeProvider {
        ScopeProvider::new(self.core.clone())
    }
}

/// Owns the succession of analysis sessions. Opening a new session
/// supersedes the previous one's token, so every wrapper obtained from it
/// starts failing with `StaleState`.
#[derive(Default)]
pub struct AnalysisHost {
    current: RefCell<Option<ValidityToken>>,
}

impl AnalysisHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_session(&self, db: SemanticDb) -> AnalysisSession {
        if let Some(previous) = self.current.borrow_mut().take() {
            debug!("superseding previous analysis session");
            previous.supersede();
        }
        let token = ValidityToken::new_current();
        *self.current.borrow_mut() = Some(token.clone());
        AnalysisSession {
            core: Rc::new(SessionCore { db, token }),
        }
    }
}
