//! Session validity tokens.
//!
//! A token proves that the session it was minted for is still the current
//! one. Checking it is the first observable action of every public
//! operation in this crate, so a caller can never observe partially-stale
//! derived data.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::{AnalysisError, AnalysisResult};

/// Cheap clonable handle over one session's liveness.
#[derive(Debug, Clone)]
pub struct ValidityToken {
    live: Rc<Cell<bool>>,
}

impl ValidityToken {
    pub(crate) fn new_current() -> Self {
        Self {
            live: Rc::new(Cell::new(true)),
        }
    }

    pub fn is_current(&self) -> bool {
        self.live.get()
    }

    /// Fail fast if the session was superseded.
    pub fn ensure_current(&self) -> AnalysisResult<()> {
        if self.live.get() {
            Ok(())
        } else {
            Err(AnalysisError::StaleState)
        }
    }

    /// Mark every clone of this token stale. Irreversible.
    pub(crate) fn supersede(&self) {
        self.live.set(false);
    }
}
