//! Tweak sessions.

use crate::error::TweakResult;
use crate::history::TweakHistory;
use crate::scheme::ColorScheme;
use crate::tweaker::SchemeTweaker;
use tracing::info;

/// An original scheme, the filters applied to it, and the result.
///
/// The working scheme is always re-derived by replaying the whole applied
/// history against the original, so a session restored from persisted
/// history matches one built up live.
#[derive(Debug, Clone)]
pub struct TweakSession {
    /// Scheme as loaded
    original: ColorScheme,
    /// Original with every applied filter replayed
    working: ColorScheme,
    /// Applied and undone filter tokens
    history: TweakHistory,
}

impl TweakSession {
    /// Start a session with empty history.
    pub fn new(original: ColorScheme) -> Self {
        Self::with_history(original, TweakHistory::new())
    }

    /// Restore a session from persisted history.
    pub fn with_history(original: ColorScheme, history: TweakHistory) -> Self {
        let mut session = Self {
            working: original.clone(),
            original,
            history,
        };
        session.rederive();
        session
    }

    /// Scheme the applied history is replayed onto.
    pub fn original(&self) -> &ColorScheme {
        &self.original
    }

    /// The tweaked scheme.
    pub fn working(&self) -> &ColorScheme {
        &self.working
    }

    /// Applied and undone filters.
    pub fn history(&self) -> &TweakHistory {
        &self.history
    }

    /// Apply a chain expression. Returns the canonical tokens applied,
    /// which is empty when nothing in `filters` was valid.
    pub fn run(&mut self, filters: &str) -> Vec<String> {
        let tokens = SchemeTweaker::parse(filters).tokens();
        if tokens.is_empty() {
            return tokens;
        }
        self.history.push(tokens.iter().cloned());
        self.rederive();
        info!(filters = %tokens.join(";"), "applied filters");
        tokens
    }

    /// Revert the last applied filter.
    pub fn undo(&mut self) -> TweakResult<String> {
        let token = self.history.undo()?;
        self.rederive();
        info!(filter = %token, "undid filter");
        Ok(token)
    }

    /// Re-apply the last undone filter.
    pub fn redo(&mut self) -> TweakResult<String> {
        let token = self.history.redo()?;
        self.rederive();
        info!(filter = %token, "redid filter");
        Ok(token)
    }

    /// Drop all filters and go back to the original.
    pub fn clear(&mut self) {
        self.history.clear();
        self.working = self.original.clone();
        info!("cleared tweaks");
    }

    /// Forget history but keep the working scheme as is. The working
    /// scheme becomes the new original, so later runs build on it.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.original = self.working.clone();
        info!("cleared tweak history");
    }

    fn rederive(&mut self) {
        let mut working = self.original.clone();
        SchemeTweaker::parse(&self.history.undo_joined()).tweak(&mut working);
        self.working = working;
    }
}
