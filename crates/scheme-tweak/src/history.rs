//! Undo/redo history of applied filters.

use crate::error::{TweakError, TweakResult};
use serde::{Deserialize, Serialize};

/// Separator between tokens in a joined history string.
pub const TOKEN_SEPARATOR: char = ';';

/// Applied filter tokens, with a redo stack of undone ones.
///
/// Replaying the undo list, in order, against the original scheme
/// reproduces the working scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweakHistory {
    undo: Vec<String>,
    redo: Vec<String>,
}

impl TweakHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from `;`-joined token strings.
    pub fn from_joined(undo: &str, redo: &str) -> Self {
        Self {
            undo: split_joined(undo),
            redo: split_joined(redo),
        }
    }

    /// Record newly applied tokens. Any redo entries are discarded.
    pub fn push<I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.undo.len();
        self.undo.extend(tokens);
        if self.undo.len() > before {
            self.redo.clear();
        }
    }

    /// Move the last applied token to the redo stack.
    pub fn undo(&mut self) -> TweakResult<String> {
        let token = self.undo.pop().ok_or(TweakError::NothingToUndo)?;
        self.redo.push(token.clone());
        Ok(token)
    }

    /// Move the last undone token back onto the applied list.
    pub fn redo(&mut self) -> TweakResult<String> {
        let token = self.redo.pop().ok_or(TweakError::NothingToRedo)?;
        self.undo.push(token.clone());
        Ok(token)
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Tokens applied so far, oldest first.
    pub fn applied(&self) -> &[String] {
        &self.undo
    }

    /// Undone tokens; the next redo is last.
    pub fn undone(&self) -> &[String] {
        &self.redo
    }

    /// Check if there is anything to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Check if there is anything to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// The applied tokens as one chain expression.
    pub fn undo_joined(&self) -> String {
        self.undo.join(";")
    }

    /// The undone tokens as one `;`-joined string.
    pub fn redo_joined(&self) -> String {
        self.redo.join(";")
    }
}

fn split_joined(joined: &str) -> Vec<String> {
    joined
        .split(TOKEN_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
