//! Persisted tweak state.

use anyhow::{Context, Result};
use scheme_tweak::TweakHistory;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Session state kept between invocations.
///
/// Fields are declared in key order so the file is written with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweakState {
    /// Scheme the session started from
    pub original: PathBuf,
    /// Undone filter tokens, `;`-joined
    #[serde(default)]
    pub redo: String,
    /// Applied filter tokens, `;`-joined
    #[serde(default)]
    pub undo: String,
    /// File the tweaked scheme is written to
    pub working: PathBuf,
}

impl TweakState {
    /// Fresh state with empty history.
    pub fn new(original: PathBuf, working: PathBuf) -> Self {
        Self {
            original,
            working,
            ..Self::default()
        }
    }

    /// Undo/redo history stored in this state.
    pub fn history(&self) -> TweakHistory {
        TweakHistory::from_joined(&self.undo, &self.redo)
    }

    /// Store a history.
    pub fn set_history(&mut self, history: &TweakHistory) {
        self.undo = history.undo_joined();
        self.redo = history.redo_joined();
    }

    /// Load state from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("no tweak session at {} (run `start` first)", path.display()))?;
        let state = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse tweak state {}", path.display()))?;
        Ok(state)
    }

    /// Save state to file, indented by four spaces.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut content, formatter);
        self.serialize(&mut serializer)?;
        content.push(b'\n');

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("failed to write tweak state {}", path.display()))?;
        Ok(())
    }

    /// Get default state path.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "scheme-tweaker")
            .map(|d| d.data_dir().join("tweak-state.json"))
    }
}
