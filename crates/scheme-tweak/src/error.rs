//! Tweak error types.

use thiserror::Error;

/// Errors that can occur while tweaking a color scheme.
#[derive(Debug, Error)]
pub enum TweakError {
    /// Text is neither a hex literal nor a known color name.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// A filter-chain segment does not match the filter grammar.
    #[error("Malformed filter segment: {0}")]
    MalformedFilterSegment(String),

    /// Unknown channel path.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// The document does not have the expected shape.
    #[error("Invalid scheme: {0}")]
    InvalidScheme(String),

    /// Nothing left to undo.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing left to redo.
    #[error("Nothing to redo")]
    NothingToRedo,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML error.
    #[error("TOML error: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for TweakError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e.to_string())
    }
}

impl From<toml::ser::Error> for TweakError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Toml(e.to_string())
    }
}

/// Result type for tweak operations.
pub type TweakResult<T> = Result<T, TweakError>;
