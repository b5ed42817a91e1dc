//! # scheme-tweak
//!
//! Color filter engine for editor color schemes.
//!
//! ## Features
//!
//! - Hex and X11/CSS color parsing with RGB and HSL channel access
//! - Nine filters: brightness, saturation, hue, contrast, colorize, glow,
//!   sepia, grayscale and invert
//! - `;`-separated filter chains with `@fg`/`@bg` contexts
//! - Whole-scheme tweaking of globals, rules and gradient foregrounds
//! - Conversion to and from the legacy settings-list format
//! - Undo/redo sessions that replay deterministically from history
//!
//! ## Example
//!
//! ```
//! use scheme_tweak::{ColorScheme, Rule, SchemeTweaker};
//!
//! let mut scheme = ColorScheme::new()
//!     .global("background", "#000000")
//!     .rule(Rule::new("keyword").foreground("#FF0000"));
//!
//! let applied = SchemeTweaker::parse("invert@fg;glow(0.2)").tweak(&mut scheme);
//! assert_eq!(applied, vec!["invert@fg", "glow(0.200000)"]);
//! assert_eq!(scheme.rules[0].background.as_deref(), Some("#00FFFF33"));
//! ```

mod adjust;
mod chain;
mod color;
mod error;
pub mod filters;
mod history;
mod legacy;
mod scheme;
mod session;
mod settings;
mod tweaker;
mod x11;

pub use adjust::{Adjustment, Direction};
pub use chain::{Context, Filter, FilterChain, FilterKind};
pub use color::{Channel, Color, LUMA_BLUE, LUMA_GREEN, LUMA_RED};
pub use error::{TweakError, TweakResult};
pub use history::TweakHistory;
pub use legacy::{camel_to_snake, from_legacy, snake_to_camel, to_legacy, SchemeFormat, CURRENT_EXTENSION};
pub use scheme::{ColorScheme, Foreground, GlobalsKey, Rule};
pub use session::TweakSession;
pub use settings::TweakSettings;
pub use tweaker::{resolve_color, DualColorMode, SchemeTweaker};
pub use x11::name_to_hex;

/// Apply a chain expression to `scheme` in place.
///
/// Returns the canonical tokens of the filters that were applied.
pub fn tweak(scheme: &mut ColorScheme, filters: &str) -> Vec<String> {
    SchemeTweaker::parse(filters).tweak(scheme)
}
