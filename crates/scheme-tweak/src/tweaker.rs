//! Apply filter chains to color schemes.
//!
//! Global options are filtered one color at a time, classified as
//! background or foreground by key. Rules are filtered as fg/bg pairs so
//! that `@fg`/`@bg` contexts and glow can see both colors.

use crate::chain::{FilterChain, FilterKind};
use crate::color::Color;
use crate::filters;
use crate::scheme::{ColorScheme, Foreground, Rule};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Global keys that hold background colors.
const BACKGROUND_KEYS: &[&str] = &[
    "background",
    "gutter",
    "lineHighlight",
    "line_highlight",
    "selection",
];

/// Global keys with these suffixes hold stylesheets, not colors.
const CSS_SUFFIXES: &[&str] = &["Css", "_css"];

/// Whether a color pair may grow a glow background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DualColorMode {
    /// One standalone color; glow is skipped
    Single,
    /// A rule's fg/bg pair
    #[default]
    Dual,
}

/// Resolve a document color field.
///
/// Absent fields, the `""` and `"none"` sentinels, and text that is not a
/// color all resolve to `None`.
pub fn resolve_color(text: Option<&str>) -> Option<Color> {
    match text.map(str::trim) {
        None | Some("") | Some("none") => None,
        Some(s) => match Color::parse(s) {
            Ok(color) => Some(color),
            Err(e) => {
                trace!(error = %e, "leaving unparseable color");
                None
            }
        },
    }
}

fn is_background_key(key: &str) -> bool {
    BACKGROUND_KEYS.contains(&key)
}

fn is_stylesheet_key(key: &str) -> bool {
    CSS_SUFFIXES.iter().any(|suffix| key.ends_with(suffix))
}

/// Applies a filter chain to a color scheme.
#[derive(Debug, Clone)]
pub struct SchemeTweaker {
    chain: FilterChain,
    base_background: Color,
    base_foreground: Color,
}

impl SchemeTweaker {
    /// Create a tweaker for a parsed chain.
    pub fn new(chain: FilterChain) -> Self {
        Self {
            chain,
            base_background: Color::white(),
            base_foreground: Color::black(),
        }
    }

    /// Create a tweaker from a chain expression.
    pub fn parse(filters: &str) -> Self {
        Self::new(FilterChain::parse(filters))
    }

    /// The parsed chain.
    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    /// Canonical tokens of the chain.
    pub fn tokens(&self) -> Vec<String> {
        self.chain.tokens()
    }

    /// Background that glow composites onto.
    ///
    /// The scheme's global background after filtering, or white.
    pub fn base_background(&self) -> Color {
        self.base_background
    }

    /// The scheme's global foreground after filtering, or black.
    pub fn base_foreground(&self) -> Color {
        self.base_foreground
    }

    /// Apply the chain to `scheme` in place and return the tokens applied.
    ///
    /// An empty chain leaves the document untouched.
    pub fn tweak(&mut self, scheme: &mut ColorScheme) -> Vec<String> {
        if self.chain.is_empty() {
            debug!("empty filter chain, scheme left as is");
            return Vec::new();
        }

        self.tweak_globals(&mut scheme.globals);
        self.base_background = base_color(&scheme.globals, "background").unwrap_or_else(Color::white);
        self.base_foreground = base_color(&scheme.globals, "foreground").unwrap_or_else(Color::black);

        for rule in &mut scheme.rules {
            self.tweak_rule(rule);
        }

        debug!(
            filters = %self.chain,
            rules = scheme.rules.len(),
            "tweaked scheme"
        );
        self.tokens()
    }

    /// Run the chain over an fg/bg pair.
    ///
    /// Absent colors stay absent, except that glow in [`DualColorMode::Dual`]
    /// derives a background when there is a foreground and no background.
    /// Later filters then apply to that derived background too.
    pub fn filter_colors(
        &self,
        foreground: Option<Color>,
        background: Option<Color>,
        mode: DualColorMode,
    ) -> (Option<Color>, Option<Color>) {
        let mut fg = foreground;
        let mut bg = background;

        for filter in &self.chain {
            if filter.kind() == FilterKind::Glow {
                if mode == DualColorMode::Dual && bg.is_none() {
                    if let Some(fg) = &fg {
                        bg = filters::glow(fg, &self.base_background, filter.value());
                    }
                }
                continue;
            }

            if filter.context().applies_to_fg() {
                if let Some(color) = fg.as_mut() {
                    filter.kind().apply(color, filter.value());
                }
            }
            if filter.context().applies_to_bg() {
                if let Some(color) = bg.as_mut() {
                    filter.kind().apply(color, filter.value());
                }
            }
        }

        (fg, bg)
    }

    fn tweak_globals(&self, globals: &mut Map<String, Value>) {
        for (key, value) in globals.iter_mut() {
            if is_stylesheet_key(key) {
                continue;
            }
            let Value::String(text) = value else {
                continue;
            };
            let Some(color) = resolve_color(Some(text.as_str())) else {
                continue;
            };

            let filtered = if is_background_key(key) {
                self.filter_colors(None, Some(color), DualColorMode::Single).1
            } else {
                self.filter_colors(Some(color), None, DualColorMode::Single).0
            };
            if let Some(color) = filtered {
                trace!(key = %key, from = %text, to = %color, "global");
                *text = color.to_string();
            }
        }
    }

    fn tweak_rule(&self, rule: &mut Rule) {
        let mut background = resolve_color(rule.background.as_deref());
        // sentinels and unparseable values are never overwritten
        let background_writable = rule.background.is_none() || background.is_some();

        match &mut rule.foreground {
            Some(Foreground::Single(text)) => {
                let (fg, bg) =
                    self.filter_colors(resolve_color(Some(text.as_str())), background, DualColorMode::Dual);
                if let Some(fg) = fg {
                    *text = fg.to_string();
                }
                background = bg;
            }
            Some(Foreground::Gradient(stops)) if !stops.is_empty() => {
                if let Some((first, rest)) = stops.split_first_mut() {
                    let (fg, bg) =
                        self.filter_colors(resolve_color(Some(first.as_str())), background, DualColorMode::Dual);
                    if let Some(fg) = fg {
                        *first = fg.to_string();
                    }
                    background = bg;

                    for stop in rest {
                        let (fg, _) =
                            self.filter_colors(resolve_color(Some(stop.as_str())), background, DualColorMode::Dual);
                        if let Some(fg) = fg {
                            *stop = fg.to_string();
                        }
                    }
                }
            }
            Some(Foreground::Gradient(_)) | None => {
                background = self.filter_colors(None, background, DualColorMode::Dual).1;
            }
        }

        if background_writable {
            if let Some(bg) = background {
                rule.background = Some(bg.to_string());
            }
        }
    }
}

/// An opaque global color, used as a compositing base.
fn base_color(globals: &Map<String, Value>, key: &str) -> Option<Color> {
    let mut color = resolve_color(globals.get(key).and_then(Value::as_str))?;
    color.set_alpha(None);
    Some(color)
}
