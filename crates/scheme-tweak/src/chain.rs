//! Filter-chain expressions.
//!
//! A chain is a `;`-separated list of segments. Each segment is either
//! `name(number)` or a bare parameterless name, optionally followed by a
//! context suffix:
//!
//! - `"brightness(1.010000)"` - both foreground and background
//! - `"hue(10)@fg"` - foreground only
//! - `"invert@bg"` - background only
//! - `"sepia;contrast(1.2)"` - two filters, applied left to right

use crate::error::{TweakError, TweakResult};
use std::fmt;
use std::str::FromStr;

/// Which colors of a fg/bg pair a filter touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Context {
    /// Foreground only
    Fg,
    /// Background only
    Bg,
    /// Both
    #[default]
    All,
}

impl Context {
    /// Whether a filter with this context applies to a foreground slot.
    pub fn applies_to_fg(&self) -> bool {
        !matches!(self, Self::Bg)
    }

    /// Whether a filter with this context applies to a background slot.
    pub fn applies_to_bg(&self) -> bool {
        !matches!(self, Self::Fg)
    }
}

impl FromStr for Context {
    type Err = TweakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fg" => Ok(Self::Fg),
            "bg" => Ok(Self::Bg),
            "all" => Ok(Self::All),
            other => Err(TweakError::MalformedFilterSegment(format!("unknown context: {}", other))),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fg => write!(f, "fg"),
            Self::Bg => write!(f, "bg"),
            Self::All => write!(f, "all"),
        }
    }
}

/// The nine filter operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Brightness,
    Saturation,
    Hue,
    Contrast,
    Colorize,
    Glow,
    Sepia,
    Grayscale,
    Invert,
}

impl FilterKind {
    /// All kinds, in grammar order.
    pub const ALL: [FilterKind; 9] = [
        Self::Brightness,
        Self::Saturation,
        Self::Hue,
        Self::Contrast,
        Self::Colorize,
        Self::Glow,
        Self::Sepia,
        Self::Grayscale,
        Self::Invert,
    ];

    /// Name used in chain expressions.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Saturation => "saturation",
            Self::Hue => "hue",
            Self::Contrast => "contrast",
            Self::Colorize => "colorize",
            Self::Glow => "glow",
            Self::Sepia => "sepia",
            Self::Grayscale => "grayscale",
            Self::Invert => "invert",
        }
    }

    /// Look up a kind by its expression name (case-sensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether the filter is written as `name(number)`.
    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::Sepia | Self::Grayscale | Self::Invert)
    }

    /// Whether the value is an angle, formatted as an integer.
    pub fn is_degrees(&self) -> bool {
        matches!(self, Self::Hue | Self::Colorize)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = TweakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.trim())
            .ok_or_else(|| TweakError::MalformedFilterSegment(format!("unknown filter: {}", s)))
    }
}

/// A single filter operation.
///
/// The value is normalized to what the canonical token can express, so a
/// filter applied live and the same filter replayed from history behave
/// identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filter {
    kind: FilterKind,
    value: f64,
    context: Context,
}

impl Filter {
    /// Create a filter.
    ///
    /// Fails when the value has no canonical token: non-finite values, and
    /// angles whose integer part does not fit an `i64`.
    pub fn new(kind: FilterKind, value: f64, context: Context) -> TweakResult<Self> {
        if !kind.takes_value() {
            return Ok(Self::bare(kind, context));
        }
        let out_of_range = || TweakError::MalformedFilterSegment(format!("{}({}) is out of range", kind, value));
        if !value.is_finite() {
            return Err(out_of_range());
        }

        let value = if kind.is_degrees() {
            let degrees = value.trunc();
            if !(i64::MIN as f64..i64::MAX as f64).contains(&degrees) {
                return Err(out_of_range());
            }
            degrees
        } else {
            format!("{:.6}", value).parse().unwrap_or(value)
        };
        Ok(Self { kind, value, context })
    }

    /// Create a parameterless filter.
    pub fn bare(kind: FilterKind, context: Context) -> Self {
        Self {
            kind,
            value: 0.0,
            context,
        }
    }

    /// Filter operation.
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Normalized argument (0 for parameterless filters).
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Colors this filter applies to.
    pub fn context(&self) -> Context {
        self.context
    }

    /// Canonical token, as stored in tweak history.
    pub fn token(&self) -> String {
        let mut token = if !self.kind.takes_value() {
            self.kind.name().to_string()
        } else if self.kind.is_degrees() {
            format!("{}({})", self.kind.name(), self.value as i64)
        } else {
            format!("{}({:.6})", self.kind.name(), self.value)
        };
        if self.context != Context::All {
            token.push('@');
            token.push_str(&self.context.to_string());
        }
        token
    }
}

impl FromStr for Filter {
    type Err = TweakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TweakError::MalformedFilterSegment(s.to_string());
        let segment = s.trim();

        let (body, context) = match segment.rsplit_once('@') {
            Some((body, "fg")) => (body, Context::Fg),
            Some((body, "bg")) => (body, Context::Bg),
            Some(_) => return Err(malformed()),
            None => (segment, Context::All),
        };

        match body.split_once('(') {
            Some((name, rest)) => {
                let kind = FilterKind::from_name(name)
                    .filter(FilterKind::takes_value)
                    .ok_or_else(malformed)?;
                let arg = rest.strip_suffix(')').ok_or_else(malformed)?;
                let value = parse_number(arg).ok_or_else(malformed)?;
                Self::new(kind, value, context).map_err(|_| malformed())
            }
            None => {
                let kind = FilterKind::from_name(body)
                    .filter(|kind| !kind.takes_value())
                    .ok_or_else(malformed)?;
                Ok(Self::bare(kind, context))
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

/// Parse a plain decimal: optional sign, digits, at most one decimal point.
fn parse_number(s: &str) -> Option<f64> {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let valid = !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if !valid {
        return None;
    }
    s.parse().ok().filter(|v: &f64| v.is_finite())
}

/// An ordered list of filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a chain expression. Malformed segments are dropped.
    pub fn parse(text: &str) -> Self {
        let mut chain = Self::new();
        for segment in text.split(';') {
            if segment.trim().is_empty() {
                continue;
            }
            match segment.parse::<Filter>() {
                Ok(filter) => chain.push(filter),
                Err(e) => tracing::debug!(segment, error = %e, "dropping filter segment"),
            }
        }
        chain
    }

    /// Append a filter.
    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    /// Append every filter of another chain.
    pub fn extend(&mut self, other: &FilterChain) {
        self.filters.extend_from_slice(&other.filters);
    }

    /// Iterate filters in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.filters.iter()
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the chain has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Canonical tokens, one per filter.
    pub fn tokens(&self) -> Vec<String> {
        self.filters.iter().map(Filter::token).collect()
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens().join(";"))
    }
}

impl FromIterator<Filter> for FilterChain {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        Self {
            filters: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FilterChain {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_filter() {
        let filter: Filter = "brightness(1.010000)".parse().unwrap();
        assert_eq!(filter.kind(), FilterKind::Brightness);
        assert!((filter.value() - 1.01).abs() < 1e-12);
        assert_eq!(filter.context(), Context::All);
    }

    #[test]
    fn test_parse_context_suffix() {
        let filter: Filter = "hue(10)@fg".parse().unwrap();
        assert_eq!(filter.kind(), FilterKind::Hue);
        assert_eq!(filter.value(), 10.0);
        assert_eq!(filter.context(), Context::Fg);

        let filter: Filter = "invert@bg".parse().unwrap();
        assert_eq!(filter.kind(), FilterKind::Invert);
        assert_eq!(filter.context(), Context::Bg);
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!("hue(-30)".parse::<Filter>().unwrap().value(), -30.0);
        assert_eq!("contrast(.5)".parse::<Filter>().unwrap().value(), 0.5);
        assert_eq!("contrast(+1.5)".parse::<Filter>().unwrap().value(), 1.5);
        assert_eq!("saturation(-0.5)".parse::<Filter>().unwrap().value(), -0.5);
    }

    #[test]
    fn test_parse_malformed() {
        for segment in [
            "",
            "brightness",
            "brightness()",
            "brightness(abc)",
            "brightness(1.0.0)",
            "brightness(1e3)",
            "brightness(inf)",
            "brightness(1",
            "invert(1)",
            "sepia@all",
            "hue(10)@both",
            "Sepia",
            "blur(2)",
        ] {
            assert!(
                matches!(segment.parse::<Filter>(), Err(TweakError::MalformedFilterSegment(_))),
                "{segment:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_chain_drops_malformed_segments() {
        let chain = FilterChain::parse("sepia;bogus;hue(10)@fg;;brightness(x)");
        assert_eq!(chain.len(), 2);
        let kinds: Vec<_> = chain.iter().map(Filter::kind).collect();
        assert_eq!(kinds, vec![FilterKind::Sepia, FilterKind::Hue]);
    }

    #[test]
    fn test_empty_chain() {
        assert!(FilterChain::parse("").is_empty());
        assert!(FilterChain::parse(";;").is_empty());
    }

    #[test]
    fn test_canonical_tokens() {
        let chain = FilterChain::parse("brightness(1.01);hue(10.7)@fg;invert@bg;glow(0.2);colorize(-45)");
        insta::assert_snapshot!(
            chain.to_string(),
            @"brightness(1.010000);hue(10)@fg;invert@bg;glow(0.200000);colorize(-45)"
        );
    }

    #[test]
    fn test_value_matches_token() {
        let filter: Filter = "hue(10.7)".parse().unwrap();
        assert_eq!(filter.value(), 10.0);

        let filter: Filter = "brightness(1.0000004)".parse().unwrap();
        assert_eq!(filter.value(), 1.0);
        assert_eq!(filter.token(), "brightness(1.000000)");
    }

    #[test]
    fn test_rejects_values_without_token() {
        assert!("hue(100000000000000000000000)".parse::<Filter>().is_err());
        assert!("colorize(-9223372036854775809000)".parse::<Filter>().is_err());
        let huge = format!("brightness(1{})", "0".repeat(400));
        assert!(huge.parse::<Filter>().is_err());

        assert!(Filter::new(FilterKind::Hue, 1e23, Context::All).is_err());
        assert!(Filter::new(FilterKind::Contrast, f64::INFINITY, Context::All).is_err());
        assert!(Filter::new(FilterKind::Glow, f64::NAN, Context::All).is_err());
        assert_eq!(FilterChain::parse("hue(100000000000000000000000);sepia").len(), 1);
    }

    #[test]
    fn test_large_values_replay_exactly() {
        let filter = Filter::new(FilterKind::Hue, 9.0e18, Context::Fg).unwrap();
        let replayed: Filter = filter.token().parse().unwrap();
        assert_eq!(replayed, filter);

        let filter = Filter::new(FilterKind::Brightness, 1e300, Context::All).unwrap();
        let replayed: Filter = filter.token().parse().unwrap();
        assert_eq!(replayed, filter);
    }

    #[test]
    fn test_tokens_reparse_identically() {
        let chain = FilterChain::parse("contrast(0.95)@bg;sepia;saturation(1.100000);colorize(200)@fg");
        let replayed = FilterChain::parse(&chain.to_string());
        assert_eq!(chain, replayed);
    }

    #[test]
    fn test_context_flags() {
        assert!(Context::All.applies_to_fg() && Context::All.applies_to_bg());
        assert!(Context::Fg.applies_to_fg() && !Context::Fg.applies_to_bg());
        assert!(!Context::Bg.applies_to_fg() && Context::Bg.applies_to_bg());
        assert_eq!("bg".parse::<Context>().unwrap(), Context::Bg);
    }
}
