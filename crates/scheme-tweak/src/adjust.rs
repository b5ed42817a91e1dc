//! Step adjustments.
//!
//! An adjustment is a single nudge ("a bit brighter", "rotate hue back")
//! turned into one filter using the configured step sizes.

use crate::chain::{Context, Filter, FilterKind};
use crate::error::TweakError;
use crate::settings::TweakSettings;
use std::fmt;
use std::str::FromStr;

/// Direction of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Up,
    Down,
}

impl Direction {
    /// Multiplier applied to the step.
    pub fn sign(&self) -> f64 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
        }
    }
}

impl FromStr for Direction {
    type Err = TweakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" | "up" => Ok(Self::Up),
            "-" | "down" => Ok(Self::Down),
            other => Err(TweakError::MalformedFilterSegment(format!("unknown direction: {}", other))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "+"),
            Self::Down => write!(f, "-"),
        }
    }
}

/// A step adjustment of one filter kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    kind: FilterKind,
    direction: Direction,
    step: Option<f64>,
    context: Context,
}

impl Adjustment {
    /// Adjustment upwards by the configured step, on both colors.
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            direction: Direction::Up,
            step: None,
            context: Context::All,
        }
    }

    /// Step up or down.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Use this step instead of the configured one.
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Limit the filter to one color of each pair.
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Build the filter for this adjustment.
    ///
    /// Returns `None` when the step would leave the filter's range or has
    /// no canonical token.
    pub fn to_filter(&self, settings: &TweakSettings) -> Option<Filter> {
        let sign = self.direction.sign();
        match self.kind {
            FilterKind::Brightness | FilterKind::Contrast | FilterKind::Saturation => {
                let step = self.step.unwrap_or(match self.kind {
                    FilterKind::Brightness => settings.brightness_step,
                    FilterKind::Contrast => settings.contrast_step,
                    _ => settings.saturation_step,
                });
                let value = step * sign;
                Filter::new(self.kind, 1.0 + value, self.context)
                    .ok()
                    .filter(|_| (-1.0..=1.0).contains(&value))
            }
            FilterKind::Hue => {
                let value = self.step.unwrap_or(settings.hue_step).trunc() * sign;
                Filter::new(FilterKind::Hue, value, self.context)
                    .ok()
                    .filter(|_| (-360.0..=360.0).contains(&value))
            }
            FilterKind::Colorize => {
                let hue = self.step.unwrap_or(settings.colorize_hue);
                Filter::new(FilterKind::Colorize, hue, self.context).ok()
            }
            FilterKind::Glow => {
                let intensity = self.step.unwrap_or(settings.glow_intensity);
                Filter::new(FilterKind::Glow, intensity, Context::All)
                    .ok()
                    .filter(|_| (0.0..=1.0).contains(&intensity))
            }
            FilterKind::Invert | FilterKind::Sepia | FilterKind::Grayscale => {
                Some(Filter::bare(self.kind, self.context))
            }
        }
    }
}
