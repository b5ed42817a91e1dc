//! Color filter functions.
//!
//! Every filter mutates a single [`Color`] in place, except [`glow`], which
//! derives a new background from a foreground. Channel math that is defined
//! at 8-bit scale (invert, contrast, brightness) works on `[0, 255]` floats
//! and writes back normalized values.

use crate::chain::FilterKind;
use crate::color::Color;

/// Sepia matrix rows for red, green and blue.
const SEPIA: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

impl FilterKind {
    /// Apply this filter to one color. Glow needs a second color, so it
    /// does nothing here.
    pub fn apply(&self, color: &mut Color, value: f64) {
        match self {
            Self::Brightness => brightness(color, value),
            Self::Saturation => saturation(color, value),
            Self::Hue => hue(color, value),
            Self::Contrast => contrast(color, value),
            Self::Colorize => colorize(color, value),
            Self::Sepia => sepia(color),
            Self::Grayscale => grayscale(color),
            Self::Invert => invert(color),
            Self::Glow => {}
        }
    }
}

/// Complement each RGB channel. Alpha is untouched.
pub fn invert(color: &mut Color) {
    let flip = |c: f64| (255.0 - c * 255.0) / 255.0;
    color.set_rgb(flip(color.red()), flip(color.green()), flip(color.blue()));
}

/// Replace every channel with the luminance.
pub fn grayscale(color: &mut Color) {
    let luminance = color.luminance();
    color.set_rgb(luminance, luminance, luminance);
}

/// Apply the sepia tone matrix.
pub fn sepia(color: &mut Color) {
    let rgb = [color.red(), color.green(), color.blue()];
    let row = |m: [f64; 3]| m[0] * rgb[0] + m[1] * rgb[1] + m[2] * rgb[2];
    color.set_rgb(row(SEPIA[0]), row(SEPIA[1]), row(SEPIA[2]));
}

/// Shift HSL saturation by `factor - 1`.
pub fn saturation(color: &mut Color, factor: f64) {
    if factor == 1.0 {
        return;
    }
    let (h, s, l) = color.to_hsl();
    color.set_hsl(h, s + factor - 1.0, l);
}

/// Rotate the hue. Achromatic colors are left alone.
pub fn hue(color: &mut Color, degrees: f64) {
    let (h, s, l) = color.to_hsl();
    if h.is_nan() {
        return;
    }
    color.set_hsl(h + degrees, s, l);
}

/// Set the hue outright. Achromatic colors are left alone.
pub fn colorize(color: &mut Color, degrees: f64) {
    let (h, s, l) = color.to_hsl();
    if h.is_nan() {
        return;
    }
    color.set_hsl(degrees, s, l);
}

/// Stretch each channel around the 128 midpoint.
///
/// `factor` is clamped to `[0, 2]`; 0 flattens everything to mid-gray, 2 is
/// maximum contrast.
pub fn contrast(color: &mut Color, factor: f64) {
    let factor = factor.clamp(0.0, 2.0);
    if factor == 1.0 {
        return;
    }
    let f = (factor - 1.0) * 255.0;
    let gain = (259.0 * (f + 255.0)) / (255.0 * (259.0 - f));
    let stretch = |c: f64| (gain * (c * 255.0 - 128.0) + 128.0).clamp(0.0, 255.0) / 255.0;
    color.set_rgb(stretch(color.red()), stretch(color.green()), stretch(color.blue()));
}

/// Move luminance by `(factor - 1) * 255` in 8-bit units.
///
/// All channels shift by the same delta. A channel pushed past 0 or 255 is
/// clamped and its overflow is split across the channels that are still
/// free, visiting red, green, blue in that order.
pub fn brightness(color: &mut Color, factor: f64) {
    if factor == 1.0 {
        return;
    }
    let current = color.luminance() * 255.0;
    let target = (current + (factor - 1.0) * 255.0).clamp(0.0, 255.0);

    if target >= 255.0 {
        color.set_rgb(1.0, 1.0, 1.0);
        return;
    }
    if target <= 0.0 {
        color.set_rgb(0.0, 0.0, 0.0);
        return;
    }

    let delta = target - current;
    let mut channels = [
        color.red() * 255.0 + delta,
        color.green() * 255.0 + delta,
        color.blue() * 255.0 + delta,
    ];
    redistribute_overflow(&mut channels);
    color.set_rgb(channels[0] / 255.0, channels[1] / 255.0, channels[2] / 255.0);
}

fn redistribute_overflow(channels: &mut [f64; 3]) {
    let mut free = [true; 3];
    loop {
        let mut spilled = false;
        for i in 0..3 {
            if !free[i] {
                continue;
            }
            let overflow = if channels[i] > 255.0 {
                channels[i] - 255.0
            } else if channels[i] < 0.0 {
                channels[i]
            } else {
                continue;
            };

            channels[i] = channels[i].clamp(0.0, 255.0);
            free[i] = false;
            spilled = true;

            let remaining = free.iter().filter(|f| **f).count();
            if remaining > 0 {
                let share = overflow / remaining as f64;
                for (channel, _) in channels.iter_mut().zip(free).filter(|(_, f)| *f) {
                    *channel += share;
                }
            }
        }
        if !spilled {
            break;
        }
    }
}

/// Derive a translucent glow background from `foreground`.
///
/// The foreground is composited over `surface`, and the alpha byte
/// `round(255 * intensity)` is appended to the resulting `#RRGGBB`.
pub fn glow(foreground: &Color, surface: &Color, intensity: f64) -> Option<Color> {
    let composed = foreground.overlaid(surface);
    let alpha = (255.0 * intensity.clamp(0.0, 1.0)).round() as u8;
    Color::parse(&format!("{}{:02X}", composed.to_hex(false), alpha)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hex(s: &str) -> Color {
        Color::parse(s).unwrap()
    }

    fn filtered(s: &str, kind: FilterKind, value: f64) -> String {
        let mut color = hex(s);
        kind.apply(&mut color, value);
        color.to_string()
    }

    #[test]
    fn test_invert() {
        assert_eq!(filtered("#FF8000", FilterKind::Invert, 0.0), "#007FFF");
        assert_eq!(filtered("#00000080", FilterKind::Invert, 0.0), "#FFFFFF80");
    }

    #[test]
    fn test_grayscale() {
        let mut color = hex("#FF0000");
        grayscale(&mut color);
        assert_eq!(color.red(), color.green());
        assert_eq!(color.green(), color.blue());
        assert_eq!(color.to_hex(false), "#4C4C4C");
    }

    #[test]
    fn test_sepia_clamps() {
        assert_eq!(filtered("#FFFFFF", FilterKind::Sepia, 0.0), "#FFFFEF");
        assert_eq!(filtered("#000000", FilterKind::Sepia, 0.0), "#000000");
    }

    #[test]
    fn test_saturation() {
        assert_eq!(filtered("#C04040", FilterKind::Saturation, 0.0), "#808080");
        assert_eq!(filtered("#C04040", FilterKind::Saturation, 2.0), "#FF0101");
    }

    #[test]
    fn test_hue_rotation_wraps() {
        assert_eq!(filtered("#FF0000", FilterKind::Hue, 120.0), "#00FF00");
        assert_eq!(filtered("#FF0000", FilterKind::Hue, -120.0), "#0000FF");
        assert_eq!(filtered("#FF0000", FilterKind::Hue, 480.0), "#00FF00");
    }

    #[test]
    fn test_hue_skips_achromatic() {
        assert_eq!(filtered("#808080", FilterKind::Hue, 90.0), "#808080");
    }

    #[test]
    fn test_colorize() {
        let mut blue = hex("#0000FF");
        colorize(&mut blue, 0.0);
        assert_eq!(blue.to_hsl().0, 0.0);
        assert_eq!(blue.to_hex(false), "#FF0000");

        assert_eq!(filtered("#FF0000", FilterKind::Colorize, 360.0 + 240.0), "#0000FF");
        assert_eq!(filtered("#777777", FilterKind::Colorize, 0.0), "#777777");
    }

    #[test]
    fn test_contrast() {
        assert_eq!(filtered("#C0C0C0", FilterKind::Contrast, 2.0), "#FFFFFF");
        assert_eq!(filtered("#C04020", FilterKind::Contrast, 0.0), "#808080");
        assert_eq!(filtered("#C04020", FilterKind::Contrast, -3.0), "#808080");
    }

    #[test]
    fn test_brightness_extremes() {
        assert_eq!(filtered("#336699", FilterKind::Brightness, 2.0), "#FFFFFF");
        assert_eq!(filtered("#336699", FilterKind::Brightness, 0.0), "#000000");
        assert_eq!(filtered("#33669980", FilterKind::Brightness, 2.0), "#FFFFFF80");
    }

    #[test]
    fn test_brightness_shift() {
        assert_eq!(filtered("#404040", FilterKind::Brightness, 1.2), "#737373");
    }

    #[test]
    fn test_brightness_redistributes_overflow() {
        // red saturates first, its spill goes to green and blue
        assert_eq!(filtered("#FF0000", FilterKind::Brightness, 1.1), "#FF2626");
        // red spills into green, green then spills everything into blue
        assert_eq!(filtered("#FFFF00", FilterKind::Brightness, 1.05), "#FFFF26");
    }

    #[test]
    fn test_glow() {
        let red = hex("#FF0000");
        let glowed = glow(&red, &Color::black(), 0.2).unwrap();
        assert_eq!(glowed.to_string(), "#FF000033");

        let translucent = hex("#FFFFFF80");
        let glowed = glow(&translucent, &Color::black(), 0.5).unwrap();
        assert_eq!(glowed.to_string(), "#80808080");
    }

    #[test]
    fn test_glow_is_noop_on_single_color() {
        assert_eq!(filtered("#123456", FilterKind::Glow, 0.5), "#123456");
    }

    fn any_color() -> impl Strategy<Value = Color> {
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Color::from_rgb8(r, g, b))
    }

    fn any_filter() -> impl Strategy<Value = (FilterKind, f64)> {
        (0..FilterKind::ALL.len(), -3.0f64..3.0)
            .prop_map(|(i, v)| (FilterKind::ALL[i], if FilterKind::ALL[i].is_degrees() { v * 360.0 } else { v }))
    }

    proptest! {
        #[test]
        fn prop_identity_factors(color in any_color()) {
            for kind in [FilterKind::Brightness, FilterKind::Contrast, FilterKind::Saturation] {
                let mut out = color;
                kind.apply(&mut out, 1.0);
                prop_assert_eq!(out, color);
            }
        }

        #[test]
        fn prop_invert_is_involution(color in any_color()) {
            let mut out = color;
            invert(&mut out);
            invert(&mut out);
            prop_assert_eq!(out.to_hex(true), color.to_hex(true));
        }

        #[test]
        fn prop_grayscale_uses_luminance(color in any_color()) {
            let mut out = color;
            grayscale(&mut out);
            prop_assert_eq!(out.red(), color.luminance());
            prop_assert_eq!(out.green(), color.luminance());
            prop_assert_eq!(out.blue(), color.luminance());
        }

        #[test]
        fn prop_channels_stay_in_range(
            color in any_color(),
            filters in prop::collection::vec(any_filter(), 1..8),
        ) {
            let mut out = color;
            for (kind, value) in filters {
                kind.apply(&mut out, value);
                for c in [out.red(), out.green(), out.blue(), out.alpha()] {
                    prop_assert!((0.0..=1.0).contains(&c));
                }
            }
        }

        #[test]
        fn prop_colorize_zero(color in any_color()) {
            let mut out = color;
            colorize(&mut out, 0.0);
            if color.to_hsl().0.is_nan() {
                prop_assert_eq!(out, color);
            } else {
                prop_assert_eq!(out.to_hsl().0, 0.0);
            }
        }
    }
}
