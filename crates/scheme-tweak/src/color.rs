//! Color values and channel access.

use crate::error::{TweakError, TweakResult};
use crate::x11;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Luminance weight of the red channel.
pub const LUMA_RED: f64 = 0.299;
/// Luminance weight of the green channel.
pub const LUMA_GREEN: f64 = 0.587;
/// Luminance weight of the blue channel.
pub const LUMA_BLUE: f64 = 0.114;

/// An sRGB color with normalized channels.
///
/// Every channel is kept in `[0, 1]`. Alpha is optional: colors parsed from
/// `#RGB` or `#RRGGBB` have none and serialize back without an alpha byte.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    red: f64,
    green: f64,
    blue: f64,
    alpha: Option<f64>,
}

/// A readable/writable channel of a [`Color`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Red, `[0, 1]`
    Red,
    /// Green, `[0, 1]`
    Green,
    /// Blue, `[0, 1]`
    Blue,
    /// Alpha, `[0, 1]`
    Alpha,
    /// HSL hue in degrees, `[0, 360)`, NaN for achromatic colors
    Hue,
    /// HSL saturation as a percentage
    Saturation,
    /// HSL lightness as a percentage
    Lightness,
}

impl FromStr for Channel {
    type Err = TweakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" | "srgb.red" => Ok(Self::Red),
            "green" | "srgb.green" => Ok(Self::Green),
            "blue" | "srgb.blue" => Ok(Self::Blue),
            "alpha" => Ok(Self::Alpha),
            "hsl.hue" => Ok(Self::Hue),
            "hsl.saturation" => Ok(Self::Saturation),
            "hsl.lightness" => Ok(Self::Lightness),
            _ => Err(TweakError::UnknownChannel(s.to_string())),
        }
    }
}

impl Color {
    /// Create an opaque color from normalized channels.
    pub fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red: clamp_unit(red),
            green: clamp_unit(green),
            blue: clamp_unit(blue),
            alpha: None,
        }
    }

    /// Create a color with an explicit alpha.
    pub fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            alpha: Some(clamp_unit(alpha)),
            ..Self::rgb(red, green, blue)
        }
    }

    /// Create an opaque color from 8-bit channels.
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
        )
    }

    /// Pure white.
    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    /// Pure black.
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Parse a hex literal or a color name.
    ///
    /// Accepted forms:
    /// * `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA` (case-insensitive)
    /// * X11/CSS names such as `cornflowerblue`
    pub fn parse(text: &str) -> TweakResult<Self> {
        let s = text.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| TweakError::InvalidColor(text.to_string()));
        }

        x11::name_to_hex(s)
            .and_then(|hex| parse_hex(&hex[1..]))
            .ok_or_else(|| TweakError::InvalidColor(text.to_string()))
    }

    /// Red channel, `[0, 1]`.
    pub fn red(&self) -> f64 {
        self.red
    }

    /// Green channel, `[0, 1]`.
    pub fn green(&self) -> f64 {
        self.green
    }

    /// Blue channel, `[0, 1]`.
    pub fn blue(&self) -> f64 {
        self.blue
    }

    /// Alpha, treating a missing alpha as opaque.
    pub fn alpha(&self) -> f64 {
        self.alpha.unwrap_or(1.0)
    }

    /// Whether the color carries an explicit alpha.
    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    /// Set the RGB channels, clamping each to `[0, 1]`.
    pub fn set_rgb(&mut self, red: f64, green: f64, blue: f64) {
        self.red = clamp_unit(red);
        self.green = clamp_unit(green);
        self.blue = clamp_unit(blue);
    }

    /// Set or drop the alpha channel.
    pub fn set_alpha(&mut self, alpha: Option<f64>) {
        self.alpha = alpha.map(clamp_unit);
    }

    /// Channels at 8-bit resolution.
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        (to_byte(self.red), to_byte(self.green), to_byte(self.blue))
    }

    /// Render as `#RRGGBB` or `#RRGGBBAA`.
    pub fn to_hex(&self, include_alpha: bool) -> String {
        let (r, g, b) = self.to_rgb8();
        if include_alpha {
            format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, to_byte(self.alpha()))
        } else {
            format!("#{:02X}{:02X}{:02X}", r, g, b)
        }
    }

    /// Perceived luminance in `[0, 1]`.
    pub fn luminance(&self) -> f64 {
        clamp_unit(LUMA_RED * self.red + LUMA_GREEN * self.green + LUMA_BLUE * self.blue)
    }

    /// Convert to HSL.
    ///
    /// Returns hue in degrees (NaN when achromatic), saturation and
    /// lightness as fractions.
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let (r, g, b) = (self.red, self.green, self.blue);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return (f64::NAN, 0.0, l);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        ((h * 60.0) % 360.0, clamp_unit(s), l)
    }

    /// Write HSL values back to RGB. A NaN hue is treated as 0.
    pub fn set_hsl(&mut self, hue: f64, saturation: f64, lightness: f64) {
        let h = if hue.is_nan() { 0.0 } else { hue.rem_euclid(360.0) };
        let s = clamp_unit(saturation);
        let l = clamp_unit(lightness);
        let a = s * l.min(1.0 - l);
        let f = |n: f64| {
            let k = (n + h / 30.0).rem_euclid(12.0);
            l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0)
        };
        self.set_rgb(f(0.0), f(8.0), f(4.0));
    }

    /// Read a channel.
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
            Channel::Alpha => self.alpha(),
            Channel::Hue => self.to_hsl().0,
            Channel::Saturation => self.to_hsl().1 * 100.0,
            Channel::Lightness => self.to_hsl().2 * 100.0,
        }
    }

    /// Write a channel. Setting the hue of an achromatic color does nothing.
    pub fn set(&mut self, channel: Channel, value: f64) {
        match channel {
            Channel::Red => self.red = clamp_unit(value),
            Channel::Green => self.green = clamp_unit(value),
            Channel::Blue => self.blue = clamp_unit(value),
            Channel::Alpha => self.alpha = Some(clamp_unit(value)),
            Channel::Hue => {
                let (h, s, l) = self.to_hsl();
                if !h.is_nan() {
                    self.set_hsl(value, s, l);
                }
            }
            Channel::Saturation => {
                let (h, _, l) = self.to_hsl();
                self.set_hsl(h, value / 100.0, l);
            }
            Channel::Lightness => {
                let (h, s, _) = self.to_hsl();
                self.set_hsl(h, s, value / 100.0);
            }
        }
    }

    /// Composite this color over `background` in place.
    pub fn overlay(&mut self, background: &Color) {
        let a = self.alpha();
        if a >= 1.0 {
            return;
        }

        let ab = background.alpha();
        let out = a + ab * (1.0 - a);
        if out <= 0.0 {
            self.set_rgb(0.0, 0.0, 0.0);
            self.alpha = Some(0.0);
            return;
        }

        let blend = |cf: f64, cb: f64| (cf * a + cb * ab * (1.0 - a)) / out;
        self.set_rgb(
            blend(self.red, background.red),
            blend(self.green, background.green),
            blend(self.blue, background.blue),
        );
        self.alpha = Some(clamp_unit(out));
    }

    /// Composite this color over `background`, returning a new color.
    pub fn overlaid(&self, background: &Color) -> Color {
        let mut color = *self;
        color.overlay(background);
        color
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl FromStr for Color {
    type Err = TweakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex(self.has_alpha()))
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn to_byte(value: f64) -> u8 {
    (clamp_unit(value) * 255.0).round() as u8
}

fn parse_hex(hex: &str) -> Option<Color> {
    let nibble = |c: u8| -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'a'..=b'f' => Some(c - b'a' + 10),
            b'A'..=b'F' => Some(c - b'A' + 10),
            _ => None,
        }
    };
    let pair = |hi: u8, lo: u8| -> Option<u8> { Some(nibble(hi)? << 4 | nibble(lo)?) };

    let bytes = hex.as_bytes();
    let (r, g, b, a) = match bytes.len() {
        3 | 4 => {
            let r = nibble(bytes[0])? * 17;
            let g = nibble(bytes[1])? * 17;
            let b = nibble(bytes[2])? * 17;
            let a = match bytes.get(3) {
                Some(&c) => Some(nibble(c)? * 17),
                None => None,
            };
            (r, g, b, a)
        }
        6 | 8 => {
            let r = pair(bytes[0], bytes[1])?;
            let g = pair(bytes[2], bytes[3])?;
            let b = pair(bytes[4], bytes[5])?;
            let a = if bytes.len() == 8 {
                Some(pair(bytes[6], bytes[7])?)
            } else {
                None
            };
            (r, g, b, a)
        }
        _ => return None,
    };

    let mut color = Color::from_rgb8(r, g, b);
    color.alpha = a.map(|a| f64::from(a) / 255.0);
    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Color::parse("#f50").unwrap().to_rgb8(), (255, 85, 0));
        assert_eq!(Color::parse("#ff5500").unwrap().to_rgb8(), (255, 85, 0));
        assert_eq!(Color::parse("#FF5500").unwrap().to_rgb8(), (255, 85, 0));

        let short = Color::parse("#f508").unwrap();
        assert_eq!(short.to_hex(true), "#FF550088");

        let long = Color::parse("#ff550080").unwrap();
        assert!(long.has_alpha());
        assert_eq!(long.to_hex(true), "#FF550080");
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Color::parse("red").unwrap().to_hex(false), "#FF0000");
        assert_eq!(Color::parse("Navy").unwrap().to_hex(false), "#000080");
        assert!(!Color::parse("white").unwrap().has_alpha());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(Color::parse(""), Err(TweakError::InvalidColor(_))));
        assert!(Color::parse("none").is_err());
        assert!(Color::parse("#12").is_err());
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#GGGGGG").is_err());
        assert!(Color::parse("123456").is_err());
        assert!(Color::parse("var(accent)").is_err());
    }

    #[test]
    fn test_display_keeps_alpha_form() {
        assert_eq!(Color::parse("#abc").unwrap().to_string(), "#AABBCC");
        assert_eq!(Color::parse("#abcd").unwrap().to_string(), "#AABBCCDD");
    }

    #[test]
    fn test_luminance() {
        assert_eq!(Color::black().luminance(), 0.0);
        assert!((Color::white().luminance() - 1.0).abs() < 1e-12);
        let red = Color::parse("#FF0000").unwrap();
        assert!((red.luminance() - LUMA_RED).abs() < 1e-12);
    }

    #[test]
    fn test_hsl_access() {
        let red = Color::parse("#FF0000").unwrap();
        assert_eq!(red.get(Channel::Hue), 0.0);
        assert!((red.get(Channel::Saturation) - 100.0).abs() < 1e-9);
        assert!((red.get(Channel::Lightness) - 50.0).abs() < 1e-9);

        let blue = Color::parse("#0000FF").unwrap();
        assert!((blue.get(Channel::Hue) - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_hsl_round_trip() {
        let mut color = Color::parse("#336699").unwrap();
        let (h, s, l) = color.to_hsl();
        color.set_hsl(h, s, l);
        assert_eq!(color.to_hex(false), "#336699");
    }

    #[test]
    fn test_set_hue() {
        let mut color = Color::parse("#FF0000").unwrap();
        color.set(Channel::Hue, 120.0);
        assert_eq!(color.to_hex(false), "#00FF00");
    }

    #[test]
    fn test_set_hue_achromatic_is_noop() {
        let mut gray = Color::parse("#808080").unwrap();
        assert!(gray.get(Channel::Hue).is_nan());
        gray.set(Channel::Hue, 90.0);
        assert_eq!(gray.to_hex(false), "#808080");
    }

    #[test]
    fn test_channel_paths() {
        assert_eq!("hsl.hue".parse::<Channel>().unwrap(), Channel::Hue);
        assert_eq!("hsl.saturation".parse::<Channel>().unwrap(), Channel::Saturation);
        assert_eq!("srgb.red".parse::<Channel>().unwrap(), Channel::Red);
        assert!("hsv.value".parse::<Channel>().is_err());
    }

    #[test]
    fn test_set_clamps() {
        let mut color = Color::black();
        color.set(Channel::Red, 4.0);
        color.set(Channel::Green, -1.0);
        assert_eq!(color.red(), 1.0);
        assert_eq!(color.green(), 0.0);
    }

    #[test]
    fn test_overlay_opaque_is_unchanged() {
        let red = Color::parse("#FF0000").unwrap();
        let over = red.overlaid(&Color::black());
        assert_eq!(over.to_hex(false), "#FF0000");
    }

    #[test]
    fn test_overlay_translucent() {
        let mut color = Color::parse("#FFFFFF80").unwrap();
        color.overlay(&Color::black());
        assert_eq!(color.to_hex(false), "#808080");
        assert_eq!(color.to_hex(true), "#808080FF");
    }

    #[test]
    fn test_serde_as_string() {
        let color: Color = serde_json::from_str("\"#102030\"").unwrap();
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#102030\"");
    }
}
