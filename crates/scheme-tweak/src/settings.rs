//! Tweaker settings.

use crate::error::TweakResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default step sizes and debug flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweakSettings {
    /// Brightness change per adjustment.
    #[serde(default = "default_fine_step")]
    pub brightness_step: f64,
    /// Contrast change per adjustment.
    #[serde(default = "default_fine_step")]
    pub contrast_step: f64,
    /// Saturation change per adjustment.
    #[serde(default = "default_saturation_step")]
    pub saturation_step: f64,
    /// Hue rotation per adjustment, in degrees.
    #[serde(default = "default_hue_step")]
    pub hue_step: f64,
    /// Hue used by colorize, in degrees.
    #[serde(default)]
    pub colorize_hue: f64,
    /// Glow intensity.
    #[serde(default = "default_glow_intensity")]
    pub glow_intensity: f64,
    /// Verbose logging.
    #[serde(default)]
    pub debug: bool,
}

fn default_fine_step() -> f64 {
    0.01
}

fn default_saturation_step() -> f64 {
    0.1
}

fn default_hue_step() -> f64 {
    10.0
}

fn default_glow_intensity() -> f64 {
    0.2
}

impl Default for TweakSettings {
    fn default() -> Self {
        Self {
            brightness_step: default_fine_step(),
            contrast_step: default_fine_step(),
            saturation_step: default_saturation_step(),
            hue_step: default_hue_step(),
            colorize_hue: 0.0,
            glow_intensity: default_glow_intensity(),
            debug: false,
        }
    }
}

impl TweakSettings {
    /// Load settings from file.
    pub fn load(path: &Path) -> TweakResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load from default location.
    pub fn load_default() -> TweakResult<Self> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    /// Get default settings path.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "scheme-tweaker")
            .map(|d| d.config_dir().join("settings.toml"))
    }

    /// Save settings to file.
    pub fn save(&self, path: &Path) -> TweakResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}
