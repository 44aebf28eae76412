//! Configuration file loading and resolution.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::color::Color;
use crate::deck::{self, RenderConfig};
use crate::error::SlideError;
use crate::model::DEFAULT_MODEL;

/// Environment variable holding the Gemini credential.
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

/// Top-level configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API keys for providers.
    pub keys: KeysConfig,
    /// Default slide styling and model.
    pub defaults: DefaultsConfig,
    /// Outline font files.
    pub fonts: FontsConfig,
    /// Native share integration.
    pub share: ShareConfig,
    /// HTTP endpoint settings.
    pub server: ServerConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
}

/// Default parameter values from config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Slide background, as hex.
    pub background: String,
    /// Text color, as hex.
    pub foreground: String,
    /// Base font size in pixels.
    pub font_size: u32,
    /// Bold text.
    pub bold: bool,
    /// Text model name or alias.
    pub model: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            background: deck::DEFAULT_BACKGROUND.to_string(),
            foreground: deck::DEFAULT_FOREGROUND.to_string(),
            font_size: deck::DEFAULT_FONT_SIZE,
            bold: false,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Font files. Missing entries fall back to the built-in bitmap face.
#[derive(Debug, Default, Deserialize)]
pub struct FontsConfig {
    /// Regular weight TTF/OTF.
    pub regular: Option<PathBuf>,
    /// Bold weight TTF/OTF.
    pub bold: Option<PathBuf>,
}

/// Share command configuration.
#[derive(Debug, Default, Deserialize)]
pub struct ShareConfig {
    /// Command that receives slide file paths as trailing arguments.
    pub command: Option<String>,
}

/// HTTP server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "127.0.0.1:3000".to_string() }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the Gemini API key, preferring the environment variable. Read on every call.
    #[must_use]
    pub fn gemini_key(&self) -> Option<String> {
        std::env::var(GEMINI_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.keys.gemini.clone().filter(|k| !k.is_empty()))
    }

    /// The deck-wide render settings described by `[defaults]`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable color or an out-of-range font size.
    pub fn render_defaults(&self) -> Result<RenderConfig, SlideError> {
        let background = self.defaults.background.parse::<Color>().map_err(SlideError::Config)?;
        let foreground = self.defaults.foreground.parse::<Color>().map_err(SlideError::Config)?;
        RenderConfig::new(background, foreground, self.defaults.font_size, self.defaults.bold)
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `CAROSELLO_CONFIG` environment variable
/// 3. `~/.config/carosello/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("CAROSELLO_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/carosello/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/carosello/config.toml")
    } else {
        PathBuf::from("carosello.toml")
    }
}
