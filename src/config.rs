//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::ModelSet;
use crate::params::DEFAULT_ASPECT_RATIO;

/// Default endpoint prefix for the Gemini REST API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,
    /// Endpoint configuration.
    #[serde(default)]
    pub api: ApiConfig,
    /// Model selection.
    #[serde(default)]
    pub models: ModelsConfig,
    /// Rendering parameters.
    #[serde(default)]
    pub render: RenderConfig,
    /// Saved output parameters.
    #[serde(default)]
    pub output: OutputConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
}

/// Endpoint configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL that model names are appended to.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_BASE.to_string() }
    }
}

/// Model names or aliases for each stage.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Analysis and conversation model.
    pub chat: String,
    /// Prompt synthesis model.
    pub prompt: String,
    /// Rendering model.
    pub image: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        let ModelSet { chat, prompt, image } = ModelSet::default();
        Self { chat, prompt, image }
    }
}

/// Rendering parameters.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Aspect ratio of the rendered room.
    pub aspect_ratio: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { aspect_ratio: DEFAULT_ASPECT_RATIO.to_string() }
    }
}

/// Saved output parameters.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Format of saved renderings.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: "jpeg".to_string() }
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

    /// Get the Gemini API key: `GEMINI_API_KEY`, then `API_KEY`, then the file.
    ///
    /// Empty values are skipped, so an empty `GEMINI_API_KEY` falls through
    /// to `API_KEY`.
    #[must_use]
    pub fn gemini_key(&self) -> Option<String> {
        first_key([
            std::env::var("GEMINI_API_KEY").ok(),
            std::env::var("API_KEY").ok(),
            self.keys.gemini.clone(),
        ])
    }
}

/// First non-blank key, in priority order.
fn first_key(candidates: [Option<String>; 3]) -> Option<String> {
    candidates.into_iter().flatten().find(|key| !key.trim().is_empty())
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `ROOMCRAFT_CONFIG` environment variable
/// 3. `~/.config/roomcraft/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("ROOMCRAFT_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/roomcraft/config.toml")
    } else {
        PathBuf::from("roomcraft.toml")
    }
}
